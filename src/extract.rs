use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::ExtractArgs;
use crate::ocr::{TesseractConfig, TesseractEngine, normalize_whitespace};

/// Name of the consolidated summary file. The organizer excludes exactly
/// this name, so both stages read the one constant.
pub const ALL_TEXTS_FILE_NAME: &str = "all_extracted_texts.txt";

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

pub fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub image_name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextClass {
    Relevant,
    Short,
    Empty,
}

// Lengths are in characters, not bytes.
pub fn classify(text: &str, min_length: usize) -> TextClass {
    if text.is_empty() {
        TextClass::Empty
    } else if text.chars().count() > min_length {
        TextClass::Relevant
    } else {
        TextClass::Short
    }
}

pub fn select_image_names(mut names: Vec<String>) -> Vec<String> {
    names.retain(|name| has_image_extension(name));
    names.sort();
    names
}

pub fn render_consolidated(extractions: &[Extraction], min_length: usize) -> String {
    let mut out = String::from("=== EXTRACTED IMAGE TEXTS ===\n");
    out.push_str(&format!(
        "(individual .txt files are written for texts longer than {min_length} characters)\n\n"
    ));

    for extraction in extractions {
        match classify(&extraction.text, min_length) {
            TextClass::Relevant => out.push_str(&format!(
                "--- {} (Relevant) ---\n{}\n\n",
                extraction.image_name, extraction.text
            )),
            TextClass::Short => out.push_str(&format!(
                "--- {} (short text) ---\n{}\n\n",
                extraction.image_name, extraction.text
            )),
            TextClass::Empty => {
                out.push_str(&format!("--- {} (no text) ---\n\n", extraction.image_name));
            }
        }
    }

    out
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractReport {
    pub images: usize,
    pub with_text: usize,
    pub relevant: usize,
}

pub fn run(args: ExtractArgs) -> anyhow::Result<ExtractReport> {
    let images_dir = PathBuf::from(&args.images_dir);
    let names = match list_file_names(&images_dir) {
        Ok(names) => select_image_names(names),
        Err(err) => {
            tracing::warn!(dir = %images_dir.display(), %err, "cannot list images directory");
            Vec::new()
        }
    };
    if names.is_empty() {
        tracing::warn!(
            dir = %images_dir.display(),
            "no supported images found, nothing to extract"
        );
        return Ok(ExtractReport::default());
    }

    let engine = TesseractEngine::new(TesseractConfig::from_env(&args.lang, args.psm));

    let mut extractions = Vec::with_capacity(names.len());
    for name in names {
        let image_path = images_dir.join(&name);
        tracing::info!(image = %image_path.display(), "processing image");
        let text = match engine.recognize(&image_path) {
            Ok(raw) => normalize_whitespace(&raw),
            Err(err) => {
                tracing::warn!(image = name, %err, "ocr failed, treating as empty text");
                String::new()
            }
        };
        extractions.push(Extraction {
            image_name: name,
            text,
        });
    }

    let out_dir = PathBuf::from(&args.out_dir);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create texts dir: {}", out_dir.display()))?;
    let report = write_outputs(&extractions, &out_dir, args.min_length)?;

    tracing::info!(
        images = report.images,
        with_text = report.with_text,
        relevant = report.relevant,
        "extraction finished"
    );
    Ok(report)
}

// Order is whatever the filesystem returns; callers sort.
pub(crate) fn list_file_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

fn write_outputs(
    extractions: &[Extraction],
    out_dir: &Path,
    min_length: usize,
) -> anyhow::Result<ExtractReport> {
    let mut report = ExtractReport {
        images: extractions.len(),
        ..Default::default()
    };

    for extraction in extractions {
        match classify(&extraction.text, min_length) {
            TextClass::Relevant => {
                report.with_text += 1;
                report.relevant += 1;
                let path = out_dir.join(format!("{}.txt", image_stem(&extraction.image_name)));
                std::fs::write(&path, &extraction.text)
                    .with_context(|| format!("write text file: {}", path.display()))?;
                tracing::debug!(path = %path.display(), "text file saved");
            }
            TextClass::Short => report.with_text += 1,
            TextClass::Empty => {}
        }
    }

    let consolidated = out_dir.join(ALL_TEXTS_FILE_NAME);
    std::fs::write(&consolidated, render_consolidated(extractions, min_length))
        .with_context(|| format!("write consolidated file: {}", consolidated.display()))?;
    tracing::info!(path = %consolidated.display(), "consolidated file saved");

    Ok(report)
}

fn image_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}
