use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::OrganizeArgs;
use crate::extract::{ALL_TEXTS_FILE_NAME, list_file_names};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub subtitle: String,
    pub body: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OrganizeReport {
    pub sections: usize,
}

pub fn select_prompt_sources(mut names: Vec<String>) -> Vec<String> {
    names.retain(|name| name != ALL_TEXTS_FILE_NAME && name.ends_with(".txt"));
    names.sort();
    names
}

pub fn render_guide(sections: &[Section], min_length: usize) -> String {
    let mut out = String::from("# Prompts\n\n");
    out.push_str(&format!(
        "(filters applied: .txt files longer than {min_length} characters)\n\n"
    ));

    for section in sections {
        out.push_str(&format!(
            "## {}\n\n```\n{}\n```\n\n",
            section.subtitle, section.body
        ));
    }

    out
}

pub fn run(args: OrganizeArgs) -> anyhow::Result<OrganizeReport> {
    let texts_dir = PathBuf::from(&args.texts_dir);
    let names = match list_file_names(&texts_dir) {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(dir = %texts_dir.display(), %err, "cannot list texts directory");
            Vec::new()
        }
    };
    let sources = select_prompt_sources(names);
    if sources.is_empty() {
        tracing::warn!(
            dir = %texts_dir.display(),
            "no prompt texts found, skipping guide generation"
        );
        return Ok(OrganizeReport::default());
    }

    let mut sections = Vec::new();
    for name in &sources {
        let path = texts_dir.join(name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "cannot read text file, skipping");
                continue;
            }
        };
        let body = raw.trim();
        let chars = body.chars().count();
        if body.is_empty() || chars <= args.min_length {
            tracing::info!(file = name.as_str(), chars, "below threshold, skipping");
            continue;
        }
        sections.push(Section {
            subtitle: text_stem(name).to_owned(),
            body: body.to_owned(),
        });
    }

    let out_path = PathBuf::from(&args.out);
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create guide dir: {}", parent.display()))?;
    }
    std::fs::write(&out_path, render_guide(&sections, args.min_length))
        .with_context(|| format!("write prompt guide: {}", out_path.display()))?;

    let report = OrganizeReport {
        sections: sections.len(),
    };
    tracing::info!(
        path = %out_path.display(),
        sections = report.sections,
        "prompt guide saved"
    );
    Ok(report)
}

fn text_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn consolidated_file_is_always_excluded() {
        let sources = select_prompt_sources(names(&[
            ALL_TEXTS_FILE_NAME,
            "b.txt",
            "a.txt",
            "cover.jpg",
            "notes.md",
        ]));
        assert_eq!(sources, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn sources_are_sorted_by_name() {
        let sources = select_prompt_sources(names(&["z.txt", "m.txt", "a.txt"]));
        assert_eq!(sources, vec!["a.txt", "m.txt", "z.txt"]);
    }

    #[test]
    fn guide_renders_heading_note_and_fenced_sections() {
        let sections = vec![
            Section {
                subtitle: "a".to_owned(),
                body: "primeiro prompt".to_owned(),
            },
            Section {
                subtitle: "b".to_owned(),
                body: "segundo prompt".to_owned(),
            },
        ];

        let guide = render_guide(&sections, 150);
        assert!(guide.starts_with("# Prompts\n\n"));
        assert!(guide.contains("(filters applied: .txt files longer than 150 characters)\n\n"));
        assert!(guide.contains("## a\n\n```\nprimeiro prompt\n```\n\n"));
        assert!(guide.contains("## b\n\n```\nsegundo prompt\n```\n\n"));
    }

    #[test]
    fn threshold_comparison_is_strict() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("exact.txt"), "x".repeat(150))?;
        std::fs::write(dir.path().join("over.txt"), "x".repeat(151))?;

        let out = dir.path().join("guide").join("prompts.md");
        let report = run(OrganizeArgs {
            texts_dir: dir.path().to_string_lossy().into_owned(),
            out: out.to_string_lossy().into_owned(),
            min_length: 150,
        })?;

        assert_eq!(report.sections, 1);
        let guide = std::fs::read_to_string(&out)?;
        assert!(guide.contains("## over\n"));
        assert!(!guide.contains("## exact\n"));

        Ok(())
    }

    #[test]
    fn missing_texts_dir_writes_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("guide").join("prompts.md");

        let report = run(OrganizeArgs {
            texts_dir: dir.path().join("missing").to_string_lossy().into_owned(),
            out: out.to_string_lossy().into_owned(),
            min_length: 150,
        })?;

        assert_eq!(report, OrganizeReport::default());
        assert!(!out.exists());

        Ok(())
    }
}
