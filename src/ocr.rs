use std::path::Path;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("spawn tesseract: {bin}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tesseract failed ({status}): {stderr}")]
    Engine {
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("tesseract output is not utf-8")]
    Output(#[source] std::string::FromUtf8Error),
}

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub bin: String,
    pub lang: String,
    pub psm: u32,
}

impl TesseractConfig {
    pub fn from_env(lang: &str, psm: u32) -> Self {
        let bin = std::env::var("PROMPTHARVEST_TESSERACT_BIN")
            .unwrap_or_else(|_| "tesseract".to_owned());
        Self {
            bin,
            lang: lang.to_owned(),
            psm,
        }
    }
}

#[derive(Debug)]
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        tracing::debug!(
            bin = %self.config.bin,
            lang = %self.config.lang,
            psm = self.config.psm,
            image = %image.display(),
            "tesseract exec"
        );

        let psm = self.config.psm.to_string();
        let output = Command::new(&self.config.bin)
            .arg(image)
            .arg("stdout")
            .args(["-l", &self.config.lang])
            .args(["--psm", &psm])
            .output()
            .map_err(|source| OcrError::Spawn {
                bin: self.config.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Engine {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(OcrError::Output)
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
