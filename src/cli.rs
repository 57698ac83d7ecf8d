use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Run(RunArgs),
    Fetch(FetchArgs),
    Extract(ExtractArgs),
    Organize(OrganizeArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Carousel post URL (repeat for multiple posts).
    #[arg(long = "url", required = true)]
    pub urls: Vec<String>,

    /// Base directory for `images/`, `contents/` and `guide/prompts.md`.
    #[arg(long, default_value = ".")]
    pub out: String,

    /// Username for optional authentication (password via
    /// PROMPTHARVEST_PASSWORD).
    #[arg(long)]
    pub username: Option<String>,

    /// Minimum text length for per-image text files.
    #[arg(long, default_value_t = 25)]
    pub extract_min_length: usize,

    /// Minimum text length for prompt guide sections.
    #[arg(long, default_value_t = 150)]
    pub organize_min_length: usize,

    /// OCR language passed to tesseract.
    #[arg(long, default_value = "por")]
    pub lang: String,

    /// Tesseract page segmentation mode.
    #[arg(long, default_value_t = 6)]
    pub psm: u32,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Carousel post URL (repeat for multiple posts).
    #[arg(long = "url", required = true)]
    pub urls: Vec<String>,

    /// Target directory for downloaded images.
    #[arg(long, default_value = "images")]
    pub images_dir: String,

    /// Username for optional authentication (password via
    /// PROMPTHARVEST_PASSWORD).
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Directory with downloaded images.
    #[arg(long, default_value = "images")]
    pub images_dir: String,

    /// Output directory for extracted texts.
    #[arg(long, default_value = "contents")]
    pub out_dir: String,

    /// Minimum text length for per-image text files.
    #[arg(long, default_value_t = 25)]
    pub min_length: usize,

    /// OCR language passed to tesseract.
    #[arg(long, default_value = "por")]
    pub lang: String,

    /// Tesseract page segmentation mode.
    #[arg(long, default_value_t = 6)]
    pub psm: u32,
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Directory with extracted text files.
    #[arg(long, default_value = "contents")]
    pub texts_dir: String,

    /// Output path for the prompt guide.
    #[arg(long, default_value = "guide/prompts.md")]
    pub out: String,

    /// Minimum text length for prompt guide sections.
    #[arg(long, default_value_t = 150)]
    pub min_length: usize,
}
