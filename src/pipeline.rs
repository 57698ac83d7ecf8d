use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::{ExtractArgs, FetchArgs, OrganizeArgs, RunArgs};

// Reruns overwrite previous outputs.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let base_dir = PathBuf::from(&args.out);
    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("create output dir: {}", base_dir.display()))?;

    let images_dir = base_dir.join("images");
    let texts_dir = base_dir.join("contents");
    let guide_path = base_dir.join("guide").join("prompts.md");

    tracing::info!(posts = args.urls.len(), out = %base_dir.display(), "run: fetch");
    let fetched = crate::fetch::run(FetchArgs {
        urls: args.urls.clone(),
        images_dir: images_dir.to_string_lossy().to_string(),
        username: args.username.clone(),
    })
    .await
    .context("fetch")?;

    tracing::info!("run: extract");
    let extracted = crate::extract::run(ExtractArgs {
        images_dir: images_dir.to_string_lossy().to_string(),
        out_dir: texts_dir.to_string_lossy().to_string(),
        min_length: args.extract_min_length,
        lang: args.lang.clone(),
        psm: args.psm,
    })
    .context("extract")?;

    tracing::info!("run: organize");
    let organized = crate::organize::run(OrganizeArgs {
        texts_dir: texts_dir.to_string_lossy().to_string(),
        out: guide_path.to_string_lossy().to_string(),
        min_length: args.organize_min_length,
    })
    .context("organize")?;

    tracing::info!(
        posts = fetched.posts,
        images = fetched.images,
        failures = fetched.failures,
        texts = extracted.relevant,
        sections = organized.sections,
        "pipeline finished"
    );
    Ok(())
}
