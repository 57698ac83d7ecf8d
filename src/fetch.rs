use std::path::{Path, PathBuf};

use anyhow::Context as _;
use thiserror::Error;

use crate::cli::FetchArgs;
use crate::client::{ClientConfig, ClientError, MediaClient};
use crate::extract::{has_image_extension, list_file_names};

pub const POST_MARKER: &str = "/p/";

const MIN_SHORTCODE_LEN: usize = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid post reference {url}: {reason}")]
    InvalidReference { url: String, reason: String },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("list {}", .dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub posts: usize,
    pub images: usize,
    pub failures: usize,
}

pub fn shortcode_from_url(url: &str) -> Result<String, FetchError> {
    let Some((_, rest)) = url.split_once(POST_MARKER) else {
        return Err(FetchError::InvalidReference {
            url: url.to_owned(),
            reason: format!("missing {POST_MARKER:?} segment"),
        });
    };
    let shortcode = rest.split(['/', '?']).next().unwrap_or_default();
    if shortcode.chars().count() < MIN_SHORTCODE_LEN {
        return Err(FetchError::InvalidReference {
            url: url.to_owned(),
            reason: format!("shortcode {shortcode:?} is too short"),
        });
    }
    Ok(shortcode.to_owned())
}

pub fn count_shortcode_images(names: &[String], shortcode: &str) -> usize {
    names
        .iter()
        .filter(|name| name.starts_with(shortcode) && has_image_extension(name))
        .count()
}

pub async fn run(args: FetchArgs) -> anyhow::Result<FetchReport> {
    let images_dir = PathBuf::from(&args.images_dir);
    std::fs::create_dir_all(&images_dir)
        .with_context(|| format!("create images dir: {}", images_dir.display()))?;

    let client = MediaClient::new(ClientConfig::from_env())?;
    if let Some(username) = &args.username {
        try_login(&client, username).await;
    }

    let mut report = FetchReport::default();
    for url in &args.urls {
        match fetch_post(&client, url, &images_dir).await {
            Ok(saved) => {
                report.posts += 1;
                report.images += saved;
            }
            Err(err) => {
                report.failures += 1;
                match &err {
                    FetchError::InvalidReference { .. } => {
                        tracing::error!(url, %err, "skipping invalid post reference");
                    }
                    FetchError::Client(ClientError::NotFound(_))
                    | FetchError::Client(ClientError::AccessDenied(_)) => {
                        tracing::error!(url, %err, "post unavailable, skipping");
                    }
                    FetchError::Client(ClientError::Connect(_)) => {
                        tracing::error!(url, %err, "connection failed, check network and retry this url");
                    }
                    _ => {
                        tracing::error!(url, ?err, "unexpected fetch failure, skipping");
                    }
                }
            }
        }
    }

    tracing::info!(
        posts = report.posts,
        images = report.images,
        failures = report.failures,
        "fetch finished"
    );
    Ok(report)
}

async fn fetch_post(
    client: &MediaClient,
    url: &str,
    images_dir: &Path,
) -> Result<usize, FetchError> {
    let shortcode = shortcode_from_url(url)?;
    tracing::info!(url, shortcode, "fetching post");

    let post = client.resolve(&shortcode).await?;
    client.download(&post, images_dir).await?;

    let names = list_file_names(images_dir).map_err(|source| FetchError::List {
        dir: images_dir.to_path_buf(),
        source,
    })?;
    let saved = count_shortcode_images(&names, &shortcode);
    if saved == 0 {
        tracing::warn!(shortcode, "no images saved for this post");
    } else {
        tracing::info!(shortcode, images = saved, "post downloaded");
    }
    Ok(saved)
}

// Best-effort: every failure path logs and returns.
async fn try_login(client: &MediaClient, username: &str) {
    let password = match std::env::var("PROMPTHARVEST_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => {
            tracing::warn!(
                username,
                "PROMPTHARVEST_PASSWORD is not set, continuing without login"
            );
            return;
        }
    };

    match client.login(username, &password).await {
        Ok(()) => tracing::info!(username, "logged in"),
        Err(err) => {
            tracing::warn!(username, %err, "login failed, continuing without authentication");
        }
    }
}
