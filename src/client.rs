use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://www.instagram.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("connection failed")]
    Connect(#[source] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("malformed payload from {url}")]
    Payload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid image url in post payload: {url}")]
    ImageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("write image file: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("PROMPTHARVEST_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub shortcode: String,
    pub image_urls: Vec<Url>,
}

#[derive(Debug)]
pub struct MediaClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl MediaClient {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build media http client")?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let login_page = self.endpoint("/accounts/login/");
        let response = self
            .http
            .get(&login_page)
            .send()
            .await
            .map_err(ClientError::Connect)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: login_page,
                status,
            });
        }
        let csrf = response
            .cookies()
            .find(|cookie| cookie.name() == "csrftoken")
            .map(|cookie| cookie.value().to_owned())
            .ok_or_else(|| {
                ClientError::AccessDenied("login page did not set a csrf token".to_owned())
            })?;

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let enc_password = format!("#PWD_INSTAGRAM_BROWSER:0:{timestamp}:{password}");

        let login_ajax = self.endpoint("/accounts/login/ajax/");
        let response = self
            .http
            .post(&login_ajax)
            .header("X-CSRFToken", csrf.as_str())
            .form(&[
                ("username", username),
                ("enc_password", enc_password.as_str()),
            ])
            .send()
            .await
            .map_err(ClientError::Connect)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::AccessDenied(format!(
                "login rejected ({status})"
            )));
        }

        let raw = response.text().await.map_err(ClientError::Connect)?;
        let outcome: LoginResponse =
            serde_json::from_str(&raw).map_err(|source| ClientError::Payload {
                url: login_ajax,
                source,
            })?;
        if !outcome.authenticated {
            return Err(ClientError::AccessDenied(format!(
                "login rejected for {username}"
            )));
        }

        Ok(())
    }

    pub async fn resolve(&self, shortcode: &str) -> Result<Post, ClientError> {
        let url = self.endpoint(&format!("/p/{shortcode}/?__a=1&__d=dis"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Connect)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(shortcode.to_owned()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AccessDenied(format!(
                "post {shortcode} requires login"
            )));
        }
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }

        let raw = response.text().await.map_err(ClientError::Connect)?;
        // A login wall renders HTML with status 200; anything that is not
        // JSON at all is an inaccessible post, not a protocol change.
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|_| {
            ClientError::AccessDenied(format!("post {shortcode} is private or requires login"))
        })?;
        let payload: PostResponse =
            serde_json::from_value(value).map_err(|source| ClientError::Payload { url, source })?;

        post_from_payload(payload)
    }

    // A single image saves as `<shortcode>.<ext>`, carousel images as
    // `<shortcode>_1.<ext>`, `<shortcode>_2.<ext>`, ...
    pub async fn download(&self, post: &Post, target_dir: &Path) -> Result<usize, ClientError> {
        let single = post.image_urls.len() == 1;

        for (idx, image_url) in post.image_urls.iter().enumerate() {
            let response = self
                .http
                .get(image_url.clone())
                .send()
                .await
                .map_err(ClientError::Connect)?;
            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status {
                    url: image_url.to_string(),
                    status,
                });
            }
            let bytes = response.bytes().await.map_err(ClientError::Connect)?;

            let ext = image_extension(image_url);
            let file_name = if single {
                format!("{}.{ext}", post.shortcode)
            } else {
                format!("{}_{}.{ext}", post.shortcode, idx + 1)
            };
            let path = target_dir.join(file_name);
            std::fs::write(&path, &bytes).map_err(|source| ClientError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "image saved");
        }

        Ok(post.image_urls.len())
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    authenticated: bool,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    graphql: GraphqlContainer,
}

#[derive(Debug, Deserialize)]
struct GraphqlContainer {
    shortcode_media: ShortcodeMedia,
}

#[derive(Debug, Deserialize)]
struct ShortcodeMedia {
    #[serde(rename = "__typename")]
    typename: String,
    shortcode: String,
    display_url: String,
    #[serde(default)]
    edge_sidecar_to_children: Option<SidecarChildren>,
}

#[derive(Debug, Deserialize)]
struct SidecarChildren {
    edges: Vec<SidecarEdge>,
}

#[derive(Debug, Deserialize)]
struct SidecarEdge {
    node: SidecarNode,
}

#[derive(Debug, Deserialize)]
struct SidecarNode {
    #[serde(rename = "__typename")]
    typename: String,
    display_url: String,
}

fn post_from_payload(payload: PostResponse) -> Result<Post, ClientError> {
    let media = payload.graphql.shortcode_media;

    let display_urls = match media.typename.as_str() {
        "GraphImage" => vec![media.display_url],
        "GraphSidecar" => media
            .edge_sidecar_to_children
            .map(|children| {
                children
                    .edges
                    .into_iter()
                    .filter(|edge| edge.node.typename == "GraphImage")
                    .map(|edge| edge.node.display_url)
                    .collect()
            })
            .unwrap_or_default(),
        // GraphVideo and any newer media kinds: pictures only.
        _ => Vec::new(),
    };

    let mut image_urls = Vec::with_capacity(display_urls.len());
    for display_url in display_urls {
        let parsed = Url::parse(&display_url).map_err(|source| ClientError::ImageUrl {
            url: display_url.clone(),
            source,
        })?;
        image_urls.push(parsed);
    }

    Ok(Post {
        shortcode: media.shortcode,
        image_urls,
    })
}

fn image_extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_owned())
}
