//! GitHub contents API client
//!
//! The repository named in [`StoreConfig`] is the only persistence layer:
//! directory listings, file reads and commits all go through
//! `/repos/{owner}/{repo}/contents/{path}`.

mod error;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

pub use error::StoreError;

use crate::config::{Credentials, StoreConfig};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Characters escaped inside a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One entry of a contents API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    /// Inline base64 body, present on single-file responses
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// Client for one GitHub repository
#[derive(Debug, Clone)]
pub struct GitHubStore {
    client: Client,
    api_url: String,
    credentials: Option<Credentials>,
    branch: Option<String>,
}

impl GitHubStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("mdblog"));
        default_headers.insert(USER_AGENT, user_agent);

        let client = Client::builder().default_headers(default_headers).build()?;

        let credentials = config.credentials();
        if credentials.is_none() {
            tracing::warn!("GitHub owner, repo or token not set; posts are unavailable");
        }

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            credentials,
            branch: config.branch.clone().filter(|b| !b.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&Credentials, StoreError> {
        self.credentials.as_ref().ok_or(StoreError::NotConfigured)
    }

    fn contents_url(&self, creds: &Credentials, path: &str) -> String {
        let encoded = path
            .trim_matches('/')
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, creds.owner, creds.repo, encoded
        )
    }

    fn authorized(&self, builder: RequestBuilder, creds: &Credentials) -> RequestBuilder {
        builder.bearer_auth(&creds.token)
    }

    /// List a directory
    pub async fn list_dir(&self, path: &str) -> Result<Vec<ContentEntry>, StoreError> {
        let creds = self.credentials()?;
        let url = self.contents_url(creds, path);
        tracing::debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url), creds).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Metadata (and possibly inline content) of a single file
    pub async fn get_file(&self, path: &str) -> Result<ContentEntry, StoreError> {
        let creds = self.credentials()?;
        let url = self.contents_url(creds, path);
        tracing::debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url), creds).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Raw text behind a `download_url`.
    ///
    /// The token is only sent back to the API host; other hosts get an
    /// anonymous request.
    pub async fn download(&self, url: &str) -> Result<String, StoreError> {
        let creds = self.credentials()?;
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if self.is_api_url(url) {
            request = self.authorized(request, creds);
        }
        let response = request.send().await?;
        Ok(check(response).await?.text().await?)
    }

    fn is_api_url(&self, url: &str) -> bool {
        url.strip_prefix(self.api_url.as_str())
            .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Text of the file at `path`
    pub async fn read_file(&self, path: &str) -> Result<String, StoreError> {
        let entry = self.get_file(path).await?;

        if let Some(url) = entry.download_url.as_deref() {
            return self.download(url).await;
        }

        match (entry.content.as_deref(), entry.encoding.as_deref()) {
            (Some(inline), Some("base64")) => decode_inline(inline),
            _ => Err(StoreError::MissingContent(entry.path)),
        }
    }

    /// Create or update `path` with `content` in a single commit
    pub async fn put_file(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<(), StoreError> {
        let creds = self.credentials()?;
        let url = self.contents_url(creds, path);
        tracing::debug!("PUT {}", url);

        let body = PutRequest {
            message,
            content: BASE64.encode(content),
            branch: self.branch.as_deref(),
        };

        let response = self
            .authorized(self.client.put(&url), creds)
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`StoreError::Status`]
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let snippet: String = text.chars().take(200).collect();
    Err(StoreError::Status(status, snippet))
}

/// GitHub wraps inline base64 at 60 columns
fn decode_inline(inline: &str) -> Result<String, StoreError> {
    let compact: String = inline.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}
