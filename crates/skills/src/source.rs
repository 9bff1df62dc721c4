//! Skill registries at their fetch boundary.
//!
//! Responsibilities:
//! - Define the `SkillSource` trait the installer works against.
//! - Provide the HTTP implementation used against real registries.
//!
//! Does NOT handle:
//! - Registry-side semantics (indexes, publishing, auth). tether only ever
//!   GETs manifests and files.

use crate::error::{Result, SkillError};
use crate::manifest::SkillManifest;

/// Registry queried when `--source` is not given.
pub const DEFAULT_SOURCE: &str = "https://skills.tethermesh.io";

/// Where skill manifests and files come from.
#[allow(async_fn_in_trait)]
pub trait SkillSource {
    /// Fetches the current manifest for `name`.
    async fn manifest(&self, name: &str) -> Result<SkillManifest>;

    /// Fetches one bundle file of `manifest`.
    async fn file(&self, manifest: &SkillManifest, path: &str) -> Result<Vec<u8>>;

    /// Identifier recorded in the lockfile for installs from this source.
    fn id(&self) -> &str;
}

/// HTTP-backed registry client.
///
/// Layout: `{base}/{name}/manifest.json` and
/// `{base}/{name}/{version}/{file}`.
pub struct HttpSource {
    base: url::Url,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self> {
        let base = url::Url::parse(base.trim_end_matches('/')).map_err(|_| {
            SkillError::InvalidSource {
                value: base.to_string(),
            }
        })?;
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url> {
        let mut url = self.base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| SkillError::InvalidSource {
                    value: self.base.to_string(),
                })?;
            parts.extend(segments);
        }
        Ok(url)
    }

    async fn get(&self, url: url::Url) -> Result<reqwest::Response> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SkillError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl SkillSource for HttpSource {
    async fn manifest(&self, name: &str) -> Result<SkillManifest> {
        let url = self.endpoint(&[name, "manifest.json"])?;
        tracing::debug!(%url, "fetching manifest");
        let response = self.get(url).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SkillError::MalformedManifest {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    async fn file(&self, manifest: &SkillManifest, path: &str) -> Result<Vec<u8>> {
        let mut segments: Vec<&str> = vec![&manifest.name, &manifest.version];
        segments.extend(path.split('/'));
        let url = self.endpoint(&segments)?;
        tracing::debug!(%url, "fetching skill file");
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn id(&self) -> &str {
        self.base.as_str()
    }
}
