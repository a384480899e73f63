//! Structure acquisition from the RCSB PDB or a local directory.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{DockError, Result};

const RCSB_DOWNLOAD_URL: &str = "https://files.rcsb.org/download";

/// Places the structure named `id` at `dest`.
#[async_trait]
pub trait StructureSource: Send + Sync {
    async fn fetch(&self, id: &str, dest: &Path) -> Result<PathBuf>;
}

/// Downloads PDB-format entries from RCSB.
#[derive(Debug, Clone)]
pub struct RcsbFetcher {
    client: Client,
    base_url: String,
}

impl RcsbFetcher {
    pub fn new() -> Result<Self> {
        Self::with_base_url(RCSB_DOWNLOAD_URL)
    }

    /// Use a mirror instead of files.rcsb.org.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DockError::AcquisitionFailed {
                id: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, id: &str) -> String {
        format!("{}/{}.pdb", self.base_url, id.to_uppercase())
    }

    async fn download(&self, id: &str) -> std::result::Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(self.url(id)).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl StructureSource for RcsbFetcher {
    async fn fetch(&self, id: &str, dest: &Path) -> Result<PathBuf> {
        if is_cached(dest).await {
            debug!("PDB {} found in cache at {:?}", id, dest);
            return Ok(dest.to_path_buf());
        }

        info!("Fetching PDB {} from RCSB", id);
        let content = self.download(id).await.map_err(|e| DockError::AcquisitionFailed {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        if content.is_empty() {
            return Err(DockError::AcquisitionFailed {
                id: id.to_string(),
                reason: "server returned an empty file".to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(dest, content).await?;

        Ok(dest.to_path_buf())
    }
}

/// Copies `<id>.pdb` out of a local directory, for offline runs.
#[derive(Debug, Clone)]
pub struct LocalStructureSource {
    dir: PathBuf,
}

impl LocalStructureSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn candidates(&self, id: &str) -> Vec<PathBuf> {
        let mut names = vec![format!("{id}.pdb"), format!("{}.pdb", id.to_lowercase()), format!("{}.pdb", id.to_uppercase())];
        names.dedup();
        names.into_iter().map(|n| self.dir.join(n)).collect()
    }
}

#[async_trait]
impl StructureSource for LocalStructureSource {
    async fn fetch(&self, id: &str, dest: &Path) -> Result<PathBuf> {
        for candidate in self.candidates(id) {
            if !is_cached(&candidate).await {
                continue;
            }
            debug!("Using local structure {:?}", candidate);
            if candidate != dest {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::copy(&candidate, dest).await?;
            }
            return Ok(dest.to_path_buf());
        }

        Err(DockError::AcquisitionFailed {
            id: id.to_string(),
            reason: format!("no non-empty {id}.pdb in {}", self.dir.display()),
        })
    }
}

async fn is_cached(path: &Path) -> bool {
    matches!(fs::metadata(path).await, Ok(meta) if meta.is_file() && meta.len() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_source_copies_structure() {
        let library = tempdir().unwrap();
        let work = tempdir().unwrap();
        std::fs::write(library.path().join("1stp.pdb"), "HEADER    BIOTIN BINDING PROTEIN\n").unwrap();

        let dest = work.path().join("run").join("1stp.pdb");
        let path = LocalStructureSource::new(library.path()).fetch("1stp", &dest).await.unwrap();

        assert_eq!(path, dest);
        assert!(std::fs::read_to_string(&dest).unwrap().starts_with("HEADER"));
    }

    #[tokio::test]
    async fn test_local_source_matches_uppercase_file() {
        let library = tempdir().unwrap();
        std::fs::write(library.path().join("1STP.pdb"), "ATOM\n").unwrap();

        let dest = library.path().join("copy.pdb");
        assert!(LocalStructureSource::new(library.path()).fetch("1stp", &dest).await.is_ok());
    }

    #[tokio::test]
    async fn test_local_source_missing_structure() {
        let library = tempdir().unwrap();
        let dest = library.path().join("out.pdb");
        let err = LocalStructureSource::new(library.path()).fetch("9zzz", &dest).await.unwrap_err();
        assert!(matches!(err, DockError::AcquisitionFailed { id, .. } if id == "9zzz"));
    }

    #[tokio::test]
    async fn test_fetcher_reuses_cached_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("1stp.pdb");
        std::fs::write(&dest, "cached").unwrap();

        // Unroutable mirror: only the cache can satisfy this.
        let fetcher = RcsbFetcher::with_base_url("http://127.0.0.1:9/").unwrap();
        assert_eq!(fetcher.fetch("1stp", &dest).await.unwrap(), dest);
    }

    #[tokio::test]
    async fn test_fetcher_network_error_is_acquisition_failure() {
        let dir = tempdir().unwrap();
        let fetcher = RcsbFetcher::with_base_url("http://127.0.0.1:9").unwrap();
        let err = fetcher.fetch("1stp", &dir.path().join("1stp.pdb")).await.unwrap_err();
        assert!(matches!(err, DockError::AcquisitionFailed { .. }));
    }

    #[test]
    fn test_download_url() {
        let fetcher = RcsbFetcher::new().unwrap();
        assert_eq!(fetcher.url("1stp"), "https://files.rcsb.org/download/1STP.pdb");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_pdb() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("1crn.pdb");
        let path = RcsbFetcher::new().unwrap().fetch("1CRN", &dest).await.unwrap();
        assert!(path.exists());
    }
}
