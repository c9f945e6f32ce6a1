//! The base map: the authoritative snapshot pending changes are folded onto.
//!
//! [`BaseMapSource`] knows where the map file and its version marker live
//! and how to fetch fresh copies. [`BaseMap`] keeps the decoded snapshot and
//! marker in memory so queries do not re-read the file, and swaps both
//! atomically on [`refresh`](BaseMap::refresh).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crowdmap_world::{MapCodec, MapSnapshot};
use tokio::sync::RwLock;

use crate::config::{BaseMapConfig, BaseMapSourceKind};
use crate::error::BaseMapError;

// ---------------------------------------------------------------------------
// Source (enum dispatch over async fetchers)
// ---------------------------------------------------------------------------

/// Where base map files come from.
///
/// Uses enum dispatch instead of trait objects because async methods are
/// not dyn-compatible.
pub enum BaseMapSource {
    /// Download both files over HTTP into local paths.
    Http(HttpSource),
    /// Use files already on disk.
    Local(LocalSource),
}

impl BaseMapSource {
    /// Build the source described by `config`.
    pub fn from_config(config: &BaseMapConfig) -> Result<Self, BaseMapError> {
        match config.source {
            BaseMapSourceKind::Http => Ok(Self::Http(HttpSource::new(config)?)),
            BaseMapSourceKind::Local => Ok(Self::Local(LocalSource::new(
                config.map_file.clone(),
                config.version_file.clone(),
            ))),
        }
    }

    /// Local path of the map file.
    pub fn map_file(&self) -> &Path {
        match self {
            Self::Http(source) => &source.map_file,
            Self::Local(source) => &source.map_file,
        }
    }

    /// Local path of the version marker file.
    pub fn version_file(&self) -> &Path {
        match self {
            Self::Http(source) => &source.version_file,
            Self::Local(source) => &source.version_file,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Http(_) => "http",
            Self::Local(_) => "local",
        }
    }

    /// Make sure both files exist locally, downloading missing ones.
    pub async fn ensure_present(&self) -> Result<(), BaseMapError> {
        match self {
            Self::Http(source) => source.ensure_present().await,
            Self::Local(source) => source.ensure_present().await,
        }
    }

    /// Replace the local files with the latest remote copies.
    ///
    /// For a local source the files on disk are already authoritative, so
    /// this only checks they are still there.
    pub async fn fetch(&self) -> Result<(), BaseMapError> {
        match self {
            Self::Http(source) => source.fetch().await,
            Self::Local(source) => source.ensure_present().await,
        }
    }
}

/// Downloads the base map and version marker over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    map_url: String,
    version_url: String,
    map_file: PathBuf,
    version_file: PathBuf,
}

impl HttpSource {
    /// Create a downloader from configuration.
    pub fn new(config: &BaseMapConfig) -> Result<Self, BaseMapError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|source| BaseMapError::Download {
                url: config.map_download_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            map_url: config.map_download_url.clone(),
            version_url: config.version_download_url.clone(),
            map_file: config.map_file.clone(),
            version_file: config.version_file.clone(),
        })
    }

    async fn ensure_present(&self) -> Result<(), BaseMapError> {
        if exists(&self.version_file).await && exists(&self.map_file).await {
            return Ok(());
        }
        self.fetch().await
    }

    /// Download both files next to their destinations and move them into
    /// place only once both have arrived. The version marker is moved last,
    /// so the marker on disk never names a map that is not there.
    async fn fetch(&self) -> Result<(), BaseMapError> {
        let staged_map = staging_path(&self.map_file);
        let staged_version = staging_path(&self.version_file);

        let downloaded = async {
            self.download(&self.map_url, &staged_map).await?;
            self.download(&self.version_url, &staged_version).await
        }
        .await;
        if let Err(err) = downloaded {
            discard(&staged_map).await;
            discard(&staged_version).await;
            return Err(err);
        }

        promote(&staged_map, &self.map_file).await?;
        promote(&staged_version, &self.version_file).await
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<(), BaseMapError> {
        let to_error = |source| BaseMapError::Download {
            url: url.to_owned(),
            source,
        };
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(to_error)?
            .bytes()
            .await
            .map_err(to_error)?;

        write_file(destination, &bytes).await?;
        tracing::info!(
            url,
            path = %destination.display(),
            bytes = bytes.len(),
            "Base map file downloaded"
        );
        Ok(())
    }
}

/// Reads the base map from files managed outside the service.
pub struct LocalSource {
    map_file: PathBuf,
    version_file: PathBuf,
}

impl LocalSource {
    /// Create a source over existing files.
    pub const fn new(map_file: PathBuf, version_file: PathBuf) -> Self {
        Self {
            map_file,
            version_file,
        }
    }

    async fn ensure_present(&self) -> Result<(), BaseMapError> {
        for path in [&self.version_file, &self.map_file] {
            if !exists(path).await {
                return Err(BaseMapError::Missing(path.clone()));
            }
        }
        Ok(())
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Sibling path a download is written to before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

async fn promote(staged: &Path, destination: &Path) -> Result<(), BaseMapError> {
    tokio::fs::rename(staged, destination)
        .await
        .map_err(|source| BaseMapError::Io {
            path: destination.to_path_buf(),
            source,
        })
}

async fn discard(staged: &Path) {
    if let Err(err) = tokio::fs::remove_file(staged).await
        && err.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %staged.display(), error = %err, "Could not remove partial download");
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BaseMapError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| BaseMapError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| BaseMapError::Io {
            path: path.to_path_buf(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Cached base snapshot
// ---------------------------------------------------------------------------

/// A decoded base map and the version marker it was published under.
#[derive(Debug, Clone)]
pub struct BaseSnapshot {
    /// The decoded map. Shared; clone the inner value before mutating.
    pub map: Arc<MapSnapshot>,
    /// The base version marker.
    pub marker: String,
}

/// The current base map, held in memory.
pub struct BaseMap {
    source: BaseMapSource,
    codec: Arc<dyn MapCodec>,
    current: RwLock<BaseSnapshot>,
}

impl BaseMap {
    /// Make sure the source files exist, then decode them.
    pub async fn load(source: BaseMapSource, codec: Arc<dyn MapCodec>) -> Result<Self, BaseMapError> {
        source.ensure_present().await?;
        let snapshot = read_snapshot(&source, &codec).await?;
        tracing::info!(
            source = source.name(),
            marker = %snapshot.marker,
            rooms = snapshot.map.rooms.len(),
            "Base map loaded"
        );
        Ok(Self {
            source,
            codec,
            current: RwLock::new(snapshot),
        })
    }

    /// The codec used to decode and render maps.
    pub fn codec(&self) -> Arc<dyn MapCodec> {
        Arc::clone(&self.codec)
    }

    /// Where the base map comes from.
    pub const fn source(&self) -> &BaseMapSource {
        &self.source
    }

    /// The current snapshot. Cheap: shares the decoded map.
    pub async fn current(&self) -> BaseSnapshot {
        self.current.read().await.clone()
    }

    /// The current base version marker.
    pub async fn marker(&self) -> String {
        self.current.read().await.marker.clone()
    }

    /// Fetch fresh files from the source and swap in the decoded result.
    ///
    /// The previous snapshot stays in place if anything fails.
    pub async fn refresh(&self) -> Result<BaseSnapshot, BaseMapError> {
        self.source.fetch().await?;
        let snapshot = read_snapshot(&self.source, &self.codec).await?;
        let previous = {
            let mut current = self.current.write().await;
            std::mem::replace(&mut *current, snapshot.clone())
        };
        tracing::info!(
            source = self.source.name(),
            previous_marker = %previous.marker,
            marker = %snapshot.marker,
            rooms = snapshot.map.rooms.len(),
            "Base map refreshed"
        );
        Ok(snapshot)
    }
}

async fn read_snapshot(
    source: &BaseMapSource,
    codec: &Arc<dyn MapCodec>,
) -> Result<BaseSnapshot, BaseMapError> {
    let version_file = source.version_file();
    let marker = tokio::fs::read_to_string(version_file)
        .await
        .map_err(|source| BaseMapError::Io {
            path: version_file.to_path_buf(),
            source,
        })?
        .trim()
        .to_owned();

    let codec = Arc::clone(codec);
    let map_file = source.map_file().to_path_buf();
    let map = tokio::task::spawn_blocking(move || codec.read(&map_file)).await??;

    Ok(BaseSnapshot {
        map: Arc::new(map),
        marker,
    })
}
