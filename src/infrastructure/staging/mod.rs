use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::settings::StagingConfig;

/// Local scratch directories shared by the storage client and the engine.
#[derive(Debug, Clone)]
pub struct StagingArea {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    thumbnail_dir: PathBuf,
}

impl StagingArea {
    pub fn new(config: &StagingConfig) -> Self {
        Self {
            raw_dir: config.raw_dir.clone(),
            processed_dir: config.processed_dir.clone(),
            thumbnail_dir: config.thumbnail_dir.clone(),
        }
    }

    /// Creates the three staging directories if they are missing.
    pub async fn ensure_directories(&self) -> io::Result<()> {
        for dir in [&self.raw_dir, &self.processed_dir, &self.thumbnail_dir] {
            if !tokio::fs::try_exists(dir).await? {
                tokio::fs::create_dir_all(dir).await?;
                info!("Directory created at {}", dir.display());
            }
        }
        Ok(())
    }

    pub fn raw_path(&self, file_name: &str) -> PathBuf {
        self.raw_dir.join(file_name)
    }

    pub fn processed_path(&self, file_name: &str) -> PathBuf {
        self.processed_dir.join(file_name)
    }

    pub fn thumbnail_path(&self, file_name: &str) -> PathBuf {
        self.thumbnail_dir.join(file_name)
    }

    pub async fn delete_thumbnail(&self, file_name: &str) -> io::Result<()> {
        delete_file(&self.thumbnail_path(file_name)).await
    }
}

/// Removes a file; a file that is already gone counts as deleted.
pub async fn delete_file(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("File deleted at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("File not found at {}, skipping delete", path.display());
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete file at {}: {}", path.display(), e);
            Err(e)
        }
    }
}
