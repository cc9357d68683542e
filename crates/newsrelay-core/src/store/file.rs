// # File Link Store
//
// File-based implementation of LinkStore.
//
// ## File Format
//
// Plain UTF-8 text, one link per line, no header or footer, no escaping:
//
// ```text
// https://www.tecmundo.com.br/mercado/1.htm
// https://olhardigital.com.br/2025/01/09/ciencia/nasa/
// ```
//
// ## Crash Behavior
//
// - Appends are flushed and synced before `record()` returns
// - The file is never rewritten, so a crash can only leave a torn last line
// - A torn last line never matches a real link; the next append starts on
//   a fresh line so the fragment cannot swallow it

use async_trait::async_trait;
use std::collections::HashSet;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::Error;
use crate::traits::link_store::{LinkStore, check_storable};

/// Append-only, line-oriented link store
///
/// # Example
///
/// ```rust,no_run
/// use newsrelay_core::store::FileLinkStore;
/// use newsrelay_core::traits::LinkStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileLinkStore::new("sent_links.txt").await?;
///
///     let sent = store.load().await?;
///     if !sent.contains("https://example.com/a") {
///         // ... deliver, then:
///         store.record("https://example.com/a").await?;
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileLinkStore {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl FileLinkStore {
    /// Open a file link store
    ///
    /// The file itself is created lazily by the first append. Missing parent
    /// directories are created here.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create link store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            path,
            append_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the last byte of a non-empty file is something other than `\n`
    async fn has_torn_tail(file: &mut fs::File) -> Result<bool, std::io::Error> {
        let len = file.metadata().await?.len();
        if len == 0 {
            return Ok(false);
        }

        file.seek(SeekFrom::End(-1)).await?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last).await?;
        Ok(last[0] != b'\n')
    }
}

fn parse_links(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl LinkStore for FileLinkStore {
    async fn load(&self) -> Result<HashSet<String>, Error> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Link store file does not exist yet: {}", self.path.display());
                return Ok(HashSet::new());
            }
            Err(e) => {
                return Err(Error::link_store(format!(
                    "Failed to read link store {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        if let std::borrow::Cow::Owned(_) = content {
            tracing::warn!(
                "Link store {} contains invalid UTF-8; affected lines were decoded lossily",
                self.path.display()
            );
        }

        let links = parse_links(&content);
        tracing::debug!("Loaded {} links from {}", links.len(), self.path.display());
        Ok(links)
    }

    async fn record(&self, link: &str) -> Result<(), Error> {
        check_storable(link)?;

        let _guard = self.append_lock.lock().await;

        let mut file = fs::OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                Error::link_store(format!(
                    "Failed to open link store {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        let mut line = String::with_capacity(link.len() + 2);
        if Self::has_torn_tail(&mut file).await? {
            tracing::warn!(
                "Link store {} ends with a partial line; starting a new line",
                self.path.display()
            );
            line.push('\n');
        }
        line.push_str(link);
        line.push('\n');

        file.write_all(line.as_bytes()).await.map_err(|e| {
            Error::link_store(format!(
                "Failed to append to link store {}: {}",
                self.path.display(),
                e
            ))
        })?;
        file.flush().await?;
        file.sync_data().await.map_err(|e| {
            Error::link_store(format!(
                "Failed to sync link store {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Recorded link in {}: {}", self.path.display(), link);
        Ok(())
    }
}
