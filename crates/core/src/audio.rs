// crates/core/src/audio.rs
//! Generated hint audio on disk.
//!
//! Files are named `{wordId}_hint_{timestampMs}.mp3`. The name is part of the
//! public contract (clients build URLs from it), so [`build_filename`] and
//! [`AudioAsset::parse`] must stay bit-exact. For a given word the file with
//! the greatest timestamp is canonical.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

const HINT_INFIX: &str = "_hint_";
const EXTENSION: &str = ".mp3";

/// Errors from reading or writing the audio directory.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("IO error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write empty audio for word {word_id}")]
    Empty { word_id: i64 },
}

impl AudioError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A generated audio file, identified by word and creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AudioAsset {
    pub word_id: i64,
    pub timestamp_ms: i64,
}

impl AudioAsset {
    pub fn new(word_id: i64, timestamp_ms: i64) -> Self {
        Self {
            word_id,
            timestamp_ms,
        }
    }

    pub fn filename(&self) -> String {
        build_filename(self.word_id, self.timestamp_ms)
    }

    /// Parse a file name produced by [`build_filename`].
    ///
    /// Anything that does not round-trip exactly (leading zeros, other
    /// extensions, extra segments) is rejected.
    pub fn parse(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(EXTENSION)?;
        let (id, ts) = stem.split_once(HINT_INFIX)?;
        let asset = Self::new(id.parse().ok()?, ts.parse().ok()?);
        (asset.filename() == name).then_some(asset)
    }
}

/// `{word_id}_hint_{timestamp_ms}.mp3`
pub fn build_filename(word_id: i64, timestamp_ms: i64) -> String {
    format!("{word_id}{HINT_INFIX}{timestamp_ms}{EXTENSION}")
}

/// All assets for `word_id` in `dir`, oldest first.
///
/// A missing directory is treated as empty.
pub async fn list_for_word(dir: &Path, word_id: i64) -> Result<Vec<AudioAsset>, AudioError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AudioError::io(dir, e)),
    };

    let mut assets = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AudioError::io(dir, e))?
    {
        let name = entry.file_name();
        if let Some(asset) = name.to_str().and_then(AudioAsset::parse) {
            if asset.word_id == word_id {
                assets.push(asset);
            }
        }
    }
    assets.sort();
    Ok(assets)
}

/// The canonical (newest) asset for `word_id`, if any exists.
pub async fn latest_for_word(dir: &Path, word_id: i64) -> Result<Option<AudioAsset>, AudioError> {
    Ok(list_for_word(dir, word_id).await?.pop())
}

/// Write `bytes` as a new asset for `word_id` stamped with `timestamp_ms`.
///
/// The bytes go to a hidden staging file first and are hard-linked under
/// the final name only once fully synced, so a cancelled or failed write
/// never leaves a truncated file that [`list_for_word`] would pick up. If
/// the final name is taken the timestamp is bumped until an unused one is
/// found, so two writes never clobber each other.
pub async fn write_asset(
    dir: &Path,
    word_id: i64,
    timestamp_ms: i64,
    bytes: &[u8],
) -> Result<AudioAsset, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty { word_id });
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AudioError::io(dir, e))?;

    let mut asset = AudioAsset::new(word_id, timestamp_ms);
    let (staging, mut file) = loop {
        let path = dir.join(staging_name(&asset));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => break (StagingFile(path), file),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                asset.timestamp_ms += 1;
            }
            Err(e) => return Err(AudioError::io(path, e)),
        }
    };

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    drop(file);
    written.map_err(|e| AudioError::io(&staging.0, e))?;

    loop {
        let path = dir.join(asset.filename());
        match tokio::fs::hard_link(&staging.0, &path).await {
            Ok(()) => break,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                asset.timestamp_ms += 1;
            }
            Err(e) => return Err(AudioError::io(path, e)),
        }
    }
    Ok(asset)
}

/// `.{filename}.part`, which [`AudioAsset::parse`] never accepts.
fn staging_name(asset: &AudioAsset) -> String {
    format!(".{}.part", asset.filename())
}

/// Removes the staging file when dropped, including when the write future
/// is cancelled mid-flight.
struct StagingFile(PathBuf);

impl Drop for StagingFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.0.display(), error = %e, "Failed to remove staging audio file");
            }
        }
    }
}

/// Delete all but the newest `keep` assets for `word_id`.
///
/// `keep` is clamped to at least 1, so the canonical file always survives.
/// Returns the names of deleted files. Individual delete failures are logged
/// and skipped.
pub async fn prune_older(dir: &Path, word_id: i64, keep: usize) -> Result<Vec<String>, AudioError> {
    let assets = list_for_word(dir, word_id).await?;
    let keep = keep.max(1);
    let excess = assets.len().saturating_sub(keep);

    let mut removed = Vec::with_capacity(excess);
    for asset in &assets[..excess] {
        let name = asset.filename();
        let path = dir.join(&name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed.push(name),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to prune old audio file");
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn touch(dir: &Path, name: &str) {
        tokio::fs::write(dir.join(name), b"ID3").await.unwrap();
    }

    #[test]
    fn test_build_filename_exact() {
        assert_eq!(build_filename(42, 1000), "42_hint_1000.mp3");
        assert_eq!(AudioAsset::new(42, 1000).filename(), "42_hint_1000.mp3");
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert_eq!(AudioAsset::parse("5_hint_200.mp3"), Some(AudioAsset::new(5, 200)));
        assert_eq!(AudioAsset::parse("5_hint_200.wav"), None);
        assert_eq!(AudioAsset::parse("05_hint_200.mp3"), None);
        assert_eq!(AudioAsset::parse("5_hint_.mp3"), None);
        assert_eq!(AudioAsset::parse("5_word_200.mp3"), None);
        assert_eq!(AudioAsset::parse("5_hint_200_hint_3.mp3"), None);
    }

    #[tokio::test]
    async fn test_latest_picks_max_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "5_hint_100.mp3").await;
        touch(tmp.path(), "5_hint_200.mp3").await;
        touch(tmp.path(), "55_hint_900.mp3").await;
        touch(tmp.path(), "notes.txt").await;

        let latest = latest_for_word(tmp.path(), 5).await.unwrap().unwrap();
        assert_eq!(latest.filename(), "5_hint_200.mp3");
    }

    #[tokio::test]
    async fn test_latest_compares_numerically() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "5_hint_999.mp3").await;
        touch(tmp.path(), "5_hint_1000.mp3").await;

        let latest = latest_for_word(tmp.path(), 5).await.unwrap().unwrap();
        assert_eq!(latest.timestamp_ms, 1000);
    }

    #[tokio::test]
    async fn test_latest_missing_dir_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert_eq!(latest_for_word(&missing, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_asset_never_clobbers() {
        let tmp = tempfile::tempdir().unwrap();
        let first = write_asset(tmp.path(), 7, 500, b"one").await.unwrap();
        let second = write_asset(tmp.path(), 7, 500, b"two").await.unwrap();

        assert_eq!(first.filename(), "7_hint_500.mp3");
        assert_eq!(second.filename(), "7_hint_501.mp3");
        let content = tokio::fs::read(tmp.path().join("7_hint_500.mp3")).await.unwrap();
        assert_eq!(content, b"one");
    }

    #[tokio::test]
    async fn test_write_asset_leaves_only_final_file() {
        let tmp = tempfile::tempdir().unwrap();
        let asset = write_asset(tmp.path(), 3, 10, b"ID3data").await.unwrap();

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec![asset.filename()]);
    }

    #[tokio::test]
    async fn test_cancelled_write_is_never_visible() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = vec![7u8; 64 * 1024 * 1024];

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            write_asset(tmp.path(), 1, 100, &bytes),
        )
        .await;

        match (result, latest_for_word(tmp.path(), 1).await.unwrap()) {
            (Err(_elapsed), latest) => assert_eq!(latest, None),
            (Ok(written), Some(latest)) => {
                // Finished inside the deadline; the file must then be complete.
                assert_eq!(written.unwrap(), latest);
                let len = tokio::fs::metadata(tmp.path().join(latest.filename()))
                    .await
                    .unwrap()
                    .len();
                assert_eq!(len, bytes.len() as u64);
            }
            (Ok(written), None) => panic!("write returned {written:?} but no file is visible"),
        }
    }

    #[test]
    fn test_staging_file_is_not_an_asset() {
        let asset = AudioAsset::new(1, 100);
        assert_eq!(staging_name(&asset), ".1_hint_100.mp3.part");
        assert_eq!(AudioAsset::parse(&staging_name(&asset)), None);
    }

    #[tokio::test]
    async fn test_write_asset_rejects_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let err = write_asset(tmp.path(), 7, 500, b"").await.unwrap_err();
        assert!(matches!(err, AudioError::Empty { word_id: 7 }));
        assert!(list_for_word(tmp.path(), 7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prune_keeps_newest() {
        let tmp = tempfile::tempdir().unwrap();
        for ts in [100, 200, 300] {
            touch(tmp.path(), &build_filename(9, ts)).await;
        }
        touch(tmp.path(), &build_filename(10, 50)).await;

        let removed = prune_older(tmp.path(), 9, 1).await.unwrap();
        assert_eq!(removed, vec!["9_hint_100.mp3", "9_hint_200.mp3"]);

        let left = list_for_word(tmp.path(), 9).await.unwrap();
        assert_eq!(left, vec![AudioAsset::new(9, 300)]);
        assert_eq!(list_for_word(tmp.path(), 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prune_zero_keep_still_keeps_canonical() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), &build_filename(9, 100)).await;
        let removed = prune_older(tmp.path(), 9, 0).await.unwrap();
        assert!(removed.is_empty());
    }
}
