//! Last-known file state with lock-free, tear-free access.

use arc_swap::ArcSwap;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Content and modification time from one successful reload.
///
/// The pair is always stored and loaded as a unit, so a reader never sees
/// content from one reload next to a timestamp from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    content: Bytes,
    modified: SystemTime,
}

impl Snapshot {
    /// Create a snapshot from raw content and a modification time.
    pub fn new(content: impl Into<Bytes>, modified: SystemTime) -> Self {
        Self {
            content: content.into(),
            modified,
        }
    }

    /// The file content.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// The modification time reported by the stat that accompanied the read.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

/// Read the whole file, then stat it.
///
/// The file is re-read in full every time; files behind a symlink swap are
/// replaced wholesale so there is no delta to compute.
pub(crate) async fn read_snapshot(path: &Path) -> std::io::Result<Snapshot> {
    let content = tokio::fs::read(path).await?;
    let modified = tokio::fs::metadata(path).await?.modified()?;
    Ok(Snapshot::new(content, modified))
}

/// Holder for the current [`Snapshot`].
///
/// Reads are lock-free via `arc-swap`. Writers swap in a complete snapshot and
/// compare against the exact value they displaced, so concurrent writers each
/// get a correct change flag.
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    /// Create a store seeded with the initial snapshot.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Get the current snapshot.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the current snapshot.
    ///
    /// Returns `true` when the new content differs byte-for-byte from the
    /// content it replaced. A changed timestamp alone does not count.
    pub fn replace(&self, next: Snapshot) -> bool {
        let next = Arc::new(next);
        let previous = self.current.swap(Arc::clone(&next));
        previous.content != next.content
    }
}

/// A minimal file-info record describing the cached content.
///
/// The mode is always `0o644` and is not derived from the real file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    name: String,
    size: u64,
    modified: SystemTime,
}

impl FileInfo {
    /// Permission bits reported for every watched file.
    pub const MODE: u32 = 0o644;

    pub(crate) fn new(path: &Path, snapshot: &Snapshot) -> Self {
        Self {
            name: path.display().to_string(),
            size: snapshot.content.len() as u64,
            modified: snapshot.modified,
        }
    }

    /// The watched path as given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the cached content in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Modification time from the last successful reload.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Always `false`; only regular file content is cached.
    pub fn is_dir(&self) -> bool {
        false
    }

    /// Always [`FileInfo::MODE`].
    pub fn mode(&self) -> u32 {
        Self::MODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_replace_reports_content_change() {
        let store = SnapshotStore::new(Snapshot::new("v1", at(1)));
        assert!(store.replace(Snapshot::new("v2", at(2))));
        assert_eq!(store.load().content(), &Bytes::from_static(b"v2"));
        assert_eq!(store.load().modified(), at(2));
    }

    #[test]
    fn test_replace_same_content_is_not_a_change() {
        let store = SnapshotStore::new(Snapshot::new("same", at(1)));
        for i in 2..10 {
            assert!(!store.replace(Snapshot::new("same", at(i))));
        }
        // The timestamp still tracks the latest stat.
        assert_eq!(store.load().modified(), at(9));
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_pairs() {
        let store = Arc::new(SnapshotStore::new(Snapshot::new("0", at(0))));

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 1..2000u64 {
                    store.replace(Snapshot::new(i.to_string(), at(i)));
                }
            })
        };

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..2000 {
                        let snapshot = store.load();
                        let n: u64 = std::str::from_utf8(snapshot.content())
                            .unwrap()
                            .parse()
                            .unwrap();
                        assert_eq!(snapshot.modified(), at(n));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_file_info_is_fixed_shape() {
        let snapshot = Snapshot::new("hello", at(42));
        let info = FileInfo::new(Path::new("/run/secrets/token"), &snapshot);
        assert_eq!(info.name(), "/run/secrets/token");
        assert_eq!(info.size(), 5);
        assert_eq!(info.modified(), at(42));
        assert!(!info.is_dir());
        assert_eq!(info.mode(), 0o644);
    }

    #[tokio::test]
    async fn test_read_snapshot_missing_file() {
        let result = read_snapshot(Path::new("/nonexistent/swapwatch/file")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_snapshot_reads_whole_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, "abc").unwrap();

        let snapshot = read_snapshot(&path).await.unwrap();
        assert_eq!(snapshot.content(), &Bytes::from_static(b"abc"));
        assert_eq!(
            snapshot.modified(),
            std::fs::metadata(&path).unwrap().modified().unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_change_flag_matches_adjacent_difference(
            contents in proptest::collection::vec(prop_oneof![Just("a"), Just("b"), Just("")], 1..40)
        ) {
            let store = SnapshotStore::new(Snapshot::new(contents[0], at(0)));
            let mut previous = contents[0];
            for (i, content) in contents.iter().enumerate().skip(1) {
                let changed = store.replace(Snapshot::new(*content, at(i as u64)));
                prop_assert_eq!(changed, *content != previous);
                previous = *content;
            }
        }
    }
}
