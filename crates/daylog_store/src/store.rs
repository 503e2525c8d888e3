//! Document store: durable load/transform/save of one collection's value.

use crate::error::{StoreError, StoreResult};
use crate::lock::LockRegistry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A document store keeping each collection in one JSON file.
///
/// Collections are identified by a stable name; collection `users` lives
/// at `<root>/users.json`. Values are persisted as pretty-printed JSON so
/// the files stay human-readable.
///
/// # Durability
///
/// [`commit`](Self::commit) writes the new contents to a temporary
/// sibling file, syncs it, then renames it over the target. The rename is
/// the only step that makes new data visible, so a reader always observes
/// either the fully-previous or fully-new contents - never a truncated
/// file - even if the process dies mid-write.
///
/// # Concurrency
///
/// [`update`](Self::update) is the only mutation path. It holds the
/// collection's lock for the whole load-transform-commit cycle, so
/// concurrent updates on the same collection serialize in FIFO order
/// while different collections proceed in parallel.
#[derive(Debug)]
pub struct DocumentStore {
    root: PathBuf,
    locks: LockRegistry,
}

impl DocumentStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            locks: LockRegistry::new(),
        })
    }

    /// Returns the root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path backing a collection.
    #[must_use]
    pub fn collection_path(&self, collection_id: &str) -> PathBuf {
        self.root.join(format!("{collection_id}.json"))
    }

    fn temp_path(&self, collection_id: &str) -> PathBuf {
        self.root.join(format!("{collection_id}.json.tmp"))
    }

    /// Loads a collection's current value.
    ///
    /// Returns `fallback` if the collection file does not exist; the file
    /// is not created. Lookups tolerate a stale snapshot, so no lock is
    /// taken.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupted`] if the file exists but does not
    /// parse. Corrupt data is never replaced with the fallback.
    pub fn load<T: DeserializeOwned>(&self, collection_id: &str, fallback: T) -> StoreResult<T> {
        let path = self.collection_path(collection_id);

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(collection = collection_id, "collection absent, using fallback");
                return Ok(fallback);
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_slice(&data).map_err(|err| {
            warn!(collection = collection_id, error = %err, "collection file unparseable");
            StoreError::corrupted(path, err.to_string())
        })
    }

    /// Durably replaces a collection's contents.
    ///
    /// Write-then-rename for crash safety:
    /// 1. Write the serialized value to a temporary sibling file
    /// 2. Sync the temporary file to disk
    /// 3. Rename it over the collection file
    /// 4. Fsync the directory so the rename itself is durable
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    /// On failure the previous contents remain intact.
    pub fn commit<T: Serialize>(&self, collection_id: &str, value: &T) -> StoreResult<()> {
        let path = self.collection_path(collection_id);
        let temp_path = self.temp_path(collection_id);

        let data =
            serde_json::to_vec_pretty(value).map_err(|err| StoreError::serialize(err.to_string()))?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        self.sync_directory()?;

        debug!(collection = collection_id, bytes = data.len(), "committed");
        Ok(())
    }

    /// Loads, transforms, and commits a collection under its lock.
    ///
    /// `transform` must be a pure function from the old value to the new
    /// value. If it returns an error the whole update aborts and the
    /// collection file is left untouched; the error propagates to the
    /// caller and the lock is released either way.
    ///
    /// This is the only path permitted to mutate a collection.
    ///
    /// # Errors
    ///
    /// Propagates load, transform, and commit failures.
    pub fn update<T, E, F>(&self, collection_id: &str, fallback: T, transform: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce(T) -> Result<T, E>,
    {
        self.locks.with_exclusive(collection_id, || {
            let current = self.load(collection_id, fallback)?;
            let next = transform(current)?;
            self.commit(collection_id, &next)?;
            Ok(next)
        })
    }

    /// Returns the number of collections with an in-flight operation.
    #[must_use]
    pub fn active_collections(&self) -> usize {
        self.locks.active_collections()
    }

    /// Syncs the store directory so renames are durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> StoreResult<()> {
        // On Unix, fsync on a directory syncs the directory entries
        let dir = File::open(&self.root)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StoreResult<()> {
        // Windows NTFS journaling provides metadata durability; directory
        // fsync is not directly supported there.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u64,
        body: String,
    }

    #[test]
    fn load_missing_returns_fallback_without_creating_file() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let notes: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert!(notes.is_empty());
        assert!(!store.collection_path("notes").exists());
    }

    #[test]
    fn commit_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let notes = vec![
            Note {
                id: 1,
                body: "first".into(),
            },
            Note {
                id: 2,
                body: "second".into(),
            },
        ];
        store.commit("notes", &notes).unwrap();

        let loaded: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(loaded, notes);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = DocumentStore::open(dir.path()).unwrap();
            store.commit("notes", &vec![Note { id: 1, body: "kept".into() }]).unwrap();
        }

        // Simulated process restart: a fresh store over the same directory.
        let store = DocumentStore::open(dir.path()).unwrap();
        let loaded: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].body, "kept");
    }

    #[test]
    fn corrupt_file_is_fatal_not_replaced() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        fs::write(store.collection_path("notes"), b"{ not json").unwrap();

        let result: StoreResult<Vec<Note>> = store.load("notes", Vec::new());
        assert!(matches!(result, Err(StoreError::Corrupted { .. })));

        // The corrupt contents are still on disk, untouched.
        let raw = fs::read(store.collection_path("notes")).unwrap();
        assert_eq!(raw, b"{ not json");
    }

    #[test]
    fn files_are_human_readable_json() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        store.commit("notes", &vec![Note { id: 7, body: "x".into() }]).unwrap();

        let text = fs::read_to_string(store.collection_path("notes")).unwrap();
        // Pretty printed: multi-line with indentation.
        assert!(text.contains('\n'));
        assert!(text.contains("\"id\": 7"));
    }

    #[test]
    fn update_applies_transform_and_persists() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let out: Vec<Note> = store
            .update("notes", Vec::new(), |mut notes| {
                notes.push(Note { id: 1, body: "added".into() });
                Ok::<_, StoreError>(notes)
            })
            .unwrap();
        assert_eq!(out.len(), 1);

        let loaded: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(loaded, out);
    }

    #[test]
    fn failed_transform_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let before = vec![Note { id: 1, body: "original".into() }];
        store.commit("notes", &before).unwrap();

        let result: StoreResult<Vec<Note>> =
            store.update("notes", Vec::new(), |_notes| Err(StoreError::serialize("rejected")));
        assert!(result.is_err());

        let after: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn failed_transform_on_missing_collection_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let result: StoreResult<Vec<Note>> =
            store.update("notes", Vec::new(), |_notes| Err(StoreError::serialize("rejected")));
        assert!(result.is_err());
        assert!(!store.collection_path("notes").exists());
    }

    #[test]
    fn interrupted_commit_keeps_previous_contents() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let committed = vec![Note { id: 1, body: "committed".into() }];
        store.commit("notes", &committed).unwrap();

        // Simulate a crash after the temp write but before the rename:
        // a half-written temp sibling is lying around.
        fs::write(dir.path().join("notes.json.tmp"), b"[{\"id\":9,\"bo").unwrap();

        let loaded: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(loaded, committed);

        // The next commit replaces the stale temp file and succeeds.
        let next = vec![Note { id: 2, body: "next".into() }];
        store.commit("notes", &next).unwrap();
        let loaded: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(loaded, next);
    }

    #[test]
    fn concurrent_updates_apply_exactly_once_each() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DocumentStore::open(dir.path()).unwrap());

        let mut handles = Vec::new();
        for i in 0..16u64 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .update("notes", Vec::new(), move |mut notes: Vec<Note>| {
                        notes.push(Note {
                            id: i,
                            body: format!("note {i}"),
                        });
                        Ok::<_, StoreError>(notes)
                    })
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let notes: Vec<Note> = store.load("notes", Vec::new()).unwrap();
        assert_eq!(notes.len(), 16);
        assert_eq!(store.active_collections(), 0);
    }

    #[test]
    fn updates_on_distinct_collections_do_not_interfere() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DocumentStore::open(dir.path()).unwrap());

        let a = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..8 {
                    store
                        .update("foods", Vec::new(), |mut v: Vec<Note>| {
                            v.push(Note { id: 0, body: "f".into() });
                            Ok::<_, StoreError>(v)
                        })
                        .unwrap();
                }
            })
        };
        let b = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..8 {
                    store
                        .update("sleep", Vec::new(), |mut v: Vec<Note>| {
                            v.push(Note { id: 0, body: "s".into() });
                            Ok::<_, StoreError>(v)
                        })
                        .unwrap();
                }
            })
        };
        a.join().unwrap();
        b.join().unwrap();

        let foods: Vec<Note> = store.load("foods", Vec::new()).unwrap();
        let sleep: Vec<Note> = store.load("sleep", Vec::new()).unwrap();
        assert_eq!(foods.len(), 8);
        assert_eq!(sleep.len(), 8);
    }

    proptest! {
        #[test]
        fn round_trip_durability(notes in proptest::collection::vec(
            (any::<u64>(), ".{0,32}").prop_map(|(id, body)| Note { id, body }),
            0..16,
        )) {
            let dir = tempdir().unwrap();
            let store = DocumentStore::open(dir.path()).unwrap();

            store.commit("notes", &notes).unwrap();
            let loaded: Vec<Note> = store.load("notes", Vec::new()).unwrap();
            prop_assert_eq!(loaded, notes);
        }
    }
}
