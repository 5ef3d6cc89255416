use std::{
    ffi::OsString,
    io::ErrorKind,
    marker::PhantomData,
    path::PathBuf,
    sync::Arc,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::{debug, error, warn};

use crate::errors::ServiceError;

/// One element of the stored array.
///
/// Elements that do not decode as `T` are kept as raw JSON so rewriting the
/// document carries them over unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Record(T),
    Opaque(Value),
}

impl<T> Entry<T> {
    pub fn record(&self) -> Option<&T> {
        match self {
            Entry::Record(r) => Some(r),
            Entry::Opaque(_) => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut T> {
        match self {
            Entry::Record(r) => Some(r),
            Entry::Opaque(_) => None,
        }
    }

    pub fn into_record(self) -> Option<T> {
        match self {
            Entry::Record(r) => Some(r),
            Entry::Opaque(_) => None,
        }
    }
}

impl<T: Serialize> Serialize for Entry<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Entry::Record(r) => r.serialize(s),
            Entry::Opaque(v) => v.serialize(s),
        }
    }
}

/// JSON file-backed ordered list store.
///
/// The whole collection lives in one JSON array document. Nothing is cached:
/// every `load` reads the file, every `save` rewrites it in full. Mutations
/// should go through [`JsonListStore::update`], which holds the store's write
/// lock across load-modify-save so concurrent writers are applied one after
/// another instead of overwriting each other.
pub struct JsonListStore<T> {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Initialize the store for `path`, creating the parent directory if missing.
    /// The document itself is not created until the first save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Io(format!("cannot create {}: {e}", parent.display())))?;
        }
        Ok(Arc::new(Self { file_path, write_lock: Mutex::new(()), _marker: PhantomData }))
    }

    /// Read the full document.
    ///
    /// A missing document is the bootstrap case and yields an empty list. An
    /// empty document, or one that is not a JSON array, is logged and also
    /// treated as empty. Array elements that do not decode as `T` come back as
    /// [`Entry::Opaque`]. Any other read failure is [`ServiceError::Io`].
    pub async fn load(&self) -> Result<Vec<Entry<T>>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "data file missing; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(path = %self.file_path.display(), err = %e, "failed to read data file");
                return Err(ServiceError::Io(e.to_string()));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!(path = %self.file_path.display(), "data file is empty; treating as empty collection");
            return Ok(Vec::new());
        }

        let raw = match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.file_path.display(), err = %e, "data file is malformed; treating as empty collection");
                return Ok(Vec::new());
            }
        };

        Ok(raw
            .into_iter()
            .enumerate()
            .map(|(index, value)| match <T as Deserialize>::deserialize(&value) {
                Ok(record) => Entry::Record(record),
                Err(e) => {
                    warn!(path = %self.file_path.display(), index, err = %e, "record does not fit the schema; keeping it as is");
                    Entry::Opaque(value)
                }
            })
            .collect())
    }

    /// Only the elements that decoded as `T`, in document order.
    pub async fn load_records(&self) -> Result<Vec<T>, ServiceError> {
        Ok(self.load().await?.into_iter().filter_map(Entry::into_record).collect())
    }

    /// Overwrite the document with `entries`.
    pub async fn save(&self, entries: &[Entry<T>]) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        self.write_document(entries).await
    }

    /// Load, apply `f`, and persist the result while holding the write lock.
    /// When `f` fails nothing is written and its error is returned.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<Entry<T>>) -> Result<R, ServiceError> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        let out = f(&mut entries)?;
        self.write_document(&entries).await?;
        Ok(out)
    }

    // Caller must hold `write_lock`.
    async fn write_document(&self, entries: &[Entry<T>]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(entries).map_err(|e| {
            error!(path = %self.file_path.display(), err = %e, "failed to serialize products");
            ServiceError::persistence()
        })?;

        let tmp = self.tmp_path();
        let written = async {
            fs::write(&tmp, &data).await?;
            fs::rename(&tmp, &self.file_path).await
        }
        .await;

        if let Err(e) = written {
            error!(path = %self.file_path.display(), err = %e, "failed to save products");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::persistence());
        }
        debug!(path = %self.file_path.display(), count = entries.len(), "products saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.file_path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        n: u32,
    }

    fn item(id: &str, n: u32) -> Entry<Item> {
        Entry::Record(Item { id: id.into(), n })
    }

    fn tmp_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("json_list_store_{tag}_{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_loads_empty_without_creating_it() -> Result<(), anyhow::Error> {
        let path = tmp_file("missing");
        let store = JsonListStore::<Item>::new(&path).await?;
        assert!(store.load().await?.is_empty());
        assert!(fs::metadata(&path).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn empty_and_unparseable_documents_load_empty() -> Result<(), anyhow::Error> {
        let path = tmp_file("corrupt");
        let store = JsonListStore::<Item>::new(&path).await?;

        for content in ["", "   \n\t", "{not json", "{\"id\": \"1\"}", "[{\"id\": \"1\""] {
            fs::write(&path, content).await?;
            assert!(store.load().await?.is_empty(), "content {content:?} should load empty");
        }

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn elements_outside_the_schema_are_kept_opaque() -> Result<(), anyhow::Error> {
        let path = tmp_file("opaque");
        let store = JsonListStore::<Item>::new(&path).await?;
        fs::write(&path, r#"[{"id": "a", "n": 1}, {"id": "b", "n": null}, 7]"#).await?;

        let loaded = store.load().await?;
        assert_eq!(
            loaded,
            vec![item("a", 1), Entry::Opaque(json!({"id": "b", "n": null})), Entry::Opaque(json!(7))]
        );
        assert_eq!(store.load_records().await?, vec![Item { id: "a".into(), n: 1 }]);
        Ok(())
    }

    #[tokio::test]
    async fn mutation_keeps_records_it_did_not_touch() -> Result<(), anyhow::Error> {
        let path = tmp_file("keep_untouched");
        let store = JsonListStore::<Item>::new(&path).await?;
        fs::write(&path, r#"[{"id": "a", "n": 1}, {"id": "b", "n": "two", "extra": [1, 2]}, {"id": "c", "n": 3}]"#).await?;

        store
            .update(|entries| {
                entries.push(item("d", 4));
                Ok(())
            })
            .await?;

        let on_disk: Vec<Value> = serde_json::from_slice(&fs::read(&path).await?)?;
        assert_eq!(
            on_disk,
            vec![
                json!({"id": "a", "n": 1}),
                json!({"id": "b", "n": "two", "extra": [1, 2]}),
                json!({"id": "c", "n": 3}),
                json!({"id": "d", "n": 4}),
            ]
        );

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_a_fatal_error() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_list_store_dir_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).await?;
        let store = JsonListStore::<Item>::new(&dir).await?;

        assert!(matches!(store.load().await, Err(ServiceError::Io(_))));
        // renaming a file over a directory fails too
        assert!(matches!(store.save(&[]).await, Err(ServiceError::Persistence(_))));
        assert!(fs::metadata(store.tmp_path()).await.is_err());

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_round_trips_in_order() -> Result<(), anyhow::Error> {
        let path = tmp_file("roundtrip");
        let store = JsonListStore::<Item>::new(&path).await?;
        let entries = vec![item("b", 2), item("a", 1), item("c", 3)];
        store.save(&entries).await?;
        assert_eq!(store.load().await?, entries);

        // human-readable on disk
        let raw = fs::read_to_string(&path).await?;
        assert!(raw.contains("\n  {"));

        // saving what was loaded changes nothing
        let reloaded = store.load().await?;
        store.save(&reloaded).await?;
        assert_eq!(store.load().await?, entries);

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_document_untouched() -> Result<(), anyhow::Error> {
        let path = tmp_file("failed_update");
        let store = JsonListStore::<Item>::new(&path).await?;
        store.save(&[item("1", 1)]).await?;

        let res: Result<(), _> = store
            .update(|entries| {
                entries.clear();
                Err(ServiceError::Validation("nope".into()))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(store.load().await?.len(), 1);

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_are_not_lost() -> Result<(), anyhow::Error> {
        let path = tmp_file("concurrent");
        let store = JsonListStore::<Item>::new(&path).await?;

        let mut handles = Vec::new();
        for i in 0..40u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(move |entries| {
                        entries.push(Entry::Record(Item { id: i.to_string(), n: i }));
                        Ok(())
                    })
                    .await
            }));
        }
        for h in handles {
            h.await??;
        }

        let mut ids: Vec<u32> = store.load_records().await?.into_iter().map(|it| it.n).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..40).collect::<Vec<_>>());

        let _ = fs::remove_file(&path).await;
        Ok(())
    }
}
