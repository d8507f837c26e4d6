use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::{DedupError, Result};
use crate::model::{Cluster, ClusterId, NewQuestion, Question, QuestionId, StoredQuestion};
use crate::storage::memory::{MemoryStore, StoreSnapshot};
use crate::storage::QuestionStore;

/// [`MemoryStore`] mirrored to a single JSON document.
///
/// Every transaction holds an exclusive advisory lock on `<path>.lock`,
/// re-reads the document under it, and rewrites the file (temp file +
/// rename) before releasing it. Separate handles and separate processes
/// therefore never overwrite each other's commits. If the write fails, the
/// in-memory state is rolled back so memory and disk never disagree.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    in_transaction: bool,
}

fn storage_err(action: &str, path: &Path, err: impl std::fmt::Display) -> DedupError {
    DedupError::Storage(format!("{action} {}: {err}", path.display()))
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn load_snapshot(path: &Path) -> Result<StoreSnapshot> {
    if !path.exists() {
        return Ok(StoreSnapshot::default());
    }
    let raw = fs::read_to_string(path).map_err(|e| storage_err("read", path, e))?;
    if raw.trim().is_empty() {
        return Ok(StoreSnapshot::default());
    }
    serde_json::from_str(&raw).map_err(|e| storage_err("parse", path, e))
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_snapshot(&path)?;

        tracing::debug!(
            path = %path.display(),
            questions = state.questions.len(),
            clusters = state.clusters.len(),
            "opened question store"
        );

        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(state),
            in_transaction: false,
        })
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| storage_err("create directory", parent, e))?;
        }
        Ok(())
    }

    /// Blocks until this process holds the store lock. Released when the
    /// returned file is dropped.
    fn lock(&self) -> Result<File> {
        self.ensure_parent()?;
        let lock_path = sibling(&self.path, ".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| storage_err("open lock", &lock_path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| storage_err("lock", &lock_path, e))?;
        Ok(file)
    }

    fn persist(&self) -> Result<()> {
        self.ensure_parent()?;

        let tmp = sibling(&self.path, ".tmp");
        let file = File::create(&tmp).map_err(|e| storage_err("create", &tmp, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self.inner.state())
            .map_err(|e| storage_err("serialize", &tmp, e))?;
        writer.flush().map_err(|e| storage_err("flush", &tmp, e))?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| storage_err("replace", &self.path, e))
    }

    fn mutate<T>(&mut self, op: impl FnOnce(&mut MemoryStore) -> Result<T>) -> Result<T> {
        if self.in_transaction {
            return op(&mut self.inner);
        }
        self.transaction(|store| op(&mut store.inner))
    }
}

impl QuestionStore for JsonFileStore {
    fn list_questions(&self) -> Result<Vec<StoredQuestion>> {
        self.inner.list_questions()
    }

    fn insert_question(&mut self, question: NewQuestion) -> Result<QuestionId> {
        self.mutate(|inner| inner.insert_question(question))
    }

    fn update_question_cluster(&mut self, id: QuestionId, cluster_id: ClusterId) -> Result<()> {
        self.mutate(|inner| inner.update_question_cluster(id, cluster_id))
    }

    fn create_cluster(&mut self, topic: Option<&str>, count: u32) -> Result<ClusterId> {
        self.mutate(|inner| inner.create_cluster(topic, count))
    }

    fn increment_cluster_count(&mut self, id: ClusterId) -> Result<()> {
        self.mutate(|inner| inner.increment_cluster_count(id))
    }

    fn get_cluster(&self, id: ClusterId) -> Result<Option<Cluster>> {
        self.inner.get_cluster(id)
    }

    fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.inner.list_clusters()
    }

    fn cluster_questions(&self, id: ClusterId) -> Result<Vec<Question>> {
        self.inner.cluster_questions(id)
    }

    fn set_faq_drafted(&mut self, id: ClusterId) -> Result<bool> {
        self.mutate(|inner| inner.set_faq_drafted(id))
    }

    fn reset_all(&mut self) -> Result<()> {
        self.mutate(|inner| inner.reset_all())
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.in_transaction {
            return f(self);
        }

        let _lock = self.lock()?;
        self.inner.restore(load_snapshot(&self.path)?);
        let before = self.inner.snapshot();
        self.in_transaction = true;
        let result = f(self);
        self.in_transaction = false;

        let result = result.and_then(|value| self.persist().map(|()| value));
        if let Err(err) = &result {
            tracing::warn!(path = %self.path.display(), error = %err, "rolling back store transaction");
            self.inner.restore(before);
        }
        result
    }
}
