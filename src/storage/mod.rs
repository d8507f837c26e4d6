//! Storage collaborator for the questions and clusters relations.
//!
//! The engine only talks to [`QuestionStore`]. Multi-step transitions run
//! inside [`QuestionStore::transaction`], which must apply all of the
//! closure's mutations or none of them.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::{MemoryStore, StoreSnapshot};

use crate::error::Result;
use crate::model::{Cluster, ClusterId, NewQuestion, Question, QuestionId, StoredQuestion};

pub trait QuestionStore {
    /// All stored questions in insertion order.
    fn list_questions(&self) -> Result<Vec<StoredQuestion>>;

    fn insert_question(&mut self, question: NewQuestion) -> Result<QuestionId>;

    fn update_question_cluster(&mut self, id: QuestionId, cluster_id: ClusterId) -> Result<()>;

    fn create_cluster(&mut self, topic: Option<&str>, count: u32) -> Result<ClusterId>;

    /// Adds one member and refreshes `updated_at`.
    fn increment_cluster_count(&mut self, id: ClusterId) -> Result<()>;

    fn get_cluster(&self, id: ClusterId) -> Result<Option<Cluster>>;

    fn list_clusters(&self) -> Result<Vec<Cluster>>;

    /// Member questions of a cluster in insertion order.
    fn cluster_questions(&self, id: ClusterId) -> Result<Vec<Question>>;

    fn list_cluster_members(&self, id: ClusterId) -> Result<Vec<String>> {
        Ok(self
            .cluster_questions(id)?
            .into_iter()
            .map(|q| q.text)
            .collect())
    }

    /// Latches `faq_drafted`. Returns `false` when the cluster does not exist.
    fn set_faq_drafted(&mut self, id: ClusterId) -> Result<bool>;

    fn reset_all(&mut self) -> Result<()>;

    /// Runs `f` atomically: on `Err` every mutation made by `f` is undone.
    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}
