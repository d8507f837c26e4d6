use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{DedupError, Result};
use crate::model::{Cluster, ClusterId, NewQuestion, Question, QuestionId, StoredQuestion};
use crate::storage::QuestionStore;

/// Full contents of a store. Also the on-disk document of [`super::JsonFileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub questions: Vec<Question>,
    pub clusters: Vec<Cluster>,
    /// Highest id ever handed out; ids are never reused, even after a reset.
    #[serde(default)]
    pub last_question_id: QuestionId,
    #[serde(default)]
    pub last_cluster_id: ClusterId,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: StoreSnapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(state: StoreSnapshot) -> Self {
        Self { state }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.clone()
    }

    pub fn restore(&mut self, state: StoreSnapshot) {
        self.state = state;
    }

    pub fn state(&self) -> &StoreSnapshot {
        &self.state
    }

    fn cluster_mut(&mut self, id: ClusterId) -> Option<&mut Cluster> {
        self.state.clusters.iter_mut().find(|c| c.id == id)
    }
}

impl QuestionStore for MemoryStore {
    fn list_questions(&self) -> Result<Vec<StoredQuestion>> {
        Ok(self.state.questions.iter().map(StoredQuestion::from).collect())
    }

    fn insert_question(&mut self, question: NewQuestion) -> Result<QuestionId> {
        if let Some(cluster_id) = question.cluster_id {
            if !self.state.clusters.iter().any(|c| c.id == cluster_id) {
                return Err(DedupError::Storage(format!(
                    "cannot insert question into missing cluster {cluster_id}"
                )));
            }
        }

        self.state.last_question_id += 1;
        let id = self.state.last_question_id;
        self.state.questions.push(Question {
            id,
            text: question.text,
            topic: question.topic,
            embedding: question.embedding,
            cluster_id: question.cluster_id,
            source_channel: question.source_channel,
            source_user: question.source_user,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_question_cluster(&mut self, id: QuestionId, cluster_id: ClusterId) -> Result<()> {
        if !self.state.clusters.iter().any(|c| c.id == cluster_id) {
            return Err(DedupError::Storage(format!(
                "cannot assign question {id} to missing cluster {cluster_id}"
            )));
        }
        let question = self
            .state
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| DedupError::Storage(format!("question {id} not found")))?;
        question.cluster_id = Some(cluster_id);
        Ok(())
    }

    fn create_cluster(&mut self, topic: Option<&str>, count: u32) -> Result<ClusterId> {
        self.state.last_cluster_id += 1;
        let id = self.state.last_cluster_id;
        let now = Utc::now();
        self.state.clusters.push(Cluster {
            id,
            topic: topic.map(str::to_string),
            count,
            faq_drafted: false,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    fn increment_cluster_count(&mut self, id: ClusterId) -> Result<()> {
        let cluster = self
            .cluster_mut(id)
            .ok_or_else(|| DedupError::Storage(format!("cluster {id} not found")))?;
        cluster.count += 1;
        cluster.updated_at = Utc::now();
        Ok(())
    }

    fn get_cluster(&self, id: ClusterId) -> Result<Option<Cluster>> {
        Ok(self.state.clusters.iter().find(|c| c.id == id).cloned())
    }

    fn list_clusters(&self) -> Result<Vec<Cluster>> {
        Ok(self.state.clusters.clone())
    }

    fn cluster_questions(&self, id: ClusterId) -> Result<Vec<Question>> {
        Ok(self
            .state
            .questions
            .iter()
            .filter(|q| q.cluster_id == Some(id))
            .cloned()
            .collect())
    }

    fn set_faq_drafted(&mut self, id: ClusterId) -> Result<bool> {
        match self.cluster_mut(id) {
            Some(cluster) => {
                cluster.faq_drafted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn reset_all(&mut self) -> Result<()> {
        self.state.questions.clear();
        self.state.clusters.clear();
        Ok(())
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let before = self.snapshot();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.restore(before);
                Err(err)
            }
        }
    }
}
