use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type QuestionId = u64;
pub type ClusterId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub topic: Option<String>,
    pub embedding: Vec<f32>,
    pub cluster_id: Option<ClusterId>,
    pub source_channel: Option<String>,
    pub source_user: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub topic: Option<String>,
    pub count: u32,
    #[serde(default)]
    pub faq_drafted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by a storage scan; just what matching needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredQuestion {
    pub id: QuestionId,
    pub text: String,
    pub embedding: Vec<f32>,
    pub cluster_id: Option<ClusterId>,
}

impl From<&Question> for StoredQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            embedding: q.embedding.clone(),
            cluster_id: q.cluster_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionInput {
    pub text: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub source_channel: Option<String>,
    #[serde(default)]
    pub source_user: Option<String>,
}

impl QuestionInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// Insert payload handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub text: String,
    pub topic: Option<String>,
    pub embedding: Vec<f32>,
    pub cluster_id: Option<ClusterId>,
    pub source_channel: Option<String>,
    pub source_user: Option<String>,
}

impl NewQuestion {
    pub fn from_input(input: &QuestionInput, embedding: Vec<f32>, cluster_id: Option<ClusterId>) -> Self {
        Self {
            text: input.text.clone(),
            topic: input.topic.clone(),
            embedding,
            cluster_id,
            source_channel: input.source_channel.clone(),
            source_user: input.source_user.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    New,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub cluster_id: Option<ClusterId>,
    pub cluster_count: u32,
    pub similar_questions: Vec<String>,
    pub faq_drafted: bool,
}

impl CheckOutcome {
    pub fn new_question() -> Self {
        Self {
            status: CheckStatus::New,
            cluster_id: None,
            cluster_count: 0,
            similar_questions: Vec::new(),
            faq_drafted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub id: QuestionId,
    pub text: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: ClusterId,
    pub topic: Option<String>,
    pub count: u32,
    pub faq_drafted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub questions: Vec<ClusterMember>,
}
