//! Incremental online clustering.
//!
//! Clusters are never computed in bulk. Each arriving question is compared
//! against every stored question; the best match at or above the threshold
//! decides one of three transitions:
//!
//! | best match                  | transition                                   |
//! |-----------------------------|----------------------------------------------|
//! | none                        | store standalone, status `new`               |
//! | row already in a cluster    | join that cluster, count + 1                 |
//! | standalone row              | create cluster of 2 with the matched row     |
//!
//! Two existing clusters are never unified; only the single best row counts.

use crate::embed::EmbeddingProvider;
use crate::error::{DedupError, Result};
use crate::matching::{BestMatch, DEFAULT_THRESHOLD, best_match, rank_similarities};
use crate::model::{
    CheckOutcome, CheckStatus, ClusterId, ClusterMember, ClusterSummary, NewQuestion,
    QuestionId, QuestionInput, SimilarityScore,
};
use crate::storage::QuestionStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// What a new question does to storage, decided from its best match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Standalone,
    JoinCluster {
        cluster_id: ClusterId,
    },
    FormCluster {
        matched_id: QuestionId,
        matched_text: String,
    },
}

impl Transition {
    pub fn from_match(best: Option<&BestMatch<'_>>) -> Self {
        match best {
            None => Transition::Standalone,
            Some(m) => match m.row.cluster_id {
                Some(cluster_id) => Transition::JoinCluster { cluster_id },
                None => Transition::FormCluster {
                    matched_id: m.row.id,
                    matched_text: m.row.text.clone(),
                },
            },
        }
    }
}

pub struct ClusterEngine<E, S> {
    embedder: E,
    store: S,
    config: EngineConfig,
}

impl<E, S> ClusterEngine<E, S>
where
    E: EmbeddingProvider,
    S: QuestionStore,
{
    pub fn new(embedder: E, store: S) -> Self {
        Self::with_config(embedder, store, EngineConfig::default())
    }

    pub fn with_config(embedder: E, store: S, config: EngineConfig) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text)?;
        if vector.is_empty() {
            return Err(DedupError::EmptyEmbedding);
        }
        Ok(vector)
    }

    /// Embeds `input`, matches it against stored questions and records it.
    ///
    /// The embedding is fetched before storage is touched, so a provider
    /// failure leaves storage unchanged. Everything after that runs in one
    /// store transaction.
    pub fn check_question(&mut self, input: &QuestionInput) -> Result<CheckOutcome> {
        let embedding = self.embed(&input.text)?;
        let threshold = self.config.threshold;

        self.store.transaction(|store| {
            let rows = store.list_questions()?;
            let best = best_match(&embedding, &rows, threshold)?;
            if let Some(m) = &best {
                tracing::debug!(
                    matched_id = m.row.id,
                    similarity = m.similarity,
                    "best match above threshold"
                );
            }
            let transition = Transition::from_match(best.as_ref());
            apply(store, input, embedding, transition)
        })
    }

    /// Latches the cluster's FAQ-drafted flag. Unknown ids are an error.
    pub fn mark_drafted(&mut self, cluster_id: ClusterId) -> Result<()> {
        if !self.store.set_faq_drafted(cluster_id)? {
            return Err(DedupError::ClusterNotFound(cluster_id));
        }
        tracing::info!(cluster_id, "cluster marked as FAQ drafted");
        Ok(())
    }

    /// Scores `text` against every stored question, highest first.
    /// Read-only; the text is not stored.
    pub fn debug_similarities(&self, text: &str) -> Result<Vec<SimilarityScore>> {
        let embedding = self.embed(text)?;
        let rows = self.store.list_questions()?;
        let mut scores = rank_similarities(&embedding, &rows)?;
        for s in &mut scores {
            s.similarity = (s.similarity * 10_000.0).round() / 10_000.0;
        }
        Ok(scores)
    }

    /// All clusters, largest first, each with its member questions.
    pub fn list_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let mut clusters = self.store.list_clusters()?;
        clusters.sort_by(|a, b| b.count.cmp(&a.count).then(a.id.cmp(&b.id)));

        clusters
            .into_iter()
            .map(|c| {
                let questions = self
                    .store
                    .cluster_questions(c.id)?
                    .into_iter()
                    .map(|q| ClusterMember {
                        text: q.text,
                        created_at: q.created_at,
                    })
                    .collect();
                Ok(ClusterSummary {
                    cluster_id: c.id,
                    topic: c.topic,
                    count: c.count,
                    faq_drafted: c.faq_drafted,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                    questions,
                })
            })
            .collect()
    }

    /// Deletes every question and cluster.
    pub fn reset(&mut self) -> Result<()> {
        self.store.reset_all()?;
        tracing::info!("question store cleared");
        Ok(())
    }
}

fn apply<S: QuestionStore>(
    store: &mut S,
    input: &QuestionInput,
    embedding: Vec<f32>,
    transition: Transition,
) -> Result<CheckOutcome> {
    match transition {
        Transition::Standalone => {
            let id = store.insert_question(NewQuestion::from_input(input, embedding, None))?;
            tracing::info!(question_id = id, "stored standalone question");
            Ok(CheckOutcome::new_question())
        }
        Transition::JoinCluster { cluster_id } => {
            store.insert_question(NewQuestion::from_input(input, embedding, Some(cluster_id)))?;
            store.increment_cluster_count(cluster_id)?;

            let cluster = store.get_cluster(cluster_id)?.ok_or_else(|| {
                DedupError::Storage(format!("cluster {cluster_id} vanished during update"))
            })?;
            let members = store.list_cluster_members(cluster_id)?;
            tracing::info!(cluster_id, count = cluster.count, "question joined cluster");

            Ok(CheckOutcome {
                status: CheckStatus::Matched,
                cluster_id: Some(cluster_id),
                cluster_count: cluster.count,
                similar_questions: members,
                faq_drafted: cluster.faq_drafted,
            })
        }
        Transition::FormCluster {
            matched_id,
            matched_text,
        } => {
            let cluster_id = store.create_cluster(input.topic.as_deref(), 2)?;
            store.update_question_cluster(matched_id, cluster_id)?;
            store.insert_question(NewQuestion::from_input(input, embedding, Some(cluster_id)))?;
            tracing::info!(cluster_id, matched_id, "formed new cluster");

            Ok(CheckOutcome {
                status: CheckStatus::Matched,
                cluster_id: Some(cluster_id),
                cluster_count: 2,
                similar_questions: vec![matched_text, input.text.clone()],
                faq_drafted: false,
            })
        }
    }
}
