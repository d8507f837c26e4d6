pub mod embed;
pub mod engine;
pub mod error;
pub mod matching;
pub mod model;
pub mod similarity;
pub mod storage;

pub use embed::{
    DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, EmbeddingProvider, FixtureEmbeddingProvider,
    HashEmbeddingProvider, OpenAiEmbeddingProvider,
};
pub use engine::{ClusterEngine, EngineConfig, Transition};
pub use error::{DedupError, Result};
pub use matching::{BestMatch, DEFAULT_THRESHOLD, best_match, rank_similarities};
pub use model::{
    CheckOutcome, CheckStatus, Cluster, ClusterId, ClusterMember, ClusterSummary, NewQuestion,
    Question, QuestionId, QuestionInput, SimilarityScore, StoredQuestion,
};
pub use similarity::cosine_similarity;
pub use storage::{JsonFileStore, MemoryStore, QuestionStore, StoreSnapshot};
