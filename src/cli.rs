use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use faq_dedup::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, DEFAULT_THRESHOLD};

#[derive(Parser, Debug)]
#[command(
    name = "faq-dedup",
    version,
    about = "Group paraphrased questions into clusters by embedding similarity"
)]
pub struct Cli {
    /// JSON file holding stored questions and clusters.
    #[arg(long, env = "FAQ_DB_PATH", default_value = "./data/questions.json", global = true)]
    pub db_path: PathBuf,

    #[arg(long, value_enum, env = "FAQ_EMBEDDER", default_value_t = EmbedderKind::Hash, global = true)]
    pub embedder: EmbedderKind,

    /// JSON object mapping question text to its vector (fixture embedder).
    #[arg(long, env = "FAQ_FIXTURES", global = true)]
    pub fixtures: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL, global = true)]
    pub openai_base_url: String,

    #[arg(long, default_value = DEFAULT_OPENAI_MODEL, global = true)]
    pub embedding_model: String,

    #[arg(long, default_value = "10s", global = true)]
    pub embed_timeout: humantime::Duration,

    #[arg(long, default_value_t = 256, global = true)]
    pub hash_dim: usize,

    #[arg(long, env = "FAQ_THRESHOLD", default_value_t = DEFAULT_THRESHOLD, global = true)]
    pub threshold: f32,

    #[arg(long, default_value = "text", global = true)]
    pub output: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    Hash,
    Fixture,
    Openai,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Match a question against stored ones and record it.
    Check {
        #[arg(long)]
        text: String,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Flag a cluster as having a published FAQ answer.
    MarkDrafted { cluster_id: u64 },
    /// Show similarity of a text against every stored question.
    Debug {
        #[arg(long)]
        text: String,
    },
    /// List clusters with their questions, largest first.
    Clusters,
    /// Delete all questions and clusters.
    Reset,
}

impl Command {
    pub fn needs_embedder(&self) -> bool {
        matches!(self, Command::Check { .. } | Command::Debug { .. })
    }
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.output.as_str(), "text" | "json") {
            return Err(format!("Unknown output format: {}", self.output));
        }

        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err("threshold must be within [-1, 1]".to_string());
        }

        if self.embed_timeout.as_ref().is_zero() {
            return Err("embed-timeout must be > 0".to_string());
        }

        if !self.command.needs_embedder() {
            return Ok(());
        }

        match self.embedder {
            EmbedderKind::Fixture if self.fixtures.is_none() => {
                return Err("--fixtures is required with --embedder fixture".to_string());
            }
            EmbedderKind::Openai if self.openai_api_key.is_none() => {
                return Err("OPENAI_API_KEY (or --openai-api-key) is required with --embedder openai".to_string());
            }
            _ => {}
        }

        Ok(())
    }
}
