use faq_dedup::{
    ClusterEngine, DedupError, EmbeddingProvider, EngineConfig, FixtureEmbeddingProvider,
    HashEmbeddingProvider, JsonFileStore, OpenAiEmbeddingProvider, QuestionInput, Result,
};

use crate::cli::{Cli, Command, EmbedderKind};
use crate::output::Report;

fn make_embedder(cli: &Cli) -> Result<Box<dyn EmbeddingProvider>> {
    let provider: Box<dyn EmbeddingProvider> = match cli.embedder {
        EmbedderKind::Hash => Box::new(HashEmbeddingProvider::new(cli.hash_dim)),
        EmbedderKind::Fixture => {
            let path = cli
                .fixtures
                .as_deref()
                .ok_or_else(|| DedupError::InvalidArg("--fixtures is required".to_string()))?;
            Box::new(FixtureEmbeddingProvider::load(path)?)
        }
        EmbedderKind::Openai => {
            let key = cli.openai_api_key.clone().ok_or_else(|| {
                DedupError::InvalidArg("OPENAI_API_KEY is required".to_string())
            })?;
            Box::new(OpenAiEmbeddingProvider::new(
                key,
                cli.openai_base_url.clone(),
                cli.embedding_model.clone(),
                cli.embed_timeout.into(),
            )?)
        }
    };
    tracing::debug!(embedder = ?cli.embedder, "embedding provider ready");
    Ok(provider)
}

pub fn run_command(cli: &Cli) -> Result<Report> {
    cli.validate().map_err(DedupError::InvalidArg)?;

    // `reset`, `clusters` and `mark-drafted` never embed; they run without
    // provider credentials.
    let embedder: Box<dyn EmbeddingProvider> = if cli.command.needs_embedder() {
        make_embedder(cli)?
    } else {
        Box::new(HashEmbeddingProvider::default())
    };
    let store = JsonFileStore::open(&cli.db_path)?;
    let config = EngineConfig {
        threshold: cli.threshold,
    };
    let mut engine = ClusterEngine::with_config(embedder, store, config);

    let report = match &cli.command {
        Command::Check {
            text,
            topic,
            channel,
            user,
        } => {
            let input = QuestionInput {
                text: text.clone(),
                topic: topic.clone(),
                source_channel: channel.clone(),
                source_user: user.clone(),
            };
            Report::Check(engine.check_question(&input)?)
        }
        Command::MarkDrafted { cluster_id } => {
            engine.mark_drafted(*cluster_id)?;
            Report::Drafted {
                cluster_id: *cluster_id,
            }
        }
        Command::Debug { text } => Report::Similarities(engine.debug_similarities(text)?),
        Command::Clusters => Report::Clusters(engine.list_clusters()?),
        Command::Reset => {
            engine.reset()?;
            Report::Reset
        }
    };
    Ok(report)
}
