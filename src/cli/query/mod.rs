//! Query command - answers a question against PostgreSQL or candidate rows from a JSON file

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde_json::json;
use uuid::Uuid;

use super::{print_json, Session};
use crate::infrastructure::answer::InMemoryAnswerRepository;
use crate::infrastructure::services::QueryRequest;

/// Arguments for the query command
#[derive(Args, Clone)]
pub struct QueryArgs {
    /// JSON array of candidate chunk rows, used when no database url is configured
    #[arg(long)]
    pub candidates: Option<PathBuf>,

    /// Question to answer
    #[arg(long)]
    pub question: String,

    /// Restrict retrieval to these source ids
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<Uuid>,

    /// Group citations by source
    #[arg(long)]
    pub grouped: bool,

    /// Attach evidence highlight spans
    #[arg(long)]
    pub highlights: bool,

    /// Skip claim verification
    #[arg(long, conflicts_with = "highlights")]
    pub plain: bool,
}

/// Run the query command
pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let session = Session::start()?;

    let store = crate::create_chunk_store(&session.config.database, args.candidates.as_deref())?;
    let answers = Arc::new(InMemoryAnswerRepository::new());
    let state = crate::create_app_state(&session.config, store, answers)?;

    let request = QueryRequest::new(args.question)
        .with_sources(args.sources)
        .grouped(args.grouped);

    let output = if args.plain {
        let outcome = state.queries.answer_question(&request).await?;
        json!({"answer_id": outcome.answer_id, "query_id": outcome.query_id, "response": outcome.response})
    } else if args.highlights {
        let outcome = state.queries.query_verified_highlights(&request).await?;
        json!({"answer_id": outcome.answer_id, "query_id": outcome.query_id, "response": outcome.response})
    } else {
        let outcome = state.queries.query_verified(&request).await?;
        json!({"answer_id": outcome.answer_id, "query_id": outcome.query_id, "response": outcome.response})
    };
    print_json(&output)?;

    session.finish()
}
