//! Hydrate command - rebuilds the response for a stored answer record

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use super::{print_json, Session};
use crate::domain::{AnswerRepository, StoredAnswer};
use crate::infrastructure::answer::InMemoryAnswerRepository;
use crate::infrastructure::services::AnswerService;

/// Arguments for the hydrate command
#[derive(Args, Clone)]
pub struct HydrateArgs {
    /// Stored answer record as JSON
    #[arg(long)]
    pub record: PathBuf,

    /// Include citation groups
    #[arg(long)]
    pub grouped: bool,

    /// Return highlighted claims
    #[arg(long)]
    pub highlights: bool,

    /// Citations only
    #[arg(long, conflicts_with = "highlights")]
    pub plain: bool,
}

/// Run the hydrate command
pub async fn run(args: HydrateArgs) -> anyhow::Result<()> {
    let session = Session::start()?;

    let content = std::fs::read_to_string(&args.record)
        .with_context(|| format!("Failed to read {}", args.record.display()))?;
    let record: StoredAnswer = serde_json::from_str(&content).context("Invalid answer record")?;
    let id = record.id;

    let answers = Arc::new(InMemoryAnswerRepository::new());
    answers.save(record).await?;
    let service = AnswerService::new(answers);

    if args.plain {
        print_json(&service.get_plain_answer(id, args.grouped).await?)?;
    } else if args.highlights {
        print_json(&service.get_answer_highlights(id, args.grouped).await?)?;
    } else {
        print_json(&service.get_answer(id, args.grouped).await?)?;
    }

    session.finish()
}
