//! Ask command - answers one question on stdout

use std::io::Write;

use clap::Args;
use futures::StreamExt;

use crate::domain::generation::{ActionKind, AnswerSource, GenerationRequest};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question or text to work on
    pub query: String,

    /// Action to run: search, find_example, find_related, report,
    /// check_spelling or check_conflicts
    #[arg(long, default_value = "search")]
    pub action: ActionKind,

    /// Document text checked by `check_conflicts` instead of the query
    #[arg(long)]
    pub document_text: Option<String>,

    /// Number of documents returned by search actions
    #[arg(long)]
    pub limit: Option<usize>,
}

impl AskArgs {
    fn into_request(self) -> GenerationRequest {
        let mut request = GenerationRequest::new(self.query, self.action);
        request.document_text = self.document_text;
        request.limit = self.limit;
        request
    }
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let state = crate::create_app_state_with_config(&config).await?;

    let mut answer = state.pipeline.answer_stream(args.into_request()).await?;

    if answer.source() == AnswerSource::Documents {
        for (i, doc) in answer.documents().iter().enumerate() {
            println!(
                "{}. {} (No. {}, {})",
                i + 1,
                doc.meta_or("title", "Untitled"),
                doc.meta_or("number", "n/n"),
                doc.meta_or("date", "n/a"),
            );
            println!("   {}", preview(&doc.text));
        }
        if answer.documents().is_empty() {
            println!("No documents found.");
        }
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    let mut failed = false;
    while let Some(chunk) = answer.next().await {
        failed |= chunk.is_error();
        write!(stdout, "{}", chunk.text())?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    if failed {
        anyhow::bail!("generation failed");
    }
    Ok(())
}

fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 160;

    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut)
}
