//! Interactive and one-shot question answering

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::domain::{Answer, AnswerOrigin, RetrievalOrchestrator};

const PROMPT: &str = "\nEnter your travel question or 'exit': ";

/// Runs the interactive loop on stdin/stdout
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let orchestrator = crate::create_orchestrator(&config).await?;
    info!("Hybrid travel assistant ready");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    chat_loop(&orchestrator, stdin, &mut stdout).await?;

    let stats = orchestrator.cache().stats();
    info!(
        lookups = stats.lookups,
        hits = stats.hits,
        hit_rate = stats.hit_rate(),
        "Chat session finished"
    );

    Ok(())
}

/// Answers one query and prints it
pub async fn ask(config: AppConfig, query: &str) -> anyhow::Result<()> {
    let orchestrator = crate::create_orchestrator(&config).await?;
    let answer = orchestrator.answer(query).await?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(render_answer(&answer).as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}

/// Reads questions line by line until EOF, a blank line, `exit` or `quit`.
/// A failed question is reported and the loop continues.
pub async fn chat_loop<R, W>(
    orchestrator: &RetrievalOrchestrator,
    reader: R,
    writer: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        if is_exit(query) {
            break;
        }

        match orchestrator.answer(query).await {
            Ok(answer) => writer.write_all(render_answer(&answer).as_bytes()).await?,
            Err(e) => {
                error!(error = %e, "Failed to answer question");
                writer
                    .write_all(format!("\nSorry, that question could not be answered: {}\n", e).as_bytes())
                    .await?;
            }
        }
    }

    writer.flush().await
}

fn is_exit(query: &str) -> bool {
    query.is_empty() || query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit")
}

fn render_answer(answer: &Answer) -> String {
    let source = match answer.origin {
        AnswerOrigin::Cache { similarity } => {
            format!("(served from cache, similarity {:.2})\n", similarity)
        }
        AnswerOrigin::CachedContext { similarity } => {
            format!("(generated from cached context, similarity {:.2})\n", similarity)
        }
        AnswerOrigin::Generated => String::new(),
    };

    format!(
        "\n=== Assistant Answer ===\n{}\n{}\n\n=== End ===\n",
        source, answer.text
    )
}
