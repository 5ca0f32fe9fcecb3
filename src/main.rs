//! Study Coach - Interactive CLI Entry Point
//!
//! Starts the agent and runs a read-eval-print loop on stdin.

use std::io::Write;

use study_coach::{agent::Agent, config::Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BANNER: &str = "\
============================================
Study Coach - MCP + RAG Agent
============================================

Ask anything - e.g. \"What is 123 * 45?\",
\"Weather in Tokyo?\", or \"What is RAG?\"

Type 'exit' or 'quit' to stop.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_coach=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (.env first, then the environment)
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model);

    // Connect MCP servers and build the knowledge base. Failures here are
    // fatal; the shell never starts with a partial tool set.
    let agent = Agent::build(config).await?;

    println!("{}", BANNER);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nYou (or 'exit'): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            // EOF (Ctrl-D)
            println!("\nBye.");
            break;
        };
        let input = line.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Bye.");
            break;
        }

        if input.is_empty() {
            continue;
        }

        // One blocking agent turn per input; an error ends the turn, not
        // the shell.
        match agent.run(input).await {
            Ok(answer) => {
                println!("\nAgent:\n");
                println!("{}", answer);
            }
            Err(e) => {
                eprintln!("\n[ERROR] {:#}", e);
            }
        }
    }

    Ok(())
}
