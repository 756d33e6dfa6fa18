//! Terminal conversation with persistent sessions.
//!
//! Runs the same turn engine as the HTTP API, so a session started here can
//! be resumed over HTTP with the same session id and vice versa.

use std::io::Write;
use std::path::PathBuf;

use francie_conversation::TurnOrchestrator;
use tracing::info;
use uuid::Uuid;

use super::init_common_components;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub config_path: Option<PathBuf>,
    /// Optional session ID to resume (creates new if not provided)
    pub session_id: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components(input.config_path).await?;

        let session_id = input
            .session_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        info!("Starting conversation session: {}", session_id);

        if let Some(msg) = input.message {
            let reply = common.orchestrator.take_turn(&session_id, &msg).await?;
            println!("{}", reply.reply);
            info!("Turn {} completed (done: {})", reply.turn, reply.done);
        } else {
            run_interactive(&common.orchestrator, &session_id).await?;
        }

        Ok(())
    }
}

async fn run_interactive(orchestrator: &TurnOrchestrator, session_id: &str) -> anyhow::Result<()> {
    println!("=== Session: {session_id} ===");
    println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match orchestrator.take_turn(session_id, input).await {
            Ok(reply) => {
                println!("\n{}\n", reply.reply);
                if reply.done {
                    println!("Conversation finished after {} turns.", reply.turn);
                    break;
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}
