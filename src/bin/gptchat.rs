//! Interactive chat application for conversing with OpenAI models.
//!
//! This binary provides a REPL interface that keeps the whole conversation
//! and renders each reply with a typing effect.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings (gpt-4.5-preview)
//! gptchat
//!
//! # Specify a model and sampling parameters
//! gptchat --model gpt-4 --temperature 0.7 --max-tokens 4096 --top-p 0.9
//!
//! # Answer a single prompt and exit
//! gptchat "What is the capital of France?"
//!
//! # Disable the typing effect and colors (useful for piping output)
//! gptchat --char-delay-ms 0 --no-color
//! ```
//!
//! The API key is read from `OPENAI_API_KEY`.  Type `exit()` to leave.

use std::process::ExitCode;
use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use gptchat::chat::{ChatArgs, ChatConfig, ChatSession, Flow, PlainTextRenderer, Renderer};
use gptchat::{OpenAI, StderrLogger};

/// Main entry point for the gptchat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (args, free) = ChatArgs::from_command_line_relaxed("gptchat [OPTIONS] [PROMPT...]");
    let config = ChatConfig::try_from(args)?;

    let mut client = OpenAI::with_options(None, config.base_url.clone(), config.timeout)?;
    if config.verbose {
        client = client.with_logger(Arc::new(StderrLogger::new()));
    }

    let mut renderer =
        PlainTextRenderer::with_color(config.use_color).with_char_delay(config.char_delay);
    let mut session = ChatSession::new(client, config);
    session.greet(&mut renderer);

    if !free.is_empty() {
        let prompt = free.join(" ");
        return Ok(match session.run_once(&prompt, &mut renderer).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        });
    }

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.trim());
                }
                if session.handle_line(&line, &mut renderer).await == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt discards the line.
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                renderer.print_info("Goodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
