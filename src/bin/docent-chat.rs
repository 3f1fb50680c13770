//! Interactive chat application for the documentation assistant.
//!
//! This binary provides a streaming REPL interface against a docs-chat
//! backend server.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against the default backend
//! docent-chat
//!
//! # Point at a different backend
//! docent-chat --base-url http://localhost:9000
//!
//! # Use the accurate model and scope to topics
//! docent-chat --model accurate --topics api-design,testing
//!
//! # Disable colors (useful for piping output)
//! docent-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear the conversation here and on the server
//! - `/model <fast|accurate>` - Change the model
//! - `/topics <ids|list|clear>` - Change the topic selection
//! - `/ask <question>` - One-shot retrieval question with source chunks
//! - `/panel [close]` - Reopen or close the side panel
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use docent::session::{
    ChatCommand, PlainTextRenderer, Renderer, SessionArgs, SessionConfig, SessionController,
    help_text, parse_command,
};
use docent::{DocsBackend, Message, MessageRole, PANEL_PLACEHOLDER, TopicCatalog};

/// Main entry point for the docent-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = SessionArgs::from_command_line_relaxed("docent-chat [OPTIONS]");
    let config = SessionConfig::from(args);
    let use_color = config.use_color;

    let backend = DocsBackend::with_options(Some(config.base_url.clone()), None)?;
    let mut session = SessionController::new(config, TopicCatalog::builtin());
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut renderer = PlainTextRenderer::with_color(use_color).with_interrupt(interrupted.clone());

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!(
        "Documentation Chat (model: {}, backend: {})",
        session.model(),
        backend.base_url()
    );
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear_session(&backend).await;
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Model(model_name) => {
                            let model = model_name.parse().unwrap_or_default();
                            session.set_model(model);
                            renderer.print_info(&format!("Model changed to: {}", model));
                        }
                        ChatCommand::Topics(topics) => {
                            if topics.is_empty() {
                                session.set_selected_topics(Vec::new());
                                renderer.print_info("Topic selection cleared.");
                            } else {
                                renderer.print_info(&format!(
                                    "Topics set to: {}",
                                    topics.join(", ")
                                ));
                                session.set_selected_topics(topics);
                            }
                        }
                        ChatCommand::ListTopics => {
                            print_topics(&session);
                        }
                        ChatCommand::Ask(question) => {
                            session.ask(&question, &backend).await;
                            print_outcome(&session, &mut renderer, true);
                        }
                        ChatCommand::Panel => {
                            session.open_side_panel();
                            if session.side_panel().is_open {
                                renderer.print_panel(&session.side_panel().content);
                            } else {
                                renderer.print_info("Side panel is empty.");
                            }
                        }
                        ChatCommand::ClosePanel => {
                            session.close_side_panel();
                            renderer.print_info("Side panel closed.");
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the backend
                println!("Assistant:");
                if session.stats().streaming {
                    session.send_streamed(line, &backend, &mut renderer).await;
                    if session.side_panel().is_open {
                        renderer.print_panel(&session.side_panel().content);
                    }
                } else {
                    session.send_buffered(line, &backend).await;
                    print_outcome(&session, &mut renderer, false);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Renders the outcome of a buffered exchange: the assistant reply or the
/// captured error. Fenced replies show the placeholder in the transcript
/// and the full content in the side panel.
fn print_outcome(session: &SessionController, renderer: &mut PlainTextRenderer, with_sources: bool) {
    if let Some(err) = session.error() {
        renderer.print_error(&err.to_string());
        return;
    }
    let Some(message) = last_assistant(session) else {
        return;
    };
    if session.side_panel().is_open {
        renderer.print_text(PANEL_PLACEHOLDER);
        renderer.finish_response();
        renderer.print_panel(&session.side_panel().content);
    } else {
        renderer.print_text(&message.content);
        renderer.finish_response();
    }
    if with_sources && !message.relevant_chunks.is_empty() {
        println!("    Sources:");
        for chunk in &message.relevant_chunks {
            let preview: String = chunk.text.chars().take(80).collect();
            println!("      [{:.3}] {}", chunk.score, preview);
        }
    }
}

fn last_assistant(session: &SessionController) -> Option<&Message> {
    session
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
}

fn print_topics(session: &SessionController) {
    println!("    Available topics:");
    for topic in session.catalog().iter() {
        let marker = if session.selected_topics().contains(&topic.id) {
            "*"
        } else {
            " "
        };
        println!("     {} {} - {}", marker, topic.id, topic.label);
    }
    if session.selected_topics().is_empty() {
        println!("    (no topics selected; answers are unscoped)");
    }
}

fn print_stats(session: &SessionController) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    if stats.selected_topics.is_empty() {
        println!("      Topics: (none)");
    } else {
        println!("      Topics: {}", stats.selected_topics.join(", "));
    }
    println!(
        "      Responses: {}",
        if stats.streaming {
            "streamed"
        } else {
            "buffered"
        }
    );
    println!(
        "      Side panel: {}",
        if stats.panel_open { "open" } else { "closed" }
    );
}
