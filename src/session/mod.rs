//! Session control for interactive documentation chat.
//!
//! This module provides the state machine behind a chat front end. It
//! supports:
//!
//! - An ordered message log with submit/receive/clear lifecycle
//! - Streamed responses with real-time fragment display
//! - Side-panel promotion of fenced code answers
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`controller`]: Core session state management and orchestration
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod controller;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{SessionArgs, SessionConfig};
pub use controller::{
    PendingRequest, SessionController, SessionPhase, SessionStats, SidePanel,
};
