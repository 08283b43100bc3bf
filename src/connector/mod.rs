//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion clients (Gemini over HTTP, scripted for offline use)
//! - Credential sources (environment, TOML secrets file)
//! - Terminal front-ends (ratatui, plain line mode)

pub mod adapter;
pub mod container;
pub mod tui;

pub use adapter::*;
pub use container::{Container, ContainerConfig};
pub use tui::*;
