//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating the engine with infrastructure dependencies
//! - Rendering the projected view as text
//!
//! ## Structure
//!
//! - `cli` - Argument definitions
//! - `factory` - Wires the engine to concrete ports
//! - `render` - Tree view rendering
//! - `terminal` - Terminal capability detection

pub mod cli;
pub mod factory;
pub mod render;
pub mod terminal;

pub use cli::{Cli, Commands};
pub use render::{render_view, RenderStyle};
pub use terminal::{detect_capabilities, TerminalCapabilities};
