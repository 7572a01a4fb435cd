mod error;
mod progress;

pub use error::print_error;
pub use progress::{Progress, Stage};

use std::io::{self, IsTerminal};
use tracing::Level;

#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub interactive: bool,
}

impl Context {
    pub fn detect() -> Self {
        Self {
            interactive: io::stderr().is_terminal(),
        }
    }
}

/// Sends warnings and errors to stderr, keeping stdout for the
/// confirmation line.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
