// Wed Jan 15 2026 - Alex

pub mod cli;
pub mod display;
pub mod progress;

pub use cli::{Args, Command, CommandHandler};
pub use display::DisplayRenderer;
pub use progress::ProgressReporter;
