//! Interactive chat
//!
//! A line-oriented front end over either core. Each line is answered on its
//! own; the session keeps no conversation history.

mod session;

pub use session::{ChatEngine, ChatSession};

use eyre::Result;
use tracing::debug;

/// Run the interactive chat session
///
/// This is the main entry point for `cr chat`.
pub async fn run_interactive(engine: ChatEngine) -> Result<()> {
    debug!("run_interactive: called");
    ChatSession::new(engine).run().await
}
