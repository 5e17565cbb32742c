//! Command delivery boundary.

use crate::command::Command;
use std::sync::Mutex;
use tracing::info;

/// Outbound side of the engine.
///
/// The transport implements this; the engine calls it inline while handling
/// an event and never waits for delivery. Implementations must not block.
pub trait CommandSink: Send + Sync {
    /// Hands a command to the transport.
    fn submit(&self, command: Command);
}

/// Sink that records every command, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Mutex<Vec<Command>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything submitted so far.
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().expect("sink poisoned").clone()
    }

    /// Drains and returns everything submitted so far.
    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *self.commands.lock().expect("sink poisoned"))
    }

    /// Number of install commands submitted so far.
    pub fn install_count(&self) -> usize {
        self.commands
            .lock()
            .expect("sink poisoned")
            .iter()
            .filter(|c| c.is_install())
            .count()
    }
}

impl CommandSink for RecordingSink {
    fn submit(&self, command: Command) {
        self.commands.lock().expect("sink poisoned").push(command);
    }
}

/// Sink that logs commands instead of delivering them.
///
/// The shipped binary runs with this until a transport is wired in.
#[derive(Debug, Default)]
pub struct TracingSink;

impl CommandSink for TracingSink {
    fn submit(&self, command: Command) {
        match &command {
            Command::InstallRule {
                switch, priority, ..
            } => {
                info!(switch = %switch, priority, "install rule");
            }
            Command::PacketOut { switch, flood, .. } => {
                info!(switch = %switch, flood, "packet out");
            }
        }
    }
}
