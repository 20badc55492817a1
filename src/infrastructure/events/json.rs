//! NDJSON Command Sink
//!
//! Writes every outbound host command as one JSON line, for a bridge process
//! (or a test) to pick up.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{IssuedCommand, TabCommand, TabHost};
use crate::domain::value_objects::CommandId;

/// Command sink that outputs NDJSON commands
pub struct NdjsonCommandSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl NdjsonCommandSink {
    /// Create a sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a sink writing to stderr, leaving stdout for the rendered view
    pub fn stderr() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Create a sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_line(&self, issued: &IssuedCommand) {
        let line = match serde_json::to_string(issued) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(id = %issued.id, error = %e, "could not encode command");
                return;
            }
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl TabHost for NdjsonCommandSink {
    fn dispatch(&self, id: CommandId, command: TabCommand) {
        self.write_line(&IssuedCommand { id, command });
    }
}
