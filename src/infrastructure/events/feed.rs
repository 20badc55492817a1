//! NDJSON session feed reader
//!
//! One JSON object per line. The discriminating key decides the kind:
//! `event` for host events, `result` for command results, `action` for
//! scripted user actions. Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;

use serde_json::Value;

use crate::application::{FeedItem, ReplayAction, TabEvent};
use crate::domain::ports::CommandResult;
use crate::error::{TabTreeError, TabTreeResult};

/// Parse a single feed line. `line` is only used for error messages.
pub fn parse_line(line: usize, text: &str) -> TabTreeResult<FeedItem> {
    let invalid = |message: String| TabTreeError::InvalidFeedLine { line, message };

    let value: Value = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
    let Some(object) = value.as_object() else {
        return Err(invalid("expected a JSON object".to_string()));
    };

    if object.contains_key("event") {
        serde_json::from_value::<TabEvent>(value)
            .map(FeedItem::Event)
            .map_err(|e| invalid(e.to_string()))
    } else if object.contains_key("result") {
        serde_json::from_value::<CommandResult>(value)
            .map(FeedItem::Result)
            .map_err(|e| invalid(e.to_string()))
    } else if object.contains_key("action") {
        serde_json::from_value::<ReplayAction>(value)
            .map(FeedItem::Action)
            .map_err(|e| invalid(e.to_string()))
    } else {
        Err(invalid(
            "missing one of `event`, `result` or `action`".to_string(),
        ))
    }
}

/// Iterator over the items of an NDJSON feed, with 1-based line numbers.
pub struct NdjsonFeed<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> NdjsonFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for NdjsonFeed<R> {
    type Item = TabTreeResult<(usize, FeedItem)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return Some(parse_line(self.line, text).map(|item| (self.line, item)));
        }
    }
}
