//! Text rendering of the projected view
//!
//! One header per window, one row per visible node, indented by depth.

use std::fmt::Write as _;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::services::VisibleNode;
use crate::domain::value_objects::WindowId;
use crate::presentation::terminal::TerminalCapabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub unicode: bool,
    pub width: Option<usize>,
}

impl RenderStyle {
    /// Plain ASCII, no truncation
    pub fn plain() -> Self {
        Self {
            unicode: false,
            width: None,
        }
    }

    pub fn from_capabilities(caps: TerminalCapabilities) -> Self {
        Self {
            unicode: caps.supports_unicode,
            width: caps.width,
        }
    }

    fn marker(&self, row: &VisibleNode) -> &'static str {
        match (row.has_children, row.collapsed, self.unicode) {
            (true, true, true) => "▸",
            (true, false, true) => "▾",
            (false, _, true) => "·",
            (true, true, false) => "+",
            (true, false, false) => "-",
            (false, _, false) => ".",
        }
    }

    fn ellipsis(&self) -> &'static str {
        if self.unicode {
            "…"
        } else {
            "..."
        }
    }
}

pub fn render_view(view: &[VisibleNode], focused: Option<WindowId>, style: RenderStyle) -> String {
    let mut out = String::new();
    if view.is_empty() {
        out.push_str("(no visible tabs)\n");
        return out;
    }

    let mut current: Option<WindowId> = None;
    for row in view {
        if current != Some(row.window_id) {
            current = Some(row.window_id);
            let focus = if focused == Some(row.window_id) {
                " (focused)"
            } else {
                ""
            };
            let _ = writeln!(out, "{}{}", row.window_id, focus);
        }

        let line = format!(
            "  {}{} {}{}",
            "  ".repeat(row.depth as usize),
            style.marker(row),
            label(row),
            tags(row)
        );
        match style.width {
            Some(width) => out.push_str(&truncate(&line, width, style.ellipsis())),
            None => out.push_str(&line),
        }
        out.push('\n');
    }
    out
}

fn label(row: &VisibleNode) -> &str {
    if !row.title.is_empty() {
        &row.title
    } else if !row.url.is_empty() {
        &row.url
    } else {
        "(untitled)"
    }
}

fn tags(row: &VisibleNode) -> String {
    let mut tags = Vec::new();
    if row.active {
        tags.push("active");
    }
    if row.pinned {
        tags.push("pinned");
    }
    if row.tab_id.is_none() {
        tags.push("pending");
    }
    if row.collapsed && row.has_matching_descendant {
        tags.push("match inside");
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", tags.join(", "))
    }
}

/// Cut `line` to at most `width` columns, ending in `ellipsis` when cut.
pub fn truncate(line: &str, width: usize, ellipsis: &str) -> String {
    if line.width() <= width {
        return line.to_string();
    }
    let budget = width.saturating_sub(ellipsis.width());
    let mut used = 0;
    let mut out = String::new();
    for ch in line.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(ellipsis);
    out
}
