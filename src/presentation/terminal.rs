//! Terminal capability detection for the tree view

use is_terminal::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub supports_unicode: bool,
    /// Column budget per row; `None` means do not truncate
    pub width: Option<usize>,
}

pub fn detect_capabilities() -> TerminalCapabilities {
    detect_capabilities_impl(
        |key| std::env::var(key).ok(),
        std::io::stdout().is_terminal(),
    )
}

fn detect_capabilities_impl(
    get_env: impl Fn(&str) -> Option<String>,
    is_tty: bool,
) -> TerminalCapabilities {
    let term = get_env("TERM").unwrap_or_default();
    let term_is_dumb = term.eq_ignore_ascii_case("dumb");

    let width = if is_tty {
        let columns = get_env("COLUMNS").and_then(|c| c.trim().parse::<usize>().ok());
        Some(columns.filter(|c| *c > 0).unwrap_or(100))
    } else {
        None
    };

    TerminalCapabilities {
        is_tty,
        supports_unicode: !term_is_dumb && unicode_locale(&get_env),
        width,
    }
}

fn unicode_locale(get_env: &impl Fn(&str) -> Option<String>) -> bool {
    for key in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Some(value) = get_env(key) {
            let value = value.to_lowercase();
            if value == "c" || value == "posix" {
                return false;
            }
            if value.contains("utf-8") || value.contains("utf8") {
                return true;
            }
        }
    }
    true
}
