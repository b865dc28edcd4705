//! Colored, width-aware log output.
//!
//! Log lines go to stderr so the listing commands can print plain rows on
//! stdout and still be piped into other tools.
//!
//! # Example
//!
//! ```ignore
//! log!("search"; "wrote {} entries", count);
//! log!("warn"; "{}: no date", path.display());
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{IsTerminal, Write, stderr},
    sync::OnceLock,
};

/// Columns assumed when stderr is not a terminal
const FALLBACK_WIDTH: usize = 120;

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<usize> = OnceLock::new();

fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| {
        size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(FALLBACK_WIDTH)
    })
}

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Write one log line: `[module] message`.
///
/// On a terminal the message is cut to the remaining width so each entry
/// stays on a single line.
pub fn log(module: &str, message: &str) {
    let is_tty = stderr().is_terminal();
    let mut err = stderr().lock();

    let message = if is_tty {
        execute!(err, Clear(ClearType::UntilNewLine)).ok();
        // "[" + module + "] "
        let room = terminal_width().saturating_sub(module.chars().count() + 3);
        fit_width(message, room)
    } else {
        message
    };

    writeln!(err, "{} {}", prefix(module), message).ok();
    err.flush().ok();
}

fn prefix(module: &str) -> ColoredString {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "error" => tag.bright_red().bold(),
        "warn" => tag.bright_magenta().bold(),
        "search" => tag.bright_blue().bold(),
        "scan" | "post" => tag.bright_green().bold(),
        "list" | "config" => tag.bright_cyan().bold(),
        _ => tag.bright_yellow().bold(),
    }
}

/// Longest prefix of `s` that is at most `max_chars` characters.
fn fit_width(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
