//! Helpers shared by the console and file layers.
use std::path::PathBuf;

/// `HH:MM:SS`, prefixed to every log file line.
pub(super) const TIME: &str = "%H:%M:%S";
/// Full timestamp written in the log file header.
pub(super) const DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in `format`.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

/// Remove ANSI escape sequences so the log file stays plain text.
///
/// CSI sequences (`ESC [` ... final byte in `@`..=`~`) are dropped whole;
/// any other escape drops the single character after `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some((text, escape)) = rest.split_once('\x1b') {
        out.push_str(text);
        rest = escape
            .strip_prefix('[')
            .map_or_else(|| skip_char(escape), after_final_byte);
    }
    out.push_str(rest);
    out
}

fn after_final_byte(csi: &str) -> &str {
    csi.find(|c: char| ('@'..='~').contains(&c))
        .and_then(|end| csi.get(end + 1..))
        .unwrap_or("")
}

fn skip_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

/// Log file for `command`: `$XDG_CACHE_HOME/provision/<command>.log`, or
/// under `~/.cache` when the variable is unset. Creates the directory.
///
/// Returns `None` when neither location is known or it cannot be created.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let dir = cache.join("provision");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}
