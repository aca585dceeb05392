//! Scoped phase grouping.
use std::time::Instant;

use super::types::Log;

/// Guard that groups everything logged while it is alive under one heading.
///
/// Creating a `Head` prints the stage line and enters a `head` tracing span;
/// dropping it (normally or during unwinding after an error) logs the elapsed
/// time and exits the span.
pub struct Head<'a> {
    log: &'a dyn Log,
    title: String,
    start: Instant,
    _span: tracing::span::EnteredSpan,
}

impl<'a> Head<'a> {
    /// Print `title` as a stage header and open the scope.
    #[must_use = "the heading closes as soon as the guard is dropped"]
    pub fn enter(log: &'a dyn Log, title: &str) -> Self {
        log.stage(title);
        // the file layer keys on this span name; see `subscriber::HEAD_SPAN`
        let span = tracing::info_span!("head", title = %title).entered();
        Self {
            log,
            title: title.to_string(),
            start: Instant::now(),
            _span: span,
        }
    }
}

impl Drop for Head<'_> {
    fn drop(&mut self) {
        self.log.debug(&format!(
            "{} finished in {:.2?}",
            self.title,
            self.start.elapsed()
        ));
    }
}

impl std::fmt::Debug for Head<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Head")
            .field("title", &self.title)
            .field("start", &self.start)
            .finish_non_exhaustive()
    }
}
