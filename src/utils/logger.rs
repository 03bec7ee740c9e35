//! Logging utilities using the tracing framework
//!
//! Components receive a [`Logger`] instead of reaching for a process-wide
//! logger. Each logger owns a `component` span, so every event it emits is
//! tagged with the component that produced it.

use std::fmt::Display;
use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Handle passed to each component for structured logging
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
}

impl Logger {
    /// Create a root logger for a component
    pub fn new(component: &'static str) -> Self {
        Self {
            span: tracing::info_span!("component", name = component),
        }
    }

    /// Create a logger nested under this one
    pub fn child(&self, component: &'static str) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "component", name = component),
        }
    }

    /// Log an informational message
    pub fn info<T: Display>(&self, msg: T) {
        self.span.in_scope(|| tracing::info!("{}", msg));
    }

    /// Log a warning message
    pub fn warn<T: Display>(&self, msg: T) {
        self.span.in_scope(|| tracing::warn!("{}", msg));
    }

    /// Log an error message
    pub fn error<T: Display>(&self, msg: T) {
        self.span.in_scope(|| tracing::error!("{}", msg));
    }

    pub fn debug<T: Display>(&self, msg: T) {
        self.span.in_scope(|| tracing::debug!("{}", msg));
    }

    /// Log a message together with captured tool output (debug level)
    pub fn output<T: Display>(&self, msg: T, output: &str) {
        if output.is_empty() {
            return;
        }
        self.span
            .in_scope(|| tracing::debug!(output = %output, "{}", msg));
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity count.
///
/// 0: info, 1 (-v): debug, 2+ (-vv): trace
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_functions() {
        // These should not panic
        let log = Logger::new("test");
        log.info("Test info message");
        log.warn("Test warning message");
        log.error("Test error message");
        log.child("nested").output("Test output", "line");
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(0);
        init_tracing(2);
    }
}
