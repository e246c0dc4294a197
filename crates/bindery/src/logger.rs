//! Diagnostic logging capability.
//!
//! The binder never reaches for a global logger. A [`Logger`] is handed to
//! it at construction; [`NoopLogger`] is the default and [`TracingLogger`]
//! forwards to `tracing`. Loggers only observe, so swapping one for
//! another never changes a binding result.

use std::fmt;

/// Leveled diagnostic sink shared across concurrent binders.
pub trait Logger: Send + Sync {
    fn debug(&self, args: fmt::Arguments<'_>);
    fn info(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _args: fmt::Arguments<'_>) {}
    fn info(&self, _args: fmt::Arguments<'_>) {}
    fn error(&self, _args: fmt::Arguments<'_>) {}
}

/// Emits `tracing` events under the `bindery` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "bindery", "{args}");
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "bindery", "{args}");
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "bindery", "{args}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn loggers_are_object_safe_and_shareable() {
        let loggers: Vec<Arc<dyn Logger>> = vec![Arc::new(NoopLogger), Arc::new(TracingLogger)];
        for logger in &loggers {
            logger.debug(format_args!("debug {}", 1));
            logger.info(format_args!("info {}", 2));
            logger.error(format_args!("error {}", 3));
        }
    }
}
