use crossbeam_channel::Sender;

pub const TRACE_TARGET: &str = "orca";
pub const ERROR_TARGET: &str = "orca_errors";

/// The adapter's two log channels: operational trace and errors.
///
/// Every message goes to the `log` facade under its channel's target. When a
/// sink is attached the message is also sent down it, so a caller (or a test)
/// can collect the adapter's messages without a global logger.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    trace_sink: Option<Sender<String>>,
    error_sink: Option<Sender<String>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_sink(mut self, tx: Sender<String>) -> Self {
        self.trace_sink = Some(tx);
        self
    }

    pub fn with_error_sink(mut self, tx: Sender<String>) -> Self {
        self.error_sink = Some(tx);
        self
    }

    pub fn trace(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!(target: TRACE_TARGET, "{}", message);
        if let Some(tx) = &self.trace_sink {
            // A dropped receiver just means nobody is listening.
            let _ = tx.send(message);
        }
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::error!(target: ERROR_TARGET, "{}", message);
        if let Some(tx) = &self.error_sink {
            let _ = tx.send(message);
        }
    }
}
