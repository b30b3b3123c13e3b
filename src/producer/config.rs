//! Producer configuration

/// Producer configuration options
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Maximum triggers processed at the same time
    pub workers: usize,

    /// Shell command that prints the recognized screen text
    pub capture_command: Option<String>,

    /// Shell command that reads a prompt on stdin and prints the result
    pub analyze_command: Option<String>,

    /// Buffered triggers before new ones wait
    pub trigger_buffer: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            capture_command: None,
            analyze_command: None,
            trigger_buffer: 16,
        }
    }
}

impl ProducerConfig {
    /// Set worker count
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the capture command
    pub fn capture_command(mut self, command: impl Into<String>) -> Self {
        self.capture_command = Some(command.into());
        self
    }

    /// Set how many triggers may wait while every worker is busy (minimum 1)
    pub fn trigger_buffer(mut self, buffer: usize) -> Self {
        self.trigger_buffer = buffer.max(1);
        self
    }

    /// Set the analyzer command
    pub fn analyze_command(mut self, command: impl Into<String>) -> Self {
        self.analyze_command = Some(command.into());
        self
    }
}
