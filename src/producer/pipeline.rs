//! Analyze / optimize pipeline
//!
//! Runs on the blocking pool. Every outcome, including failures, ends as a
//! published message so viewers always see what happened.

use std::sync::{Arc, Mutex, PoisonError};

use crate::hub::{BroadcastHub, Message};

use super::error::ProduceError;
use super::source::{AnalysisRequest, Analyzer, TextSource};
use super::trigger::Trigger;

/// Published when the capture contained no text
pub const NO_TEXT_MESSAGE: &str = "No text was recognized in the capture.";

/// Published when optimize is triggered before any analysis
pub const NO_ANALYSIS_MESSAGE: &str = "Run an analysis first.";

/// Computes results and publishes them to the hub
pub struct Pipeline {
    hub: Arc<BroadcastHub>,
    source: Option<Box<dyn TextSource>>,
    analyzer: Box<dyn Analyzer>,
    /// Result of the most recent successful analysis
    last_analysis: Mutex<Option<String>>,
}

impl Pipeline {
    /// Create a pipeline
    ///
    /// Without a source every analyze trigger publishes a diagnostic.
    pub fn new(
        hub: Arc<BroadcastHub>,
        source: Option<Box<dyn TextSource>>,
        analyzer: Box<dyn Analyzer>,
    ) -> Self {
        Self {
            hub,
            source,
            analyzer,
            last_analysis: Mutex::new(None),
        }
    }

    /// The hub results are published to
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Run one trigger and publish its outcome
    pub fn run(&self, trigger: Trigger) -> Message {
        match trigger {
            Trigger::Analyze => self.analyze(),
            Trigger::Optimize => self.optimize(),
        }
    }

    /// Capture, analyze and publish
    pub fn analyze(&self) -> Message {
        let outcome = self.compute_analysis();
        self.publish_outcome(Trigger::Analyze, outcome)
    }

    /// Improve the last analysis and publish
    pub fn optimize(&self) -> Message {
        let outcome = self.compute_optimization();
        self.publish_outcome(Trigger::Optimize, outcome)
    }

    /// Result of the most recent successful analysis
    pub fn last_analysis(&self) -> Option<String> {
        self.last_analysis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn compute_analysis(&self) -> Result<String, ProduceError> {
        let source = self.source.as_ref().ok_or(ProduceError::SourceUnavailable)?;

        let text = source.capture_text()?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(NO_TEXT_MESSAGE.to_string());
        }

        tracing::debug!(chars = text.chars().count(), "Text captured");

        let result = self.analyzer.analyze(&AnalysisRequest::Analyze {
            text: text.to_string(),
        })?;

        *self
            .last_analysis
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(result.clone());

        Ok(result)
    }

    fn compute_optimization(&self) -> Result<String, ProduceError> {
        let Some(previous) = self.last_analysis() else {
            return Ok(NO_ANALYSIS_MESSAGE.to_string());
        };

        self.analyzer
            .analyze(&AnalysisRequest::Optimize { previous })
    }

    fn publish_outcome(&self, trigger: Trigger, outcome: Result<String, ProduceError>) -> Message {
        let message = match outcome {
            Ok(text) => Message::from(text),
            Err(e) => {
                tracing::warn!(trigger = %trigger, error = %e, "Producer failed");
                Message::from(diagnostic(trigger, &e))
            }
        };

        let report = self.hub.publish(message.clone());
        tracing::info!(
            trigger = %trigger,
            len = message.len(),
            subscribers = report.offered(),
            "Result published"
        );

        message
    }
}

/// Text published in place of a result when a trigger fails
pub fn diagnostic(trigger: Trigger, error: &ProduceError) -> String {
    format!("[{}] {}", trigger, error)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::producer::source::PassThrough;

    struct FixedSource(&'static str);

    impl TextSource for FixedSource {
        fn capture_text(&self) -> Result<String, ProduceError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenSource;

    impl TextSource for BrokenSource {
        fn capture_text(&self) -> Result<String, ProduceError> {
            Err(ProduceError::Capture("screen locked".into()))
        }
    }

    /// Analyzer that tags requests so tests can see what was asked
    #[derive(Default)]
    struct TaggingAnalyzer {
        calls: AtomicUsize,
    }

    impl Analyzer for TaggingAnalyzer {
        fn analyze(&self, request: &AnalysisRequest) -> Result<String, ProduceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(match request {
                AnalysisRequest::Analyze { text } => format!("solution for {}", text),
                AnalysisRequest::Optimize { previous } => format!("better than {}", previous),
            })
        }
    }

    fn pipeline(source: Option<Box<dyn TextSource>>) -> Pipeline {
        Pipeline::new(
            Arc::new(BroadcastHub::new()),
            source,
            Box::new(TaggingAnalyzer::default()),
        )
    }

    #[test]
    fn test_analyze_publishes_result() {
        let pipeline = pipeline(Some(Box::new(FixedSource("  two sum \n"))));

        let published = pipeline.run(Trigger::Analyze);
        assert_eq!(published.as_str(), "solution for two sum");
        assert_eq!(pipeline.hub().latest(), published);
        assert_eq!(pipeline.last_analysis().as_deref(), Some("solution for two sum"));
    }

    #[test]
    fn test_empty_capture() {
        let pipeline = pipeline(Some(Box::new(FixedSource(" \n\t"))));

        let published = pipeline.analyze();
        assert_eq!(published.as_str(), NO_TEXT_MESSAGE);
        assert!(pipeline.last_analysis().is_none());
    }

    #[test]
    fn test_optimize_requires_analysis() {
        let pipeline = pipeline(Some(Box::new(FixedSource("lru cache"))));

        assert_eq!(pipeline.optimize().as_str(), NO_ANALYSIS_MESSAGE);

        pipeline.analyze();
        let published = pipeline.optimize();
        assert_eq!(published.as_str(), "better than solution for lru cache");

        // Optimizing does not replace the remembered analysis
        assert_eq!(
            pipeline.last_analysis().as_deref(),
            Some("solution for lru cache")
        );
    }

    #[test]
    fn test_capture_failure_published_as_diagnostic() {
        let pipeline = pipeline(Some(Box::new(BrokenSource)));

        let published = pipeline.analyze();
        assert_eq!(published.as_str(), "[analyze] Capture failed: screen locked");
        assert_eq!(pipeline.hub().latest(), published);
    }

    #[test]
    fn test_missing_source() {
        let pipeline = pipeline(None);

        let published = pipeline.analyze();
        assert!(published.as_str().contains("No capture source configured"));
    }

    #[test]
    fn test_pass_through_analyzer() {
        let pipeline = Pipeline::new(
            Arc::new(BroadcastHub::new()),
            Some(Box::new(FixedSource("raw text"))),
            Box::new(PassThrough),
        );

        assert_eq!(pipeline.analyze().as_str(), "raw text");
        assert_eq!(pipeline.optimize().as_str(), "raw text");
    }
}
