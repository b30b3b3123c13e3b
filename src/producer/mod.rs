//! Result producer
//!
//! On each external trigger the producer captures text, asks an analyzer for a
//! result and publishes it to the hub. Capture and analysis are pluggable
//! (`TextSource`, `Analyzer`); the shipped implementations shell out to
//! configured commands.
//!
//! Runs never execute on a delivery task: `TriggerRunner` moves them to the
//! blocking pool, so a slow OCR or model call cannot stall connected viewers.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod trigger;

pub use config::ProducerConfig;
pub use error::ProduceError;
pub use pipeline::{Pipeline, NO_ANALYSIS_MESSAGE, NO_TEXT_MESSAGE};
pub use source::{
    AnalysisRequest, Analyzer, CommandAnalyzer, CommandSource, PassThrough, TextSource,
};
pub use trigger::{ParseTriggerError, Trigger, TriggerRunner};
