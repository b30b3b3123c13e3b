//! Trigger handling
//!
//! External events (hotkeys, stdin commands) arrive as `Trigger`s over a
//! channel. Each one runs on the blocking pool under a `JoinSet`, at most
//! `workers` at a time. A panic inside a run is caught and published as a
//! diagnostic instead of being lost with its thread.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

use crate::hub::Message;

use super::config::ProducerConfig;
use super::error::ProduceError;
use super::pipeline::{diagnostic, Pipeline};

/// External event asking the producer for a new result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Capture the screen and analyze it
    Analyze,
    /// Improve the previous analysis
    Optimize,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Analyze => write!(f, "analyze"),
            Trigger::Optimize => write!(f, "optimize"),
        }
    }
}

/// Unrecognized trigger name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTriggerError(pub String);

impl fmt::Display for ParseTriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown trigger '{}': expected 'a'/'analyze' or 'b'/'optimize'",
            self.0
        )
    }
}

impl std::error::Error for ParseTriggerError {}

impl FromStr for Trigger {
    type Err = ParseTriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "analyze" => Ok(Trigger::Analyze),
            "b" | "optimize" => Ok(Trigger::Optimize),
            other => Err(ParseTriggerError(other.to_string())),
        }
    }
}

type TaskOutput = (Trigger, Result<Message, ProduceError>);

/// Supervises producer runs
pub struct TriggerRunner {
    pipeline: Arc<Pipeline>,
    workers: Arc<Semaphore>,
}

impl TriggerRunner {
    /// Create a runner
    pub fn new(pipeline: Arc<Pipeline>, config: &ProducerConfig) -> Self {
        Self {
            pipeline,
            workers: Arc::new(Semaphore::new(config.workers.max(1))),
        }
    }

    /// Run until the trigger channel closes
    pub async fn run(self, triggers: mpsc::Receiver<Trigger>) {
        self.run_until(triggers, std::future::pending()).await
    }

    /// Run until the trigger channel closes or `shutdown` resolves
    ///
    /// A trigger is taken off the channel only once a worker is free, so a
    /// full channel pushes back on whoever sends triggers. When the channel
    /// closes, in-flight runs finish first. On shutdown they are abandoned.
    pub async fn run_until<F>(self, mut triggers: mpsc::Receiver<Trigger>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();

        loop {
            let permit = tokio::select! {
                _ = &mut shutdown => return Self::stop(tasks).await,
                permit = Arc::clone(&self.workers).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                Some(joined) = tasks.join_next() => {
                    self.reap(joined);
                    continue;
                }
            };

            tokio::select! {
                _ = &mut shutdown => return Self::stop(tasks).await,
                trigger = triggers.recv() => match trigger {
                    Some(trigger) => self.dispatch(&mut tasks, trigger, permit),
                    None => break,
                },
                // The permit is released and taken again on the next pass
                Some(joined) = tasks.join_next() => self.reap(joined),
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.reap(joined);
        }
        tracing::debug!("Trigger source closed");
    }

    async fn stop(mut tasks: JoinSet<TaskOutput>) {
        tracing::info!(in_flight = tasks.len(), "Trigger runner shutting down");
        tasks.shutdown().await;
    }

    fn dispatch(
        &self,
        tasks: &mut JoinSet<TaskOutput>,
        trigger: Trigger,
        permit: OwnedSemaphorePermit,
    ) {
        let pipeline = Arc::clone(&self.pipeline);

        tracing::info!(trigger = %trigger, in_flight = tasks.len(), "Trigger received");

        tasks.spawn(async move {
            let _permit = permit;

            let result = match tokio::task::spawn_blocking(move || pipeline.run(trigger)).await {
                Ok(message) => Ok(message),
                Err(e) if e.is_panic() => {
                    Err(ProduceError::Panicked(panic_message(e.into_panic())))
                }
                Err(_) => Err(ProduceError::Cancelled),
            };

            (trigger, result)
        });
    }

    fn reap(&self, joined: Result<TaskOutput, JoinError>) {
        match joined {
            Ok((trigger, Ok(message))) => {
                tracing::debug!(trigger = %trigger, len = message.len(), "Trigger completed");
            }
            Ok((trigger, Err(e))) => {
                tracing::error!(trigger = %trigger, error = %e, "Trigger run failed");
                if matches!(e, ProduceError::Panicked(_)) {
                    self.pipeline.hub().publish(diagnostic(trigger, &e));
                }
            }
            Err(e) if e.is_cancelled() => {
                tracing::debug!("Trigger task cancelled");
            }
            Err(e) => {
                tracing::error!(error = %e, "Trigger task failed");
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
