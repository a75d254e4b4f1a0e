//! Assessment lifecycle: create, trigger analysis, then poll until the server
//! reports a terminal status.
//!
//! Polling is a read → decide → sleep loop. The next read is only scheduled
//! after the previous one settled, so reads never overlap, and the loop stops
//! as soon as [`next_poll_delay`] says so. Every read bypasses the cache, so a
//! stale terminal status cached before a re-analysis cannot end a watch early.

use std::time::Duration;

use bullpen_api::ClientError;
use bullpen_registry::Operation;
use bullpen_types::{AnalysisAccepted, Assessment, CreateAssessmentRequest};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::hooks::AssessmentsHook;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Delay before the next read of an assessment, or `None` to stop polling.
pub fn next_poll_delay(assessment: Option<&Assessment>) -> Option<Duration> {
    poll_delay_with(assessment, DEFAULT_POLL_INTERVAL)
}

fn poll_delay_with(assessment: Option<&Assessment>, interval: Duration) -> Option<Duration> {
    assessment
        .filter(|assessment| assessment.status.is_in_progress())
        .map(|_| interval)
}

/// What a watcher has observed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollSnapshot {
    pub assessment: Option<Assessment>,
    /// Set when a read failed; polling ends with it.
    pub error: Option<ClientError>,
    pub reads: u32,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct AssessmentLifecycle {
    assessments: AssessmentsHook,
    poll_interval: Duration,
}

impl AssessmentLifecycle {
    pub fn new(assessments: AssessmentsHook) -> Self {
        Self {
            assessments,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Create an assessment and kick off its analysis without waiting for it.
    ///
    /// The analyze request runs as a detached task. If it fails the
    /// assessment stays pending until [`Self::analyze_assessment`] is called.
    pub async fn create_assessment(&self, request: &CreateAssessmentRequest) -> Result<Assessment, ClientError> {
        let assessment = self.assessments.create(request).await?;
        info!(assessment_id = assessment.id, status = %assessment.status, "assessment created");
        self.trigger_analysis(assessment.id);
        Ok(assessment)
    }

    fn trigger_analysis(&self, id: i64) {
        let assessments = self.assessments.clone();
        tokio::spawn(async move {
            match assessments.analyze(id).await {
                Ok(_) => debug!(assessment_id = id, "analysis triggered"),
                Err(error) => warn!(
                    assessment_id = id,
                    error = %error,
                    "analysis trigger failed; assessment stays pending until analysis is requested again"
                ),
            }
        });
    }

    /// Manual trigger, used to retry a stranded assessment.
    pub async fn analyze_assessment(&self, id: i64) -> Result<AnalysisAccepted, ClientError> {
        self.assessments.analyze(id).await
    }

    /// Start polling one assessment. Polling stops when the handle is dropped.
    pub fn watch(&self, id: i64) -> AssessmentWatch {
        let (sender, receiver) = watch::channel(PollSnapshot::default());
        let assessments = self.assessments.clone();
        let interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut reads = 0u32;
            loop {
                let outcome = assessments.refetch(id).await;
                reads += 1;

                match outcome {
                    Ok(assessment) => {
                        let delay = poll_delay_with(Some(&assessment), interval);
                        debug!(assessment_id = id, reads, status = %assessment.status, "assessment polled");
                        sender.send_replace(PollSnapshot {
                            assessment: Some(assessment),
                            error: None,
                            reads,
                            finished: delay.is_none(),
                        });
                        let Some(delay) = delay else {
                            info!(assessment_id = id, reads, "assessment polling finished");
                            break;
                        };
                        tokio::time::sleep(delay).await;
                    }
                    Err(error) => {
                        warn!(assessment_id = id, reads, error = %error, "assessment polling stopped by read failure");
                        sender.send_modify(|snapshot| {
                            snapshot.error = Some(error);
                            snapshot.reads = reads;
                            snapshot.finished = true;
                        });
                        break;
                    }
                }
            }
        });

        AssessmentWatch { id, receiver, task }
    }
}

/// Live view of one polling loop. Dropping it aborts the loop.
#[derive(Debug)]
pub struct AssessmentWatch {
    id: i64,
    receiver: watch::Receiver<PollSnapshot>,
    task: JoinHandle<()>,
}

impl AssessmentWatch {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn latest(&self) -> PollSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published snapshot. `None` once polling has ended.
    pub async fn changed(&mut self) -> Option<PollSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Resolve with the terminal assessment (`complete` or `failed`), or the
    /// read error that ended polling.
    pub async fn wait_for_terminal(&mut self) -> Result<Assessment, ClientError> {
        loop {
            let snapshot = self.receiver.borrow_and_update().clone();
            if snapshot.finished {
                return self.settle(snapshot);
            }
            if self.receiver.changed().await.is_err() {
                let snapshot = self.receiver.borrow().clone();
                return self.settle(snapshot);
            }
        }
    }

    fn settle(&self, snapshot: PollSnapshot) -> Result<Assessment, ClientError> {
        match (snapshot.error, snapshot.assessment) {
            (Some(error), _) => Err(error),
            (None, Some(assessment)) if snapshot.finished => Ok(assessment),
            _ => Err(ClientError::Transport {
                operation: Operation::AssessmentsGet,
                status: None,
                message: format!("polling of assessment {} stopped before a terminal status", self.id),
            }),
        }
    }

    pub fn stop(self) {}
}

impl Drop for AssessmentWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
