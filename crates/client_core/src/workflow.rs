//! Workflow controller: Collecting -> Submitting -> Reporting, with recovery to
//! Collecting when classification fails.
//!
//! Events that arrive while a classification is in flight follow one policy:
//! a second `submit` is rejected and leaves the in-flight call untouched, while
//! `restart` aborts the in-flight task and returns to `Collecting`.

use std::{fmt, sync::Arc};

use shared::{
    domain::{PatientRecord, RunId},
    error::{ErrorNotice, ValidationError},
    protocol::{RawClassification, Report},
};
use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{error, info, info_span, warn, Instrument};

use crate::{
    classifier::{Classifier, ClassifierError},
    enrichment::{self, EnrichmentError},
};

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    Collecting,
    Submitting,
    Reporting,
}

impl fmt::Display for StateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateTag::Collecting => "collecting",
            StateTag::Submitting => "submitting",
            StateTag::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowState {
    Collecting,
    Submitting {
        run_id: RunId,
        record: Arc<PatientRecord>,
    },
    Reporting {
        run_id: RunId,
        record: Arc<PatientRecord>,
        report: Arc<Report>,
    },
}

impl WorkflowState {
    pub fn tag(&self) -> StateTag {
        match self {
            WorkflowState::Collecting => StateTag::Collecting,
            WorkflowState::Submitting { .. } => StateTag::Submitting,
            WorkflowState::Reporting { .. } => StateTag::Reporting,
        }
    }

    pub fn run_id(&self) -> Option<RunId> {
        match self {
            WorkflowState::Collecting => None,
            WorkflowState::Submitting { run_id, .. } | WorkflowState::Reporting { run_id, .. } => {
                Some(*run_id)
            }
        }
    }

    pub fn record(&self) -> Option<&PatientRecord> {
        match self {
            WorkflowState::Collecting => None,
            WorkflowState::Submitting { record, .. } | WorkflowState::Reporting { record, .. } => {
                Some(record)
            }
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            WorkflowState::Reporting { report, .. } => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    StateChanged {
        run_id: Option<RunId>,
        state: StateTag,
    },
    Notice(ErrorNotice),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("patient record rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error("cannot {event} while {state}")]
    InvalidTransition {
        state: StateTag,
        event: &'static str,
    },
    #[error(transparent)]
    UnknownDiagnosisCode(#[from] EnrichmentError),
    #[error("classification task ended unexpectedly: {0}")]
    TaskAborted(String),
}

struct InFlight {
    run_id: RunId,
    task: JoinHandle<Result<RawClassification, ClassifierError>>,
}

pub struct WorkflowController<C: Classifier + 'static> {
    classifier: Arc<C>,
    state: WorkflowState,
    in_flight: Option<InFlight>,
    notice: Option<ErrorNotice>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl<C: Classifier + 'static> WorkflowController<C> {
    pub fn new(classifier: C) -> Self {
        Self::with_classifier(Arc::new(classifier))
    }

    pub fn with_classifier(classifier: Arc<C>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            classifier,
            state: WorkflowState::Collecting,
            in_flight: None,
            notice: None,
            events,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn state_tag(&self) -> StateTag {
        self.state.tag()
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<ErrorNotice> {
        self.notice.take()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    /// Accepts a record from `Collecting` and starts its classification.
    ///
    /// Must be called from within a Tokio runtime; the classification runs as
    /// a spawned task that [`WorkflowController::complete`] later awaits.
    pub fn submit(&mut self, record: PatientRecord) -> Result<RunId, WorkflowError> {
        let current = self.state.tag();
        if current != StateTag::Collecting {
            warn!(state = %current, "ignoring submit outside data entry");
            return Err(WorkflowError::InvalidTransition {
                state: current,
                event: "submit",
            });
        }

        if let Err(err) = record.validate() {
            warn!("rejected incomplete patient record: {err}");
            return Err(err.into());
        }

        let run_id = RunId::new();
        let record = Arc::new(record);
        let classifier = Arc::clone(&self.classifier);
        let task_record = Arc::clone(&record);
        let task = tokio::spawn(
            async move { classifier.classify(&task_record).await }
                .instrument(info_span!("classify", %run_id)),
        );

        info!(%run_id, lesion_site = record.lesion_site.as_str(), "submitted patient record");
        self.notice = None;
        self.in_flight = Some(InFlight { run_id, task });
        self.transition(WorkflowState::Submitting { run_id, record });
        Ok(run_id)
    }

    /// Awaits the outstanding classification and applies its outcome.
    ///
    /// Classifier failures become the notice and return `Ok` with the
    /// controller back in `Collecting`. An unknown diagnosis code is returned
    /// as an error.
    ///
    /// Cancel safe: the task handle stays with the controller until the task
    /// resolves, so dropping this future leaves the run in flight and a later
    /// `complete` or `restart` still applies to it.
    pub async fn complete(&mut self) -> Result<&WorkflowState, WorkflowError> {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return Err(WorkflowError::InvalidTransition {
                state: self.state.tag(),
                event: "complete",
            });
        };
        let run_id = in_flight.run_id;
        let record = match &self.state {
            WorkflowState::Submitting { record, .. } => Some(Arc::clone(record)),
            _ => None,
        };
        let Some(record) = record else {
            let state = self.state.tag();
            error!(%state, "in-flight classification without a submitting state");
            self.reset();
            return Err(WorkflowError::InvalidTransition {
                state,
                event: "complete",
            });
        };

        let joined = (&mut in_flight.task).await;
        self.in_flight = None;

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%run_id, "classification task failed: {err}");
                self.reset();
                return Err(WorkflowError::TaskAborted(err.to_string()));
            }
        };

        match outcome {
            Ok(raw) => match enrichment::enrich(&raw) {
                Ok(report) => {
                    info!(
                        %run_id,
                        diagnosis = report.diagnosis.as_str(),
                        confidence = report.confidence,
                        urgency = report.urgency.as_str(),
                        "classification enriched into report"
                    );
                    self.transition(WorkflowState::Reporting {
                        run_id,
                        record,
                        report: Arc::new(report),
                    });
                    Ok(&self.state)
                }
                Err(err) => {
                    error!(%run_id, diagnosis = %raw.diagnosis, "{err}");
                    self.reset();
                    Err(err.into())
                }
            },
            Err(err) => {
                warn!(%run_id, kind = ?err.kind(), "classification failed: {err}");
                let notice = err.notice();
                self.notice = Some(notice.clone());
                let _ = self.events.send(WorkflowEvent::Notice(notice));
                self.reset();
                Ok(&self.state)
            }
        }
    }

    /// Returns to `Collecting`, dropping any record and report. Aborts an
    /// in-flight classification.
    pub fn restart(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            info!(run_id = %in_flight.run_id, "cancelled in-flight classification");
        }
        self.notice = None;
        if self.state.tag() != StateTag::Collecting {
            self.transition(WorkflowState::Collecting);
        }
    }

    fn reset(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
        self.transition(WorkflowState::Collecting);
    }

    fn transition(&mut self, next: WorkflowState) {
        let event = WorkflowEvent::StateChanged {
            run_id: next.run_id(),
            state: next.tag(),
        };
        self.state = next;
        let _ = self.events.send(event);
    }
}

impl<C: Classifier + 'static> Drop for WorkflowController<C> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
