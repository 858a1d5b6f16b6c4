//! Decision state machines.
//!
//! Every command a workflow issues (schedule activity, start timer, start
//! child workflow, ...) is tracked by exactly one state machine from local
//! creation through server acknowledgment to completion or cancellation. A
//! machine answers, at any time, which decision (if any) should currently be
//! included in the outgoing batch.
//!
//! The machines form a closed set of tagged variants sharing one transition
//! core; category-specific behavior lives in the match arms of the enum
//! methods rather than behind virtual dispatch, so the full transition table
//! stays auditable in one place.

use std::fmt;

use temporal_core::{NonDeterministicError, TemporalError, TemporalResult};
use temporal_proto::shared::{
    CancelTimerDecisionAttributes, Decision, DecisionAttributes, DecisionType,
    RequestCancelActivityTaskDecisionAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ScheduleActivityTaskDecisionAttributes, SignalExternalWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionDecisionAttributes, StartTimerDecisionAttributes,
    WorkflowExecution,
};

/// Decision lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    /// Decision created but not yet sent
    Created,
    /// Decision sent to the server, initiation not yet recorded
    DecisionSent,
    /// Canceled after being sent but before the server recorded initiation
    CanceledBeforeInitiated,
    /// Initiation recorded by the server
    Initiated,
    /// Execution started (activities, child workflows)
    Started,
    /// Canceled after initiation; a cancel-request decision is pending
    CanceledAfterInitiated,
    /// Canceled after start; a cancel-request decision is pending
    CanceledAfterStarted,
    /// Cancel-request decision sent to the server
    CancellationDecisionSent,
    /// Completed while the cancel request was still in flight
    CompletedAfterCancellationDecisionSent,
    /// Terminal: nothing left to emit or to expect from history
    Completed,
}

/// Command categories a decision identifier can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionTarget {
    Activity,
    ChildWorkflow,
    CancelExternalWorkflow,
    SignalExternalWorkflow,
    Timer,
    Marker,
    UpsertSearchAttributes,
    /// Workflow-completion pseudo-target, always anchored at event id 0
    SelfWorkflow,
}

/// Key of one outstanding decision: the command category paired with the
/// history event id the command is anchored to. Two targets may share the
/// same numeric anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecisionId {
    pub target: DecisionTarget,
    pub event_id: i64,
}

impl DecisionId {
    pub fn new(target: DecisionTarget, event_id: i64) -> Self {
        Self { target, event_id }
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.target, self.event_id)
    }
}

/// Shared transition core embedded in every category machine.
///
/// The transition table here covers the common lifecycle; categories that
/// deviate (timers resolve cancellation locally, markers complete on send,
/// ...) handle their special states before delegating.
#[derive(Debug)]
struct StateMachineCore {
    id: DecisionId,
    state: DecisionState,
    state_history: Vec<String>,
}

impl StateMachineCore {
    fn new(id: DecisionId) -> Self {
        Self {
            id,
            state: DecisionState::Created,
            state_history: vec![format!("{:?}", DecisionState::Created)],
        }
    }

    fn transition(&mut self, label: &str, next: DecisionState) {
        self.state_history.push(label.to_string());
        self.state = next;
        self.state_history.push(format!("{next:?}"));
    }

    fn fail_transition(&self, label: &str) -> TemporalError {
        NonDeterministicError::new(format!(
            "unexpected {label} for decision {} in state {:?}, transitions: [{}]",
            self.id,
            self.state,
            self.state_history.join(", "),
        ))
        .into()
    }

    fn handle_decision_task_started_event(&mut self) {
        if self.state == DecisionState::Created {
            self.transition("handleDecisionTaskStartedEvent", DecisionState::DecisionSent);
        }
    }

    fn cancel(&mut self, on_immediate_cancel: Option<&mut dyn FnMut()>) -> TemporalResult<bool> {
        match self.state {
            DecisionState::Created => {
                self.transition("cancel", DecisionState::Completed);
                if let Some(callback) = on_immediate_cancel {
                    callback();
                }
                Ok(false)
            }
            DecisionState::DecisionSent => {
                self.transition("cancel", DecisionState::CanceledBeforeInitiated);
                Ok(true)
            }
            DecisionState::Initiated => {
                self.transition("cancel", DecisionState::CanceledAfterInitiated);
                Ok(true)
            }
            _ => Err(self.fail_transition("cancel")),
        }
    }

    fn handle_initiated_event(&mut self) -> TemporalResult<()> {
        match self.state {
            DecisionState::DecisionSent => {
                self.transition("handleInitiatedEvent", DecisionState::Initiated);
                Ok(())
            }
            DecisionState::CanceledBeforeInitiated => {
                self.transition("handleInitiatedEvent", DecisionState::CanceledAfterInitiated);
                Ok(())
            }
            _ => Err(self.fail_transition("handleInitiatedEvent")),
        }
    }

    fn handle_initiation_failed_event(&mut self) -> TemporalResult<()> {
        match self.state {
            DecisionState::Initiated
            | DecisionState::DecisionSent
            | DecisionState::CanceledBeforeInitiated => {
                self.transition("handleInitiationFailedEvent", DecisionState::Completed);
                Ok(())
            }
            _ => Err(self.fail_transition("handleInitiationFailedEvent")),
        }
    }

    fn handle_completion_event(&mut self) -> TemporalResult<()> {
        match self.state {
            DecisionState::Initiated | DecisionState::CanceledAfterInitiated => {
                self.transition("handleCompletionEvent", DecisionState::Completed);
                Ok(())
            }
            DecisionState::CancellationDecisionSent => {
                self.transition(
                    "handleCompletionEvent",
                    DecisionState::CompletedAfterCancellationDecisionSent,
                );
                Ok(())
            }
            _ => Err(self.fail_transition("handleCompletionEvent")),
        }
    }

    fn handle_cancellation_initiated_event(&mut self) -> TemporalResult<()> {
        match self.state {
            // No state change until the cancellation itself resolves
            DecisionState::CancellationDecisionSent => Ok(()),
            _ => Err(self.fail_transition("handleCancellationInitiatedEvent")),
        }
    }

    fn handle_cancellation_event(&mut self) -> TemporalResult<()> {
        match self.state {
            DecisionState::CancellationDecisionSent => {
                self.transition("handleCancellationEvent", DecisionState::Completed);
                Ok(())
            }
            _ => Err(self.fail_transition("handleCancellationEvent")),
        }
    }

    fn handle_cancellation_failure_event(&mut self) -> TemporalResult<()> {
        match self.state {
            DecisionState::CompletedAfterCancellationDecisionSent => {
                self.transition("handleCancellationFailureEvent", DecisionState::Completed);
                Ok(())
            }
            _ => Err(self.fail_transition("handleCancellationFailureEvent")),
        }
    }

    fn is_done(&self) -> bool {
        matches!(
            self.state,
            DecisionState::Completed | DecisionState::CompletedAfterCancellationDecisionSent
        )
    }
}

/// Activity decision state machine
#[derive(Debug)]
pub struct ActivityStateMachine {
    core: StateMachineCore,
    attributes: ScheduleActivityTaskDecisionAttributes,
}

impl ActivityStateMachine {
    fn schedule_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::ScheduleActivityTask,
            attributes: Some(DecisionAttributes::ScheduleActivityTaskDecisionAttributes(
                Box::new(self.attributes.clone()),
            )),
        }
    }

    fn request_cancel_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::RequestCancelActivityTask,
            attributes: Some(DecisionAttributes::RequestCancelActivityTaskDecisionAttributes(
                Box::new(RequestCancelActivityTaskDecisionAttributes {
                    activity_id: self.attributes.activity_id.clone(),
                }),
            )),
        }
    }
}

/// Timer decision state machine
#[derive(Debug)]
pub struct TimerStateMachine {
    core: StateMachineCore,
    attributes: StartTimerDecisionAttributes,
    canceled: bool,
}

impl TimerStateMachine {
    fn start_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::StartTimer,
            attributes: Some(DecisionAttributes::StartTimerDecisionAttributes(Box::new(
                self.attributes.clone(),
            ))),
        }
    }

    fn cancel_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::CancelTimer,
            attributes: Some(DecisionAttributes::CancelTimerDecisionAttributes(Box::new(
                CancelTimerDecisionAttributes {
                    timer_id: self.attributes.timer_id.clone(),
                },
            ))),
        }
    }
}

/// Child workflow decision state machine
#[derive(Debug)]
pub struct ChildWorkflowStateMachine {
    core: StateMachineCore,
    attributes: StartChildWorkflowExecutionDecisionAttributes,
}

impl ChildWorkflowStateMachine {
    fn start_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::StartChildWorkflowExecution,
            attributes: Some(
                DecisionAttributes::StartChildWorkflowExecutionDecisionAttributes(Box::new(
                    self.attributes.clone(),
                )),
            ),
        }
    }

    fn request_cancel_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::RequestCancelExternalWorkflowExecution,
            attributes: Some(
                DecisionAttributes::RequestCancelExternalWorkflowExecutionDecisionAttributes(
                    Box::new(RequestCancelExternalWorkflowExecutionDecisionAttributes {
                        namespace: self.attributes.namespace.clone(),
                        workflow_execution: Some(WorkflowExecution::new(
                            self.attributes.workflow_id.clone(),
                            "",
                        )),
                        control: None,
                        child_workflow_only: true,
                    }),
                ),
            ),
        }
    }
}

/// Signal-external-workflow decision state machine
#[derive(Debug)]
pub struct SignalStateMachine {
    core: StateMachineCore,
    attributes: SignalExternalWorkflowExecutionDecisionAttributes,
    canceled: bool,
}

impl SignalStateMachine {
    fn signal_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::SignalExternalWorkflowExecution,
            attributes: Some(
                DecisionAttributes::SignalExternalWorkflowExecutionDecisionAttributes(Box::new(
                    self.attributes.clone(),
                )),
            ),
        }
    }
}

/// Cancel-external-workflow decision state machine
#[derive(Debug)]
pub struct CancelExternalStateMachine {
    core: StateMachineCore,
    attributes: RequestCancelExternalWorkflowExecutionDecisionAttributes,
}

impl CancelExternalStateMachine {
    fn request_cancel_decision(&self) -> Decision {
        Decision {
            decision_type: DecisionType::RequestCancelExternalWorkflowExecution,
            attributes: Some(
                DecisionAttributes::RequestCancelExternalWorkflowExecutionDecisionAttributes(
                    Box::new(self.attributes.clone()),
                ),
            ),
        }
    }
}

/// Marker decision state machine. Fire and forget: rendered while Created,
/// resolved on the next decision-task-sent notification.
#[derive(Debug)]
pub struct MarkerStateMachine {
    core: StateMachineCore,
    decision: Decision,
}

/// Upsert-search-attributes decision state machine, same fire-and-forget
/// shape as markers.
#[derive(Debug)]
pub struct UpsertSearchAttributesStateMachine {
    core: StateMachineCore,
    decision: Decision,
}

/// Terminal decision state machine covering workflow completion, failure,
/// cancellation and continue-as-new. Keeps rendering its decision until the
/// server records the corresponding close event.
#[derive(Debug)]
pub struct CompleteWorkflowStateMachine {
    id: DecisionId,
    decision: Option<Decision>,
}

/// The closed set of decision state machines, keyed by category.
#[derive(Debug)]
pub enum DecisionStateMachine {
    Activity(ActivityStateMachine),
    Timer(TimerStateMachine),
    ChildWorkflow(ChildWorkflowStateMachine),
    SignalExternalWorkflow(SignalStateMachine),
    CancelExternalWorkflow(CancelExternalStateMachine),
    Marker(MarkerStateMachine),
    UpsertSearchAttributes(UpsertSearchAttributesStateMachine),
    CompleteWorkflow(CompleteWorkflowStateMachine),
}

impl DecisionStateMachine {
    pub fn activity(id: DecisionId, attributes: ScheduleActivityTaskDecisionAttributes) -> Self {
        Self::Activity(ActivityStateMachine {
            core: StateMachineCore::new(id),
            attributes,
        })
    }

    pub fn timer(id: DecisionId, attributes: StartTimerDecisionAttributes) -> Self {
        Self::Timer(TimerStateMachine {
            core: StateMachineCore::new(id),
            attributes,
            canceled: false,
        })
    }

    pub fn child_workflow(
        id: DecisionId,
        attributes: StartChildWorkflowExecutionDecisionAttributes,
    ) -> Self {
        Self::ChildWorkflow(ChildWorkflowStateMachine {
            core: StateMachineCore::new(id),
            attributes,
        })
    }

    pub fn signal_external_workflow(
        id: DecisionId,
        attributes: SignalExternalWorkflowExecutionDecisionAttributes,
    ) -> Self {
        Self::SignalExternalWorkflow(SignalStateMachine {
            core: StateMachineCore::new(id),
            attributes,
            canceled: false,
        })
    }

    pub fn cancel_external_workflow(
        id: DecisionId,
        attributes: RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ) -> Self {
        Self::CancelExternalWorkflow(CancelExternalStateMachine {
            core: StateMachineCore::new(id),
            attributes,
        })
    }

    pub fn marker(id: DecisionId, decision: Decision) -> Self {
        Self::Marker(MarkerStateMachine {
            core: StateMachineCore::new(id),
            decision,
        })
    }

    pub fn upsert_search_attributes(id: DecisionId, decision: Decision) -> Self {
        Self::UpsertSearchAttributes(UpsertSearchAttributesStateMachine {
            core: StateMachineCore::new(id),
            decision,
        })
    }

    pub fn complete_workflow(id: DecisionId, decision: Decision) -> Self {
        Self::CompleteWorkflow(CompleteWorkflowStateMachine {
            id,
            decision: Some(decision),
        })
    }

    pub fn id(&self) -> DecisionId {
        match self {
            Self::Activity(m) => m.core.id,
            Self::Timer(m) => m.core.id,
            Self::ChildWorkflow(m) => m.core.id,
            Self::SignalExternalWorkflow(m) => m.core.id,
            Self::CancelExternalWorkflow(m) => m.core.id,
            Self::Marker(m) => m.core.id,
            Self::UpsertSearchAttributes(m) => m.core.id,
            Self::CompleteWorkflow(m) => m.id,
        }
    }

    pub fn state(&self) -> DecisionState {
        match self {
            Self::Activity(m) => m.core.state,
            Self::Timer(m) => m.core.state,
            Self::ChildWorkflow(m) => m.core.state,
            Self::SignalExternalWorkflow(m) => m.core.state,
            Self::CancelExternalWorkflow(m) => m.core.state,
            Self::Marker(m) => m.core.state,
            Self::UpsertSearchAttributes(m) => m.core.state,
            Self::CompleteWorkflow(_) => DecisionState::Created,
        }
    }

    /// True once no further history events or outgoing decisions are expected
    /// for this command.
    pub fn is_done(&self) -> bool {
        match self {
            Self::Activity(m) => m.core.is_done(),
            Self::Timer(m) => m.core.is_done() || m.canceled,
            Self::ChildWorkflow(m) => m.core.is_done(),
            Self::SignalExternalWorkflow(m) => m.core.is_done() || m.canceled,
            Self::CancelExternalWorkflow(m) => m.core.is_done(),
            Self::Marker(m) => m.core.state == DecisionState::Completed,
            Self::UpsertSearchAttributes(m) => m.core.state == DecisionState::Completed,
            Self::CompleteWorkflow(m) => m.decision.is_none(),
        }
    }

    /// The decision that should currently be included in the outgoing batch,
    /// or None if there is nothing left to emit.
    pub fn get_decision(&self) -> Option<Decision> {
        match self {
            Self::Activity(m) => match m.core.state {
                DecisionState::Created => Some(m.schedule_decision()),
                DecisionState::CanceledAfterInitiated | DecisionState::CanceledAfterStarted => {
                    Some(m.request_cancel_decision())
                }
                _ => None,
            },
            Self::Timer(m) => match m.core.state {
                DecisionState::Created => Some(m.start_decision()),
                DecisionState::CanceledAfterInitiated => Some(m.cancel_decision()),
                _ => None,
            },
            Self::ChildWorkflow(m) => match m.core.state {
                DecisionState::Created => Some(m.start_decision()),
                DecisionState::CanceledAfterStarted => Some(m.request_cancel_decision()),
                _ => None,
            },
            Self::SignalExternalWorkflow(m) => match m.core.state {
                DecisionState::Created => Some(m.signal_decision()),
                _ => None,
            },
            Self::CancelExternalWorkflow(m) => match m.core.state {
                DecisionState::Created => Some(m.request_cancel_decision()),
                _ => None,
            },
            Self::Marker(m) => match m.core.state {
                DecisionState::Created => Some(m.decision.clone()),
                _ => None,
            },
            Self::UpsertSearchAttributes(m) => match m.core.state {
                DecisionState::Created => Some(m.decision.clone()),
                _ => None,
            },
            Self::CompleteWorkflow(m) => m.decision.clone(),
        }
    }

    /// Request cancellation of this command.
    ///
    /// Returns true when the cancellation produced a new cancel-request
    /// decision (the caller must consume an event id for it). A command that
    /// was never acknowledged by the server resolves synchronously through
    /// `on_immediate_cancel` instead.
    pub fn cancel(
        &mut self,
        on_immediate_cancel: Option<&mut dyn FnMut()>,
    ) -> TemporalResult<bool> {
        match self {
            Self::Activity(m) => match m.core.state {
                DecisionState::Started => {
                    m.core.transition("cancel", DecisionState::CanceledAfterStarted);
                    Ok(true)
                }
                _ => m.core.cancel(on_immediate_cancel),
            },
            Self::Timer(m) => {
                let produced = match m.core.state {
                    DecisionState::Created => {
                        m.core.transition("cancel", DecisionState::Completed);
                        if let Some(callback) = on_immediate_cancel {
                            callback();
                        }
                        false
                    }
                    DecisionState::DecisionSent => {
                        m.core.transition("cancel", DecisionState::CanceledBeforeInitiated);
                        true
                    }
                    DecisionState::Initiated => {
                        m.core.transition("cancel", DecisionState::CanceledAfterInitiated);
                        true
                    }
                    _ => return Err(m.core.fail_transition("cancel")),
                };
                m.canceled = true;
                Ok(produced)
            }
            Self::ChildWorkflow(m) => match m.core.state {
                DecisionState::Started => {
                    m.core.transition("cancel", DecisionState::CanceledAfterStarted);
                    Ok(true)
                }
                _ => m.core.cancel(on_immediate_cancel),
            },
            Self::SignalExternalWorkflow(m) => match m.core.state {
                // There is no cancel decision for an in-flight signal: resolve
                // locally whatever the send progress is.
                DecisionState::Created | DecisionState::DecisionSent | DecisionState::Initiated => {
                    m.core.transition("cancel", DecisionState::Completed);
                    m.canceled = true;
                    if let Some(callback) = on_immediate_cancel {
                        callback();
                    }
                    Ok(false)
                }
                _ => Err(m.core.fail_transition("cancel")),
            },
            Self::CancelExternalWorkflow(m) => Err(TemporalError::IllegalState(format!(
                "cancellation of a cancel request is not supported: {}",
                m.core.id
            ))),
            Self::Marker(m) => Err(TemporalError::IllegalState(format!(
                "cancellation of a marker decision is not supported: {}",
                m.core.id
            ))),
            Self::UpsertSearchAttributes(m) => Err(TemporalError::IllegalState(format!(
                "cancellation of an upsert-search-attributes decision is not supported: {}",
                m.core.id
            ))),
            Self::CompleteWorkflow(m) => Err(TemporalError::IllegalState(format!(
                "cancellation of the workflow completion decision is not supported: {}",
                m.id
            ))),
        }
    }

    /// Notification that the decision this machine currently renders was
    /// included in a transmitted batch.
    pub fn handle_decision_task_started_event(&mut self) {
        match self {
            Self::Activity(m) => match m.core.state {
                DecisionState::CanceledAfterInitiated | DecisionState::CanceledAfterStarted => {
                    m.core.transition(
                        "handleDecisionTaskStartedEvent",
                        DecisionState::CancellationDecisionSent,
                    );
                }
                _ => m.core.handle_decision_task_started_event(),
            },
            Self::Timer(m) => match m.core.state {
                DecisionState::CanceledAfterInitiated => {
                    m.core.transition(
                        "handleDecisionTaskStartedEvent",
                        DecisionState::CancellationDecisionSent,
                    );
                }
                _ => m.core.handle_decision_task_started_event(),
            },
            Self::ChildWorkflow(m) => match m.core.state {
                DecisionState::CanceledAfterStarted => {
                    m.core.transition(
                        "handleDecisionTaskStartedEvent",
                        DecisionState::CancellationDecisionSent,
                    );
                }
                _ => m.core.handle_decision_task_started_event(),
            },
            Self::SignalExternalWorkflow(m) => m.core.handle_decision_task_started_event(),
            Self::CancelExternalWorkflow(m) => m.core.handle_decision_task_started_event(),
            // Markers need no server acknowledgment: sending them is the end
            // of their lifecycle.
            Self::Marker(m) => {
                if m.core.state == DecisionState::Created {
                    m.core
                        .transition("handleDecisionTaskStartedEvent", DecisionState::Completed);
                }
            }
            Self::UpsertSearchAttributes(m) => {
                if m.core.state == DecisionState::Created {
                    m.core
                        .transition("handleDecisionTaskStartedEvent", DecisionState::Completed);
                }
            }
            Self::CompleteWorkflow(_) => {}
        }
    }

    /// Replay encountered the history event the server recorded for this
    /// command's initiation.
    pub fn handle_initiated_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => m.core.handle_initiated_event(),
            Self::Timer(m) => m.core.handle_initiated_event(),
            Self::ChildWorkflow(m) => m.core.handle_initiated_event(),
            Self::SignalExternalWorkflow(m) => {
                if m.canceled {
                    return Ok(());
                }
                m.core.handle_initiated_event()
            }
            Self::CancelExternalWorkflow(m) => m.core.handle_initiated_event(),
            Self::Marker(m) => Err(m.core.fail_transition("handleInitiatedEvent")),
            Self::UpsertSearchAttributes(m) => Err(m.core.fail_transition("handleInitiatedEvent")),
            Self::CompleteWorkflow(m) => {
                m.decision = None;
                Ok(())
            }
        }
    }

    /// The server rejected the initiation of this command.
    pub fn handle_initiation_failed_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => m.core.handle_initiation_failed_event(),
            Self::Timer(m) => m.core.handle_initiation_failed_event(),
            Self::ChildWorkflow(m) => m.core.handle_initiation_failed_event(),
            Self::SignalExternalWorkflow(m) => m.core.handle_initiation_failed_event(),
            Self::CancelExternalWorkflow(m) => m.core.handle_initiation_failed_event(),
            Self::Marker(m) => Err(m.core.fail_transition("handleInitiationFailedEvent")),
            Self::UpsertSearchAttributes(m) => {
                Err(m.core.fail_transition("handleInitiationFailedEvent"))
            }
            Self::CompleteWorkflow(m) => Err(TemporalError::IllegalState(format!(
                "initiation failure is not expected for {}",
                m.id
            ))),
        }
    }

    /// Replay encountered the started event (activities, child workflows).
    pub fn handle_started_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => match m.core.state {
                DecisionState::Initiated => {
                    m.core.transition("handleStartedEvent", DecisionState::Started);
                    Ok(())
                }
                // A start may race a pending cancel request; the cancellation
                // outcome will resolve the machine.
                DecisionState::CanceledAfterInitiated
                | DecisionState::CancellationDecisionSent => Ok(()),
                _ => Err(m.core.fail_transition("handleStartedEvent")),
            },
            Self::ChildWorkflow(m) => match m.core.state {
                DecisionState::Initiated => {
                    m.core.transition("handleStartedEvent", DecisionState::Started);
                    Ok(())
                }
                DecisionState::CanceledAfterInitiated => Ok(()),
                _ => Err(m.core.fail_transition("handleStartedEvent")),
            },
            Self::Timer(m) => Err(m.core.fail_transition("handleStartedEvent")),
            Self::SignalExternalWorkflow(m) => Err(m.core.fail_transition("handleStartedEvent")),
            Self::CancelExternalWorkflow(m) => Err(m.core.fail_transition("handleStartedEvent")),
            Self::Marker(m) => Err(m.core.fail_transition("handleStartedEvent")),
            Self::UpsertSearchAttributes(m) => Err(m.core.fail_transition("handleStartedEvent")),
            Self::CompleteWorkflow(_) => Ok(()),
        }
    }

    /// Replay encountered the terminal event for this command (completion,
    /// failure, timeout, firing, ...). After this call `get_decision` returns
    /// None.
    pub fn handle_completion_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => match m.core.state {
                DecisionState::Started | DecisionState::CanceledAfterStarted => {
                    m.core.transition("handleCompletionEvent", DecisionState::Completed);
                    Ok(())
                }
                _ => m.core.handle_completion_event(),
            },
            Self::Timer(m) => m.core.handle_completion_event(),
            Self::ChildWorkflow(m) => match m.core.state {
                DecisionState::Started | DecisionState::CanceledAfterStarted => {
                    m.core.transition("handleCompletionEvent", DecisionState::Completed);
                    Ok(())
                }
                _ => m.core.handle_completion_event(),
            },
            Self::SignalExternalWorkflow(m) => {
                if m.canceled {
                    return Ok(());
                }
                match m.core.state {
                    DecisionState::DecisionSent | DecisionState::Initiated => {
                        m.core.transition("handleCompletionEvent", DecisionState::Completed);
                        Ok(())
                    }
                    _ => m.core.handle_completion_event(),
                }
            }
            Self::CancelExternalWorkflow(m) => match m.core.state {
                DecisionState::DecisionSent | DecisionState::Initiated => {
                    m.core.transition("handleCompletionEvent", DecisionState::Completed);
                    Ok(())
                }
                _ => m.core.handle_completion_event(),
            },
            Self::Marker(m) => Err(m.core.fail_transition("handleCompletionEvent")),
            Self::UpsertSearchAttributes(m) => {
                Err(m.core.fail_transition("handleCompletionEvent"))
            }
            Self::CompleteWorkflow(m) => {
                m.decision = None;
                Ok(())
            }
        }
    }

    /// The server acknowledged the cancel request (e.g. activity cancel
    /// requested was recorded).
    pub fn handle_cancellation_initiated_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => m.core.handle_cancellation_initiated_event(),
            Self::Timer(m) => m.core.handle_cancellation_initiated_event(),
            Self::ChildWorkflow(m) => m.core.handle_cancellation_initiated_event(),
            Self::SignalExternalWorkflow(m) => m.core.handle_cancellation_initiated_event(),
            Self::CancelExternalWorkflow(m) => m.core.handle_cancellation_initiated_event(),
            Self::Marker(m) => Err(m.core.fail_transition("handleCancellationInitiatedEvent")),
            Self::UpsertSearchAttributes(m) => {
                Err(m.core.fail_transition("handleCancellationInitiatedEvent"))
            }
            Self::CompleteWorkflow(m) => Err(TemporalError::IllegalState(format!(
                "cancellation initiation is not expected for {}",
                m.id
            ))),
        }
    }

    /// Replay encountered the canceled event for this command.
    pub fn handle_cancellation_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => m.core.handle_cancellation_event(),
            Self::Timer(m) => m.core.handle_cancellation_event(),
            Self::ChildWorkflow(m) => m.core.handle_cancellation_event(),
            Self::SignalExternalWorkflow(m) => m.core.handle_cancellation_event(),
            Self::CancelExternalWorkflow(m) => m.core.handle_cancellation_event(),
            Self::Marker(m) => Err(m.core.fail_transition("handleCancellationEvent")),
            Self::UpsertSearchAttributes(m) => {
                Err(m.core.fail_transition("handleCancellationEvent"))
            }
            Self::CompleteWorkflow(m) => Err(TemporalError::IllegalState(format!(
                "cancellation is not expected for {}",
                m.id
            ))),
        }
    }

    /// The cancel request failed; the command keeps running.
    pub fn handle_cancellation_failure_event(&mut self) -> TemporalResult<()> {
        match self {
            Self::Activity(m) => match m.core.state {
                DecisionState::CancellationDecisionSent => {
                    m.core
                        .transition("handleCancellationFailureEvent", DecisionState::Initiated);
                    Ok(())
                }
                _ => m.core.handle_cancellation_failure_event(),
            },
            Self::Timer(m) => match m.core.state {
                DecisionState::CancellationDecisionSent => {
                    m.core
                        .transition("handleCancellationFailureEvent", DecisionState::Initiated);
                    Ok(())
                }
                _ => m.core.handle_cancellation_failure_event(),
            },
            Self::ChildWorkflow(m) => match m.core.state {
                DecisionState::CancellationDecisionSent => {
                    m.core
                        .transition("handleCancellationFailureEvent", DecisionState::Started);
                    Ok(())
                }
                _ => m.core.handle_cancellation_failure_event(),
            },
            Self::SignalExternalWorkflow(m) => m.core.handle_cancellation_failure_event(),
            Self::CancelExternalWorkflow(m) => m.core.handle_cancellation_failure_event(),
            Self::Marker(m) => Err(m.core.fail_transition("handleCancellationFailureEvent")),
            Self::UpsertSearchAttributes(m) => {
                Err(m.core.fail_transition("handleCancellationFailureEvent"))
            }
            Self::CompleteWorkflow(m) => Err(TemporalError::IllegalState(format!(
                "cancellation failure is not expected for {}",
                m.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temporal_core::is_non_deterministic_error;

    fn schedule_attributes(activity_id: &str) -> ScheduleActivityTaskDecisionAttributes {
        ScheduleActivityTaskDecisionAttributes {
            activity_id: activity_id.to_string(),
            activity_type: None,
            task_list: None,
            input: None,
            schedule_to_close_timeout_seconds: None,
            schedule_to_start_timeout_seconds: None,
            start_to_close_timeout_seconds: None,
            heartbeat_timeout_seconds: None,
            retry_policy: None,
            header: None,
        }
    }

    fn timer_attributes(timer_id: &str) -> StartTimerDecisionAttributes {
        StartTimerDecisionAttributes {
            timer_id: timer_id.to_string(),
            start_to_fire_timeout_seconds: 60,
        }
    }

    #[test]
    fn test_activity_happy_path() {
        let id = DecisionId::new(DecisionTarget::Activity, 5);
        let mut machine = DecisionStateMachine::activity(id, schedule_attributes("a1"));

        let decision = machine.get_decision().unwrap();
        assert_eq!(decision.decision_type, DecisionType::ScheduleActivityTask);

        machine.handle_decision_task_started_event();
        assert_eq!(machine.state(), DecisionState::DecisionSent);
        assert!(machine.get_decision().is_none());

        machine.handle_initiated_event().unwrap();
        machine.handle_started_event().unwrap();
        assert_eq!(machine.state(), DecisionState::Started);

        machine.handle_completion_event().unwrap();
        assert!(machine.is_done());
        assert!(machine.get_decision().is_none());
    }

    #[test]
    fn test_activity_cancel_before_sent_runs_callback() {
        let id = DecisionId::new(DecisionTarget::Activity, 5);
        let mut machine = DecisionStateMachine::activity(id, schedule_attributes("a1"));

        let mut canceled = false;
        let mut callback = || canceled = true;
        let produced = machine.cancel(Some(&mut callback)).unwrap();

        assert!(!produced);
        assert!(canceled);
        assert!(machine.is_done());
        assert!(machine.get_decision().is_none());
    }

    #[test]
    fn test_activity_cancel_after_initiated_renders_cancel_request() {
        let id = DecisionId::new(DecisionTarget::Activity, 5);
        let mut machine = DecisionStateMachine::activity(id, schedule_attributes("a1"));
        machine.handle_decision_task_started_event();
        machine.handle_initiated_event().unwrap();

        let mut canceled = false;
        let mut callback = || canceled = true;
        let produced = machine.cancel(Some(&mut callback)).unwrap();

        assert!(produced);
        assert!(!canceled);
        let decision = machine.get_decision().unwrap();
        assert_eq!(decision.decision_type, DecisionType::RequestCancelActivityTask);

        machine.handle_decision_task_started_event();
        assert_eq!(machine.state(), DecisionState::CancellationDecisionSent);
        machine.handle_cancellation_initiated_event().unwrap();
        machine.handle_cancellation_event().unwrap();
        assert!(machine.is_done());
    }

    #[test]
    fn test_activity_cancellation_failure_returns_to_initiated() {
        let id = DecisionId::new(DecisionTarget::Activity, 5);
        let mut machine = DecisionStateMachine::activity(id, schedule_attributes("a1"));
        machine.handle_decision_task_started_event();
        machine.handle_initiated_event().unwrap();
        machine.cancel(None).unwrap();
        machine.handle_decision_task_started_event();

        machine.handle_cancellation_failure_event().unwrap();
        assert_eq!(machine.state(), DecisionState::Initiated);

        machine.handle_completion_event().unwrap();
        assert!(machine.is_done());
    }

    #[test]
    fn test_timer_cancel_after_initiated_renders_cancel_timer() {
        let id = DecisionId::new(DecisionTarget::Timer, 7);
        let mut machine = DecisionStateMachine::timer(id, timer_attributes("t1"));
        machine.handle_decision_task_started_event();
        machine.handle_initiated_event().unwrap();

        let produced = machine.cancel(None).unwrap();
        assert!(produced);
        // A canceled timer no longer blocks the workflow even though the
        // cancel decision is still in flight.
        assert!(machine.is_done());

        let decision = machine.get_decision().unwrap();
        assert_eq!(decision.decision_type, DecisionType::CancelTimer);
    }

    #[test]
    fn test_marker_completes_on_send_notification() {
        let id = DecisionId::new(DecisionTarget::Marker, 3);
        let decision = Decision {
            decision_type: DecisionType::RecordMarker,
            attributes: None,
        };
        let mut machine = DecisionStateMachine::marker(id, decision);

        assert!(machine.get_decision().is_some());
        assert!(!machine.is_done());

        machine.handle_decision_task_started_event();
        assert!(machine.is_done());
        assert!(machine.get_decision().is_none());
    }

    #[test]
    fn test_signal_cancel_resolves_locally() {
        let id = DecisionId::new(DecisionTarget::SignalExternalWorkflow, 9);
        let attributes = SignalExternalWorkflowExecutionDecisionAttributes {
            namespace: "default".to_string(),
            workflow_execution: None,
            signal_name: "go".to_string(),
            input: None,
            control: None,
            child_workflow_only: false,
        };
        let mut machine = DecisionStateMachine::signal_external_workflow(id, attributes);
        machine.handle_decision_task_started_event();

        let mut canceled = false;
        let mut callback = || canceled = true;
        let produced = machine.cancel(Some(&mut callback)).unwrap();

        assert!(!produced);
        assert!(canceled);
        assert!(machine.is_done());
        // Late replay of the initiation must not trip the canceled machine.
        machine.handle_initiated_event().unwrap();
        machine.handle_completion_event().unwrap();
    }

    #[test]
    fn test_complete_workflow_resolves_on_initiated() {
        let id = DecisionId::new(DecisionTarget::SelfWorkflow, 0);
        let decision = Decision {
            decision_type: DecisionType::CompleteWorkflowExecution,
            attributes: None,
        };
        let mut machine = DecisionStateMachine::complete_workflow(id, decision);

        assert!(machine.get_decision().is_some());
        // Still rendered after send: completion must be re-sent until the
        // server records it.
        machine.handle_decision_task_started_event();
        assert!(machine.get_decision().is_some());
        assert!(!machine.is_done());

        machine.handle_initiated_event().unwrap();
        assert!(machine.get_decision().is_none());
        assert!(machine.is_done());
    }

    #[test]
    fn test_unexpected_event_is_non_deterministic() {
        let id = DecisionId::new(DecisionTarget::Activity, 5);
        let mut machine = DecisionStateMachine::activity(id, schedule_attributes("a1"));

        let err = machine.handle_completion_event().unwrap_err();
        assert!(is_non_deterministic_error(&err));
    }
}
