//! Decision engine.
//!
//! `DecisionsHelper` owns the ordered collection of outstanding decision
//! state machines, assigns the history event id every new decision is
//! anchored to, reconciles replayed history events against the machines, and
//! renders the outgoing decision batch with its size cap.
//!
//! One instance belongs to exactly one workflow execution attempt and is
//! rebuilt from scratch on every full replay; nothing here is shared across
//! threads.

use std::collections::HashMap;

use indexmap::IndexMap;

use temporal_core::{CorruptedEventError, NonDeterministicError, TemporalError, TemporalResult};
use temporal_proto::shared::{
    CancelWorkflowExecutionDecisionAttributes, CompleteWorkflowExecutionDecisionAttributes,
    ContinueAsNewWorkflowExecutionDecisionAttributes, Decision, DecisionAttributes, DecisionType,
    EventAttributes, EventType, FailWorkflowExecutionDecisionAttributes, Header, HistoryEvent,
    MarkerRecordedEventAttributes, RecordMarkerDecisionAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ScheduleActivityTaskDecisionAttributes, SearchAttributes,
    SignalExternalWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionDecisionAttributes, StartTimerDecisionAttributes,
    UpsertWorkflowSearchAttributesDecisionAttributes,
};
use temporal_proto::workflow_service::PollForDecisionTaskResponse;

use crate::history::DecisionEvents;
use crate::markers::VERSION_MARKER_NAME;
use crate::state_machine::{DecisionId, DecisionStateMachine, DecisionTarget};

/// Upper bound on the number of decisions returned for one task completion.
pub const MAXIMUM_DECISIONS_PER_COMPLETION: usize = 10_000;

/// Timer id of the zero-delay timer appended when a batch is truncated; it
/// forces an immediate follow-up decision task so the remaining decisions are
/// sent on the next round.
pub const FORCE_IMMEDIATE_DECISION_TIMER: &str = "FORCE_IMMEDIATE_DECISION";

const NON_DETERMINISTIC_MESSAGE: &str = "The possible causes are a nondeterministic workflow \
     definition code or an incompatible change in the workflow definition.";

macro_rules! event_attributes {
    ($event:expr, $variant:ident) => {
        match &$event.attributes {
            Some(EventAttributes::$variant(attributes)) => Ok(attributes.as_ref()),
            _ => Err(TemporalError::from(CorruptedEventError::new(
                $event.event_id,
                format!("{:?}", $event.event_type),
                stringify!($variant),
            ))),
        }
    };
}

/// Tracks all outstanding decisions for one workflow execution attempt.
pub struct DecisionsHelper {
    task: PollForDecisionTaskResponse,

    /// Id of the history event that will correspond to the next decision
    /// added to the collection. Advanced by exactly one per insertion.
    next_decision_event_id: i64,

    /// Local counter for minting short-lived string ids; unrelated to
    /// history event ids.
    id_counter: i64,

    decision_events: Option<DecisionEvents>,

    /// Outstanding decisions in creation order, except that every successful
    /// lookup moves the entry to the end (see `decision_mut`).
    decisions: IndexMap<DecisionId, DecisionStateMachine>,

    /// Some server events reference activities by their user-supplied string
    /// id rather than the scheduled event id; this index resolves them.
    activity_id_to_scheduled_event_id: HashMap<String, i64>,
}

impl DecisionsHelper {
    pub fn new(task: PollForDecisionTaskResponse) -> Self {
        Self {
            task,
            next_decision_event_id: 0,
            id_counter: 0,
            decision_events: None,
            decisions: IndexMap::new(),
            activity_id_to_scheduled_event_id: HashMap::new(),
        }
    }

    pub fn task(&self) -> &PollForDecisionTaskResponse {
        &self.task
    }

    pub fn get_next_decision_event_id(&self) -> i64 {
        self.next_decision_event_id
    }

    /// Mint the next miscellaneous string id.
    pub fn get_and_increment_next_id(&mut self) -> String {
        let id = self.id_counter;
        self.id_counter += 1;
        id.to_string()
    }

    /// Install the decision-event window for the task being processed and
    /// align the counter with the anchor id it dictates.
    pub fn handle_decision_task_started_event(&mut self, decision_events: DecisionEvents) {
        self.next_decision_event_id = decision_events.next_decision_event_id();
        self.decision_events = Some(decision_events);
    }

    /// The history event previously recorded at `event_id`, if it falls
    /// inside the current task's decision-event window.
    pub fn get_optional_decision_event(&self, event_id: i64) -> Option<&HistoryEvent> {
        self.decision_events
            .as_ref()
            .and_then(|events| events.optional_decision_event(event_id))
    }

    // ---- activities ----

    /// Returns the anchor event id the schedule decision corresponds to.
    pub fn schedule_activity_task(
        &mut self,
        schedule: ScheduleActivityTaskDecisionAttributes,
    ) -> TemporalResult<i64> {
        self.add_all_missing_version_marker(false, None)?;

        let next_decision_event_id = self.next_decision_event_id;
        let decision_id = DecisionId::new(DecisionTarget::Activity, next_decision_event_id);
        self.activity_id_to_scheduled_event_id
            .insert(schedule.activity_id.clone(), next_decision_event_id);
        self.add_decision(decision_id, DecisionStateMachine::activity(decision_id, schedule));
        Ok(next_decision_event_id)
    }

    /// Returns true if the activity is already resolved, which happens when
    /// the cancellation was short-circuited before the schedule was sent.
    pub fn request_cancel_activity_task(
        &mut self,
        scheduled_event_id: i64,
        on_immediate_cancel: Option<&mut dyn FnMut()>,
    ) -> TemporalResult<bool> {
        let decision_id = DecisionId::new(DecisionTarget::Activity, scheduled_event_id);
        let machine = self.decision_mut(decision_id)?;
        let produced = machine.cancel(on_immediate_cancel)?;
        let done = machine.is_done();
        if produced {
            self.next_decision_event_id += 1;
        }
        Ok(done)
    }

    pub fn handle_activity_task_scheduled(&mut self, event: &HistoryEvent) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::Activity, event.event_id);
        self.decision_mut(decision_id)?.handle_initiated_event()
    }

    pub fn handle_activity_task_started(&mut self, event: &HistoryEvent) -> TemporalResult<()> {
        let attributes = event_attributes!(event, ActivityTaskStartedEventAttributes)?;
        let decision_id = DecisionId::new(DecisionTarget::Activity, attributes.scheduled_event_id);
        self.decision_mut(decision_id)?.handle_started_event()
    }

    /// Completion, failure or timeout of an activity; all resolve the machine.
    pub fn handle_activity_task_closed(&mut self, scheduled_event_id: i64) -> TemporalResult<bool> {
        let decision_id = DecisionId::new(DecisionTarget::Activity, scheduled_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_completion_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_activity_task_cancel_requested(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, ActivityTaskCancelRequestedEventAttributes)?;
        let scheduled_event_id = self.activity_scheduled_event_id(&attributes.activity_id)?;
        let decision_id = DecisionId::new(DecisionTarget::Activity, scheduled_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_cancellation_initiated_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_activity_task_canceled(&mut self, event: &HistoryEvent) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, ActivityTaskCanceledEventAttributes)?;
        let decision_id = DecisionId::new(DecisionTarget::Activity, attributes.scheduled_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_cancellation_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_request_cancel_activity_task_failed(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, RequestCancelActivityTaskFailedEventAttributes)?;
        let scheduled_event_id = self.activity_scheduled_event_id(&attributes.activity_id)?;
        let decision_id = DecisionId::new(DecisionTarget::Activity, scheduled_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_cancellation_failure_event()?;
        Ok(machine.is_done())
    }

    fn activity_scheduled_event_id(&self, activity_id: &str) -> TemporalResult<i64> {
        self.activity_id_to_scheduled_event_id
            .get(activity_id)
            .copied()
            .ok_or_else(|| {
                TemporalError::IllegalState(format!("unknown activity id: {activity_id}"))
            })
    }

    /// True when this task is not a replay or the ActivityTaskScheduled event
    /// recorded at the anchor carries a retry policy. False only for
    /// histories produced by legacy client-side retry.
    pub fn is_activity_scheduled_with_retry_options(&self) -> TemporalResult<bool> {
        let Some(event) = self.get_optional_decision_event(self.next_decision_event_id) else {
            return Ok(true);
        };
        if event.event_type != EventType::ActivityTaskScheduled {
            return Ok(false);
        }
        let attributes = event_attributes!(event, ActivityTaskScheduledEventAttributes)?;
        Ok(attributes.retry_policy.is_some())
    }

    // ---- child workflows ----

    pub fn start_child_workflow_execution(
        &mut self,
        child_workflow: StartChildWorkflowExecutionDecisionAttributes,
    ) -> TemporalResult<i64> {
        self.add_all_missing_version_marker(false, None)?;

        let next_decision_event_id = self.next_decision_event_id;
        let decision_id = DecisionId::new(DecisionTarget::ChildWorkflow, next_decision_event_id);
        self.add_decision(
            decision_id,
            DecisionStateMachine::child_workflow(decision_id, child_workflow),
        );
        Ok(next_decision_event_id)
    }

    /// True when this task is not a replay or the
    /// StartChildWorkflowExecutionInitiated event recorded at the anchor
    /// carries a retry policy.
    pub fn is_child_workflow_execution_initiated_with_retry_options(
        &self,
    ) -> TemporalResult<bool> {
        let Some(event) = self.get_optional_decision_event(self.next_decision_event_id) else {
            return Ok(true);
        };
        if event.event_type != EventType::StartChildWorkflowExecutionInitiated {
            return Ok(false);
        }
        let attributes =
            event_attributes!(event, StartChildWorkflowExecutionInitiatedEventAttributes)?;
        Ok(attributes.retry_policy.is_some())
    }

    pub fn handle_start_child_workflow_execution_initiated(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::ChildWorkflow, event.event_id);
        self.decision_mut(decision_id)?.handle_initiated_event()
    }

    pub fn handle_start_child_workflow_execution_failed(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<bool> {
        let attributes =
            event_attributes!(event, StartChildWorkflowExecutionFailedEventAttributes)?;
        let decision_id =
            DecisionId::new(DecisionTarget::ChildWorkflow, attributes.initiated_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_initiation_failed_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_child_workflow_execution_started(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let attributes = event_attributes!(event, ChildWorkflowExecutionStartedEventAttributes)?;
        let decision_id =
            DecisionId::new(DecisionTarget::ChildWorkflow, attributes.initiated_event_id);
        self.decision_mut(decision_id)?.handle_started_event()
    }

    /// Completion, failure, timeout or termination of a child workflow.
    pub fn handle_child_workflow_execution_closed(
        &mut self,
        initiated_event_id: i64,
    ) -> TemporalResult<bool> {
        let decision_id = DecisionId::new(DecisionTarget::ChildWorkflow, initiated_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_completion_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_child_workflow_execution_canceled(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, ChildWorkflowExecutionCanceledEventAttributes)?;
        let decision_id =
            DecisionId::new(DecisionTarget::ChildWorkflow, attributes.initiated_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_cancellation_event()?;
        Ok(machine.is_done())
    }

    // ---- external workflow cancellation ----

    pub fn request_cancel_external_workflow_execution(
        &mut self,
        request: RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ) -> TemporalResult<i64> {
        self.add_all_missing_version_marker(false, None)?;

        let next_decision_event_id = self.next_decision_event_id;
        let decision_id =
            DecisionId::new(DecisionTarget::CancelExternalWorkflow, next_decision_event_id);
        self.add_decision(
            decision_id,
            DecisionStateMachine::cancel_external_workflow(decision_id, request),
        );
        Ok(next_decision_event_id)
    }

    pub fn handle_request_cancel_external_workflow_execution_initiated(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::CancelExternalWorkflow, event.event_id);
        self.decision_mut(decision_id)?.handle_initiated_event()
    }

    pub fn handle_external_workflow_execution_cancel_requested(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let attributes =
            event_attributes!(event, ExternalWorkflowExecutionCancelRequestedEventAttributes)?;
        let decision_id = DecisionId::new(
            DecisionTarget::CancelExternalWorkflow,
            attributes.initiated_event_id,
        );
        self.decision_mut(decision_id)?.handle_completion_event()
    }

    pub fn handle_request_cancel_external_workflow_execution_failed(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let attributes =
            event_attributes!(event, RequestCancelExternalWorkflowExecutionFailedEventAttributes)?;
        let decision_id = DecisionId::new(
            DecisionTarget::CancelExternalWorkflow,
            attributes.initiated_event_id,
        );
        self.decision_mut(decision_id)?.handle_completion_event()
    }

    // ---- external workflow signals ----

    pub fn signal_external_workflow_execution(
        &mut self,
        signal: SignalExternalWorkflowExecutionDecisionAttributes,
    ) -> TemporalResult<i64> {
        self.add_all_missing_version_marker(false, None)?;

        let next_decision_event_id = self.next_decision_event_id;
        let decision_id =
            DecisionId::new(DecisionTarget::SignalExternalWorkflow, next_decision_event_id);
        self.add_decision(
            decision_id,
            DecisionStateMachine::signal_external_workflow(decision_id, signal),
        );
        Ok(next_decision_event_id)
    }

    pub fn cancel_signal_external_workflow_execution(
        &mut self,
        initiated_event_id: i64,
        on_immediate_cancel: Option<&mut dyn FnMut()>,
    ) -> TemporalResult<()> {
        let decision_id =
            DecisionId::new(DecisionTarget::SignalExternalWorkflow, initiated_event_id);
        let machine = self.decision_mut(decision_id)?;
        if machine.cancel(on_immediate_cancel)? {
            self.next_decision_event_id += 1;
        }
        Ok(())
    }

    pub fn handle_signal_external_workflow_execution_initiated(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::SignalExternalWorkflow, event.event_id);
        self.decision_mut(decision_id)?.handle_initiated_event()
    }

    pub fn handle_external_workflow_execution_signaled(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<bool> {
        let attributes =
            event_attributes!(event, ExternalWorkflowExecutionSignaledEventAttributes)?;
        let decision_id = DecisionId::new(
            DecisionTarget::SignalExternalWorkflow,
            attributes.initiated_event_id,
        );
        let machine = self.decision_mut(decision_id)?;
        machine.handle_completion_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_signal_external_workflow_execution_failed(
        &mut self,
        event: &HistoryEvent,
    ) -> TemporalResult<bool> {
        let attributes =
            event_attributes!(event, SignalExternalWorkflowExecutionFailedEventAttributes)?;
        let decision_id = DecisionId::new(
            DecisionTarget::SignalExternalWorkflow,
            attributes.initiated_event_id,
        );
        let machine = self.decision_mut(decision_id)?;
        machine.handle_completion_event()?;
        Ok(machine.is_done())
    }

    // ---- timers ----

    pub fn start_timer(
        &mut self,
        request: StartTimerDecisionAttributes,
    ) -> TemporalResult<i64> {
        self.add_all_missing_version_marker(false, None)?;

        let start_event_id = self.next_decision_event_id;
        let decision_id = DecisionId::new(DecisionTarget::Timer, start_event_id);
        self.add_decision(decision_id, DecisionStateMachine::timer(decision_id, request));
        Ok(start_event_id)
    }

    pub fn cancel_timer(
        &mut self,
        started_event_id: i64,
        on_immediate_cancel: Option<&mut dyn FnMut()>,
    ) -> TemporalResult<bool> {
        let decision_id = DecisionId::new(DecisionTarget::Timer, started_event_id);
        let machine = self.decision_mut(decision_id)?;
        if machine.is_done() {
            // Cancellation callbacks are not deregistered and may be invoked
            // after the timer has already fired.
            return Ok(true);
        }
        let produced = machine.cancel(on_immediate_cancel)?;
        let done = machine.is_done();
        if produced {
            self.next_decision_event_id += 1;
        }
        Ok(done)
    }

    pub fn handle_timer_started(&mut self, event: &HistoryEvent) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::Timer, event.event_id);
        // TimerStarted is the initiation event for a timer; there is no
        // separate started event as there is for activities.
        self.decision_mut(decision_id)?.handle_initiated_event()
    }

    pub fn handle_timer_fired(&mut self, event: &HistoryEvent) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, TimerFiredEventAttributes)?;
        let decision_id = DecisionId::new(DecisionTarget::Timer, attributes.started_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_completion_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_timer_canceled(&mut self, event: &HistoryEvent) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, TimerCanceledEventAttributes)?;
        let decision_id = DecisionId::new(DecisionTarget::Timer, attributes.started_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_cancellation_event()?;
        Ok(machine.is_done())
    }

    pub fn handle_cancel_timer_failed(&mut self, event: &HistoryEvent) -> TemporalResult<bool> {
        let attributes = event_attributes!(event, CancelTimerFailedEventAttributes)?;
        let decision_id = DecisionId::new(DecisionTarget::Timer, attributes.started_event_id);
        let machine = self.decision_mut(decision_id)?;
        machine.handle_cancellation_failure_event()?;
        Ok(machine.is_done())
    }

    // ---- markers and search attributes ----

    pub fn record_marker(
        &mut self,
        marker_name: impl Into<String>,
        header: Option<Header>,
        details: Option<Vec<u8>>,
    ) {
        // No version-marker backfill here: the recording callers have already
        // run it before choosing to record.
        let marker = RecordMarkerDecisionAttributes {
            marker_name: marker_name.into(),
            details,
            header,
        };
        let decision = Decision {
            decision_type: DecisionType::RecordMarker,
            attributes: Some(DecisionAttributes::RecordMarkerDecisionAttributes(Box::new(
                marker,
            ))),
        };
        let decision_id = DecisionId::new(DecisionTarget::Marker, self.next_decision_event_id);
        self.add_decision(decision_id, DecisionStateMachine::marker(decision_id, decision));
    }

    pub fn upsert_search_attributes(&mut self, search_attributes: SearchAttributes) {
        let decision = Decision {
            decision_type: DecisionType::UpsertWorkflowSearchAttributes,
            attributes: Some(
                DecisionAttributes::UpsertWorkflowSearchAttributesDecisionAttributes(Box::new(
                    UpsertWorkflowSearchAttributesDecisionAttributes {
                        search_attributes: Some(search_attributes),
                    },
                )),
            ),
        };
        let decision_id =
            DecisionId::new(DecisionTarget::UpsertSearchAttributes, self.next_decision_event_id);
        self.add_decision(
            decision_id,
            DecisionStateMachine::upsert_search_attributes(decision_id, decision),
        );
    }

    // ---- workflow completion ----

    pub fn complete_workflow_execution(&mut self, result: Option<Vec<u8>>) -> TemporalResult<()> {
        self.add_all_missing_version_marker(false, None)?;

        let decision = Decision {
            decision_type: DecisionType::CompleteWorkflowExecution,
            attributes: Some(DecisionAttributes::CompleteWorkflowExecutionDecisionAttributes(
                Box::new(CompleteWorkflowExecutionDecisionAttributes { result }),
            )),
        };
        self.add_completion_decision(decision)
    }

    pub fn fail_workflow_execution(
        &mut self,
        reason: impl Into<String>,
        details: Option<Vec<u8>>,
    ) -> TemporalResult<()> {
        self.add_all_missing_version_marker(false, None)?;

        let decision = Decision {
            decision_type: DecisionType::FailWorkflowExecution,
            attributes: Some(DecisionAttributes::FailWorkflowExecutionDecisionAttributes(
                Box::new(FailWorkflowExecutionDecisionAttributes {
                    reason: Some(reason.into()),
                    details,
                }),
            )),
        };
        self.add_completion_decision(decision)
    }

    pub fn cancel_workflow_execution(&mut self, details: Option<Vec<u8>>) -> TemporalResult<()> {
        self.add_all_missing_version_marker(false, None)?;

        let decision = Decision {
            decision_type: DecisionType::CancelWorkflowExecution,
            attributes: Some(DecisionAttributes::CancelWorkflowExecutionDecisionAttributes(
                Box::new(CancelWorkflowExecutionDecisionAttributes { details }),
            )),
        };
        self.add_completion_decision(decision)
    }

    /// Continue the workflow as a new run. Unset attributes default to the
    /// values of the WorkflowExecutionStarted event of the current run.
    pub fn continue_as_new_workflow_execution(
        &mut self,
        mut attributes: ContinueAsNewWorkflowExecutionDecisionAttributes,
    ) -> TemporalResult<()> {
        self.add_all_missing_version_marker(false, None)?;

        let first_event = self
            .task
            .history
            .as_ref()
            .and_then(|history| history.events.first())
            .ok_or_else(|| {
                TemporalError::IllegalState("decision task history is empty".to_string())
            })?;
        let started = match &first_event.attributes {
            Some(EventAttributes::WorkflowExecutionStartedEventAttributes(started)) => {
                started.as_ref().clone()
            }
            _ => {
                return Err(TemporalError::IllegalState(format!(
                    "the first history event is not WorkflowExecutionStarted: {:?}",
                    first_event.event_type
                )))
            }
        };

        if attributes.workflow_type.is_none() {
            attributes.workflow_type = self.task.workflow_type.clone();
        }
        if attributes.task_list.is_none() {
            attributes.task_list = started.task_list.clone();
        }
        if attributes.execution_start_to_close_timeout_seconds.is_none() {
            attributes.execution_start_to_close_timeout_seconds =
                Some(started.execution_start_to_close_timeout_seconds);
        }
        if attributes.task_start_to_close_timeout_seconds.is_none() {
            attributes.task_start_to_close_timeout_seconds =
                Some(started.task_start_to_close_timeout_seconds);
        }

        let decision = Decision {
            decision_type: DecisionType::ContinueAsNewWorkflowExecution,
            attributes: Some(
                DecisionAttributes::ContinueAsNewWorkflowExecutionDecisionAttributes(Box::new(
                    attributes,
                )),
            ),
        };
        self.add_completion_decision(decision)
    }

    /// Strongly-consistent query processing for an already completed
    /// workflow: the close event must match the registered completion
    /// decision, after which nothing remains outstanding.
    pub fn handle_workflow_execution_completed(
        &mut self,
        _event: &HistoryEvent,
    ) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::SelfWorkflow, 0);
        let machine = self.decision_mut(decision_id)?;
        if !matches!(machine, DecisionStateMachine::CompleteWorkflow(_)) {
            return Err(TemporalError::IllegalState(format!(
                "unexpected decision registered at {decision_id}"
            )));
        }
        self.decisions.clear();
        Ok(())
    }

    // ---- batch assembly ----

    /// Render the outgoing decision batch in collection order.
    ///
    /// When the batch exceeds the cap and the decision at the cap boundary is
    /// not a workflow-closing one, the tail is cut at cap - 1 and a zero-delay
    /// timer is appended to force an immediate follow-up task; the dropped
    /// decisions are re-rendered on the next round. Workflow completion is
    /// never deferred this way.
    pub fn get_decisions(&self) -> Vec<Decision> {
        let mut result: Vec<Decision> = self
            .decisions
            .values()
            .filter_map(|machine| machine.get_decision())
            .collect();

        if result.len() > MAXIMUM_DECISIONS_PER_COMPLETION
            && !is_completion_decision(&result[MAXIMUM_DECISIONS_PER_COMPLETION - 1])
        {
            result.truncate(MAXIMUM_DECISIONS_PER_COMPLETION - 1);
            result.push(force_immediate_decision_timer());
        }

        result
    }

    /// Notify exactly the machines whose decisions were included in the batch
    /// assembled by `get_decisions` that the batch was transmitted.
    pub fn notify_decision_sent(&mut self) {
        let rendering: Vec<DecisionId> = self
            .decisions
            .values()
            .filter(|machine| machine.get_decision().is_some())
            .map(|machine| machine.id())
            .collect();

        let mut sent = rendering.len();
        if rendering.len() > MAXIMUM_DECISIONS_PER_COMPLETION {
            let boundary_is_completion = self
                .decisions
                .get(&rendering[MAXIMUM_DECISIONS_PER_COMPLETION - 1])
                .and_then(|machine| machine.get_decision())
                .map(|decision| is_completion_decision(&decision))
                .unwrap_or(false);
            if !boundary_is_completion {
                // The decision at the boundary was replaced by the forced
                // timer, so its machine was not actually sent.
                sent = MAXIMUM_DECISIONS_PER_COMPLETION - 1;
            }
        }

        for decision_id in rendering.into_iter().take(sent) {
            if let Some(machine) = self.decisions.get_mut(&decision_id) {
                machine.handle_decision_task_started_event();
            }
        }
    }

    // ---- version markers ----

    /// Re-insert version markers recorded by earlier code that the current
    /// code no longer emits, keeping the counter aligned with history.
    ///
    /// Must run before every decision insertion; each iteration consumes
    /// exactly one counter advance, so the loop terminates. When the next
    /// decision the caller is about to add is itself a version marker,
    /// `is_next_decision_version_marker` is true and `change_id_matches`
    /// decides whether the recorded marker belongs to that same change.
    pub fn add_all_missing_version_marker(
        &mut self,
        is_next_decision_version_marker: bool,
        change_id_matches: Option<&dyn Fn(&MarkerRecordedEventAttributes) -> bool>,
    ) -> TemporalResult<()> {
        while self.add_missing_version_marker(is_next_decision_version_marker, change_id_matches)? {
        }
        Ok(())
    }

    fn add_missing_version_marker(
        &mut self,
        is_next_decision_version_marker: bool,
        change_id_matches: Option<&dyn Fn(&MarkerRecordedEventAttributes) -> bool>,
    ) -> TemporalResult<bool> {
        let recorded = {
            let Some(event) = self.get_optional_decision_event(self.next_decision_event_id) else {
                return Ok(false);
            };
            if event.event_type != EventType::MarkerRecorded {
                return Ok(false);
            }
            let attributes = event_attributes!(event, MarkerRecordedEventAttributes)?;
            if attributes.marker_name != VERSION_MARKER_NAME {
                return Ok(false);
            }
            // The next decision is for a version marker and the recorded
            // event belongs to the same change: nothing is missing.
            if is_next_decision_version_marker
                && change_id_matches.map(|matches| matches(attributes)).unwrap_or(true)
            {
                return Ok(false);
            }
            attributes.clone()
        };

        let marker = Decision {
            decision_type: DecisionType::RecordMarker,
            attributes: Some(DecisionAttributes::RecordMarkerDecisionAttributes(Box::new(
                RecordMarkerDecisionAttributes {
                    marker_name: VERSION_MARKER_NAME.to_string(),
                    details: recorded.details,
                    header: recorded.header,
                },
            ))),
        };
        let decision_id = DecisionId::new(DecisionTarget::Marker, self.next_decision_event_id);
        self.decisions
            .insert(decision_id, DecisionStateMachine::marker(decision_id, marker));
        self.next_decision_event_id += 1;
        Ok(true)
    }

    // ---- internals ----

    fn add_decision(&mut self, decision_id: DecisionId, machine: DecisionStateMachine) {
        self.decisions.insert(decision_id, machine);
        self.next_decision_event_id += 1;
    }

    fn add_completion_decision(&mut self, decision: Decision) -> TemporalResult<()> {
        let decision_id = DecisionId::new(DecisionTarget::SelfWorkflow, 0);
        if let Some(existing) = self.decisions.get(&decision_id) {
            if !existing.is_done() {
                return Err(TemporalError::IllegalState(format!(
                    "an unresolved workflow completion decision already exists: {:?}",
                    existing.get_decision().map(|d| d.decision_type)
                )));
            }
        }
        self.add_decision(
            decision_id,
            DecisionStateMachine::complete_workflow(decision_id, decision),
        );
        Ok(())
    }

    /// Look up the machine registered for `decision_id`.
    ///
    /// A miss is the chief detector of divergence between the workflow code
    /// and recorded history and is always fatal to the attempt. A successful
    /// lookup moves the entry to the end of iteration order; this
    /// access-order behavior shifts which machines fall inside the
    /// `notify_decision_sent` window on partial-batch flushes and is kept
    /// deliberately.
    fn decision_mut(
        &mut self,
        decision_id: DecisionId,
    ) -> TemporalResult<&mut DecisionStateMachine> {
        let Some(index) = self.decisions.get_index_of(&decision_id) else {
            return Err(NonDeterministicError::new(format!(
                "unknown decision {decision_id}. {NON_DETERMINISTIC_MESSAGE}"
            ))
            .into());
        };
        let last = self.decisions.len() - 1;
        self.decisions.move_index(index, last);
        match self.decisions.get_index_mut(last) {
            Some((_, machine)) => Ok(machine),
            None => Err(TemporalError::IllegalState(format!(
                "decision collection inconsistent for {decision_id}"
            ))),
        }
    }
}

fn is_completion_decision(decision: &Decision) -> bool {
    matches!(
        decision.decision_type,
        DecisionType::CompleteWorkflowExecution
            | DecisionType::FailWorkflowExecution
            | DecisionType::CancelWorkflowExecution
            | DecisionType::ContinueAsNewWorkflowExecution
    )
}

fn force_immediate_decision_timer() -> Decision {
    Decision {
        decision_type: DecisionType::StartTimer,
        attributes: Some(DecisionAttributes::StartTimerDecisionAttributes(Box::new(
            StartTimerDecisionAttributes {
                timer_id: FORCE_IMMEDIATE_DECISION_TIMER.to_string(),
                start_to_fire_timeout_seconds: 0,
            },
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::DecisionState;
    use temporal_core::is_non_deterministic_error;
    use temporal_proto::shared::{
        ActivityTaskCancelRequestedEventAttributes, TimerStartedEventAttributes,
    };

    fn helper() -> DecisionsHelper {
        DecisionsHelper::new(PollForDecisionTaskResponse::default())
    }

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

    fn event(event_id: i64, event_type: EventType, attributes: Option<EventAttributes>) -> HistoryEvent {
        HistoryEvent {
            event_id,
            timestamp: 0,
            event_type,
            version: 0,
            task_id: 0,
            attributes,
        }
    }

    fn timer_started_event(event_id: i64, timer_id: &str) -> HistoryEvent {
        event(
            event_id,
            EventType::TimerStarted,
            Some(EventAttributes::TimerStartedEventAttributes(Box::new(
                TimerStartedEventAttributes {
                    timer_id: timer_id.to_string(),
                    start_to_fire_timeout_seconds: 60,
                    decision_task_completed_event_id: 0,
                },
            ))),
        )
    }

    fn version_marker_event(event_id: i64) -> HistoryEvent {
        event(
            event_id,
            EventType::MarkerRecorded,
            Some(EventAttributes::MarkerRecordedEventAttributes(Box::new(
                MarkerRecordedEventAttributes {
                    marker_name: VERSION_MARKER_NAME.to_string(),
                    details: Some(b"{}".to_vec()),
                    decision_task_completed_event_id: 0,
                    header: None,
                },
            ))),
        )
    }

    #[test]
    fn test_counter_advances_by_one_per_decision() {
        let mut helper = helper();

        assert_eq!(helper.schedule_activity_task(schedule_attributes("a1")).unwrap(), 0);
        assert_eq!(helper.start_timer(timer_attributes("t1")).unwrap(), 1);
        helper.record_marker("side-effect", None, None);
        assert_eq!(helper.get_next_decision_event_id(), 3);
        assert_eq!(helper.start_timer(timer_attributes("t2")).unwrap(), 3);
        assert_eq!(helper.get_next_decision_event_id(), 4);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let run = || {
            let mut helper = helper();
            helper.schedule_activity_task(schedule_attributes("a1")).unwrap();
            helper.start_timer(timer_attributes("t1")).unwrap();
            helper.record_marker("side-effect", None, Some(b"v".to_vec()));
            helper.complete_workflow_execution(Some(b"done".to_vec())).unwrap();
            helper.get_decisions()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_lookup_miss_is_fatal_and_leaves_collection_unchanged() {
        let mut helper = helper();
        helper.start_timer(timer_attributes("t1")).unwrap();

        let before: Vec<DecisionId> = helper.decisions.keys().copied().collect();
        let err = helper
            .handle_timer_started(&timer_started_event(42, "missing"))
            .unwrap_err();
        assert!(is_non_deterministic_error(&err));
        let after: Vec<DecisionId> = helper.decisions.keys().copied().collect();
        assert_eq!(before, after);
        assert_eq!(helper.get_next_decision_event_id(), 1);
    }

    #[test]
    fn test_cancel_created_short_circuits_without_consuming_event_id() {
        let mut helper = helper();
        let started_event_id = helper.start_timer(timer_attributes("t1")).unwrap();
        let counter_before = helper.get_next_decision_event_id();

        let mut invoked = false;
        let mut callback = || invoked = true;
        let done = helper.cancel_timer(started_event_id, Some(&mut callback)).unwrap();

        assert!(done);
        assert!(invoked);
        assert_eq!(helper.get_next_decision_event_id(), counter_before);
        assert!(helper.get_decisions().is_empty());
    }

    #[test]
    fn test_cancel_initiated_consumes_event_id_without_callback() {
        let mut helper = helper();
        let started_event_id = helper.start_timer(timer_attributes("t1")).unwrap();
        helper.notify_decision_sent();
        helper
            .handle_timer_started(&timer_started_event(started_event_id, "t1"))
            .unwrap();
        let counter_before = helper.get_next_decision_event_id();

        let mut invoked = false;
        let mut callback = || invoked = true;
        helper.cancel_timer(started_event_id, Some(&mut callback)).unwrap();

        assert!(!invoked);
        assert_eq!(helper.get_next_decision_event_id(), counter_before + 1);
        let decisions = helper.get_decisions();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].decision_type, DecisionType::CancelTimer);
    }

    #[test]
    fn test_activity_id_resolution_survives_intervening_decisions() {
        let mut helper = helper();
        let scheduled_event_id =
            helper.schedule_activity_task(schedule_attributes("A1")).unwrap();
        helper.start_timer(timer_attributes("t1")).unwrap();
        helper.schedule_activity_task(schedule_attributes("A2")).unwrap();

        assert_eq!(
            helper.activity_scheduled_event_id("A1").unwrap(),
            scheduled_event_id
        );

        // Drive A1 to a state where a cancel-requested event is acceptable
        // and resolve it through the string id.
        helper.notify_decision_sent();
        helper
            .handle_activity_task_scheduled(&event(
                scheduled_event_id,
                EventType::ActivityTaskScheduled,
                None,
            ))
            .unwrap();
        helper
            .request_cancel_activity_task(scheduled_event_id, None)
            .unwrap();
        helper.notify_decision_sent();

        let cancel_requested = event(
            10,
            EventType::ActivityTaskCancelRequested,
            Some(EventAttributes::ActivityTaskCancelRequestedEventAttributes(Box::new(
                ActivityTaskCancelRequestedEventAttributes {
                    activity_id: "A1".to_string(),
                    decision_task_completed_event_id: 9,
                },
            ))),
        );
        assert!(!helper.handle_activity_task_cancel_requested(&cancel_requested).unwrap());
    }

    #[test]
    fn test_version_marker_backfill_inserts_exactly_missing_markers() {
        let mut helper = helper();
        let events = DecisionEvents::new(
            vec![
                version_marker_event(0),
                version_marker_event(1),
                timer_started_event(2, "t1"),
            ],
            true,
            0,
            0,
        );
        helper.handle_decision_task_started_event(events);

        let started_event_id = helper.start_timer(timer_attributes("t1")).unwrap();

        assert_eq!(started_event_id, 2);
        assert_eq!(helper.get_next_decision_event_id(), 3);
        let decisions = helper.get_decisions();
        assert_eq!(decisions.len(), 3);
        assert_eq!(decisions[0].decision_type, DecisionType::RecordMarker);
        assert_eq!(decisions[1].decision_type, DecisionType::RecordMarker);
        assert_eq!(decisions[2].decision_type, DecisionType::StartTimer);
    }

    #[test]
    fn test_backfill_ignores_non_version_markers() {
        let mut helper = helper();
        let mut marker = version_marker_event(0);
        if let Some(EventAttributes::MarkerRecordedEventAttributes(attributes)) =
            &mut marker.attributes
        {
            attributes.marker_name = "SideEffect".to_string();
        }
        let events = DecisionEvents::new(vec![marker], true, 0, 0);
        helper.handle_decision_task_started_event(events);

        let started_event_id = helper.start_timer(timer_attributes("t1")).unwrap();
        assert_eq!(started_event_id, 0);
        assert_eq!(helper.get_decisions().len(), 1);
    }

    #[test]
    fn test_successful_lookup_moves_entry_to_end() {
        let mut helper = helper();
        let first = helper.start_timer(timer_attributes("t1")).unwrap();
        helper.start_timer(timer_attributes("t2")).unwrap();

        helper
            .decision_mut(DecisionId::new(DecisionTarget::Timer, first))
            .unwrap();

        let order: Vec<i64> = helper.decisions.keys().map(|id| id.event_id).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_second_unresolved_completion_decision_is_rejected() {
        let mut helper = helper();
        helper.complete_workflow_execution(None).unwrap();
        let err = helper.fail_workflow_execution("boom", None).unwrap_err();
        assert!(matches!(err, TemporalError::IllegalState(_)));
        assert_eq!(helper.get_decisions().len(), 1);
    }

    #[test]
    fn test_batch_cap_appends_forced_decision_timer() {
        let mut helper = helper();
        for i in 0..=MAXIMUM_DECISIONS_PER_COMPLETION {
            helper.start_timer(timer_attributes(&format!("t{i}"))).unwrap();
        }

        let decisions = helper.get_decisions();
        assert_eq!(decisions.len(), MAXIMUM_DECISIONS_PER_COMPLETION);
        let last = &decisions[MAXIMUM_DECISIONS_PER_COMPLETION - 1];
        assert_eq!(last.decision_type, DecisionType::StartTimer);
        match &last.attributes {
            Some(DecisionAttributes::StartTimerDecisionAttributes(attributes)) => {
                assert_eq!(attributes.timer_id, FORCE_IMMEDIATE_DECISION_TIMER);
                assert_eq!(attributes.start_to_fire_timeout_seconds, 0);
            }
            other => panic!("unexpected attributes: {other:?}"),
        }
    }

    #[test]
    fn test_batch_cap_never_defers_workflow_completion() {
        let mut helper = helper();
        for i in 0..MAXIMUM_DECISIONS_PER_COMPLETION - 1 {
            helper.start_timer(timer_attributes(&format!("t{i}"))).unwrap();
        }
        helper.complete_workflow_execution(None).unwrap();
        helper.start_timer(timer_attributes("late")).unwrap();

        let decisions = helper.get_decisions();
        assert_eq!(decisions.len(), MAXIMUM_DECISIONS_PER_COMPLETION + 1);
        assert_eq!(
            decisions[MAXIMUM_DECISIONS_PER_COMPLETION - 1].decision_type,
            DecisionType::CompleteWorkflowExecution
        );
    }

    #[test]
    fn test_notify_mirrors_truncated_batch() {
        let mut helper = helper();
        for i in 0..=MAXIMUM_DECISIONS_PER_COMPLETION {
            helper.start_timer(timer_attributes(&format!("t{i}"))).unwrap();
        }

        helper.notify_decision_sent();

        let states: Vec<DecisionState> =
            helper.decisions.values().map(|machine| machine.state()).collect();
        let sent = states
            .iter()
            .filter(|state| **state == DecisionState::DecisionSent)
            .count();
        assert_eq!(sent, MAXIMUM_DECISIONS_PER_COMPLETION - 1);
        // The machine whose decision was replaced by the forced timer and the
        // one past the cap both remain unsent.
        assert_eq!(states[MAXIMUM_DECISIONS_PER_COMPLETION - 1], DecisionState::Created);
        assert_eq!(states[MAXIMUM_DECISIONS_PER_COMPLETION], DecisionState::Created);
    }

    #[test]
    fn test_workflow_execution_completed_clears_collection() {
        let mut helper = helper();
        helper.complete_workflow_execution(None).unwrap();
        helper
            .handle_workflow_execution_completed(&event(
                20,
                EventType::WorkflowExecutionCompleted,
                None,
            ))
            .unwrap();
        assert!(helper.get_decisions().is_empty());
    }
}
