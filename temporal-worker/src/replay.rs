//! History replay dispatch.
//!
//! Routes each replayed history event to the decision engine handler for its
//! type, using the anchor ids carried in the event payload. Events the engine
//! does not correlate (workflow signals, cancel requests, markers) are
//! tracked here for the workflow layer.

use std::collections::HashMap;

use temporal_core::{CorruptedEventError, TemporalError, TemporalResult};
use temporal_proto::shared::{EventAttributes, EventType, HistoryEvent};
use temporal_workflow::DecisionsHelper;

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

/// Feeds replayed history into a `DecisionsHelper`, one event at a time and
/// strictly in order.
#[derive(Default)]
pub struct ReplayDispatcher {
    last_processed_event_id: i64,
    cancel_requested: bool,
    signals: HashMap<String, Vec<Vec<u8>>>,
}

impl ReplayDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a WorkflowExecutionCancelRequested event was replayed.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Signal payloads received so far, keyed by signal name.
    pub fn signals(&self) -> &HashMap<String, Vec<Vec<u8>>> {
        &self.signals
    }

    pub fn replay_history(
        &mut self,
        helper: &mut DecisionsHelper,
        events: &[HistoryEvent],
    ) -> TemporalResult<()> {
        for event in events {
            if event.event_id > self.last_processed_event_id {
                self.process_event(helper, event)?;
                self.last_processed_event_id = event.event_id;
            }
        }
        Ok(())
    }

    fn process_event(
        &mut self,
        helper: &mut DecisionsHelper,
        event: &HistoryEvent,
    ) -> TemporalResult<()> {
        tracing::debug!(
            event_id = event.event_id,
            event_type = ?event.event_type,
            "replaying event"
        );
        match event.event_type {
            EventType::ActivityTaskScheduled => helper.handle_activity_task_scheduled(event)?,
            EventType::ActivityTaskStarted => helper.handle_activity_task_started(event)?,
            EventType::ActivityTaskCompleted => {
                let attributes = event_attributes!(event, ActivityTaskCompletedEventAttributes)?;
                helper.handle_activity_task_closed(attributes.scheduled_event_id)?;
            }
            EventType::ActivityTaskFailed => {
                let attributes = event_attributes!(event, ActivityTaskFailedEventAttributes)?;
                helper.handle_activity_task_closed(attributes.scheduled_event_id)?;
            }
            EventType::ActivityTaskTimedOut => {
                let attributes = event_attributes!(event, ActivityTaskTimedOutEventAttributes)?;
                helper.handle_activity_task_closed(attributes.scheduled_event_id)?;
            }
            EventType::ActivityTaskCancelRequested => {
                helper.handle_activity_task_cancel_requested(event)?;
            }
            EventType::RequestCancelActivityTaskFailed => {
                helper.handle_request_cancel_activity_task_failed(event)?;
            }
            EventType::ActivityTaskCanceled => {
                helper.handle_activity_task_canceled(event)?;
            }
            EventType::TimerStarted => helper.handle_timer_started(event)?,
            EventType::TimerFired => {
                helper.handle_timer_fired(event)?;
            }
            EventType::TimerCanceled => {
                helper.handle_timer_canceled(event)?;
            }
            EventType::CancelTimerFailed => {
                helper.handle_cancel_timer_failed(event)?;
            }
            EventType::StartChildWorkflowExecutionInitiated => {
                helper.handle_start_child_workflow_execution_initiated(event)?;
            }
            EventType::StartChildWorkflowExecutionFailed => {
                helper.handle_start_child_workflow_execution_failed(event)?;
            }
            EventType::ChildWorkflowExecutionStarted => {
                helper.handle_child_workflow_execution_started(event)?;
            }
            EventType::ChildWorkflowExecutionCompleted => {
                let attributes =
                    event_attributes!(event, ChildWorkflowExecutionCompletedEventAttributes)?;
                helper.handle_child_workflow_execution_closed(attributes.initiated_event_id)?;
            }
            EventType::ChildWorkflowExecutionFailed => {
                let attributes =
                    event_attributes!(event, ChildWorkflowExecutionFailedEventAttributes)?;
                helper.handle_child_workflow_execution_closed(attributes.initiated_event_id)?;
            }
            EventType::ChildWorkflowExecutionTimedOut => {
                let attributes =
                    event_attributes!(event, ChildWorkflowExecutionTimedOutEventAttributes)?;
                helper.handle_child_workflow_execution_closed(attributes.initiated_event_id)?;
            }
            EventType::ChildWorkflowExecutionTerminated => {
                let attributes =
                    event_attributes!(event, ChildWorkflowExecutionTerminatedEventAttributes)?;
                helper.handle_child_workflow_execution_closed(attributes.initiated_event_id)?;
            }
            EventType::ChildWorkflowExecutionCanceled => {
                helper.handle_child_workflow_execution_canceled(event)?;
            }
            EventType::SignalExternalWorkflowExecutionInitiated => {
                helper.handle_signal_external_workflow_execution_initiated(event)?;
            }
            EventType::ExternalWorkflowExecutionSignaled => {
                helper.handle_external_workflow_execution_signaled(event)?;
            }
            EventType::SignalExternalWorkflowExecutionFailed => {
                helper.handle_signal_external_workflow_execution_failed(event)?;
            }
            EventType::RequestCancelExternalWorkflowExecutionInitiated => {
                helper.handle_request_cancel_external_workflow_execution_initiated(event)?;
            }
            EventType::ExternalWorkflowExecutionCancelRequested => {
                helper.handle_external_workflow_execution_cancel_requested(event)?;
            }
            EventType::RequestCancelExternalWorkflowExecutionFailed => {
                helper.handle_request_cancel_external_workflow_execution_failed(event)?;
            }
            EventType::WorkflowExecutionSignaled => {
                let attributes =
                    event_attributes!(event, WorkflowExecutionSignaledEventAttributes)?;
                self.signals
                    .entry(attributes.signal_name.clone())
                    .or_default()
                    .push(attributes.input.clone().unwrap_or_default());
            }
            EventType::WorkflowExecutionCancelRequested => {
                self.cancel_requested = true;
            }
            // Markers are consumed by the version/side-effect layer, and the
            // remaining event types carry no decision to correlate.
            _ => {}
        }
        Ok(())
    }
}
