//! Shared types used across the Temporal protocol.
//!
//! These types mirror the server's wire definitions and represent the core
//! data structures for workflow execution, history events and decisions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a workflow execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// The workflow ID (user-defined or system-generated)
    pub workflow_id: String,
    /// The run ID (unique for each run of a workflow)
    pub run_id: String,
}

impl WorkflowExecution {
    pub fn new(workflow_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
        }
    }
}

/// Workflow type information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowType {
    pub name: String,
}

/// Activity type information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    pub name: String,
}

/// Task list identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskList {
    pub name: String,
    pub kind: TaskListKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum TaskListKind {
    #[default]
    Normal = 0,
    Sticky = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum TimeoutType {
    StartToClose = 0,
    ScheduleToStart = 1,
    ScheduleToClose = 2,
    Heartbeat = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContinueAsNewInitiator {
    Decider = 0,
    Retry = 1,
    CronSchedule = 2,
}

/// Workflow ID reuse policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum WorkflowIdReusePolicy {
    #[default]
    AllowDuplicateFailedOnly = 0,
    AllowDuplicate = 1,
    RejectDuplicate = 2,
    TerminateIfRunning = 3,
}

/// Parent close policy for child workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum ParentClosePolicy {
    #[default]
    Terminate = 0,
    RequestCancel = 1,
    Abandon = 2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub initial_interval_in_seconds: i32,
    pub backoff_coefficient: f64,
    pub maximum_interval_in_seconds: i32,
    pub maximum_attempts: i32,
    pub non_retryable_error_types: Vec<String>,
    pub expiration_interval_in_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Header {
    pub fields: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Memo {
    pub fields: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchAttributes {
    pub indexed_fields: HashMap<String, Vec<u8>>,
}

/// Represents a single event in workflow history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event_id: i64,
    pub timestamp: i64,
    pub event_type: EventType,
    pub version: i64,
    pub task_id: i64,
    pub attributes: Option<EventAttributes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum EventType {
    WorkflowExecutionStarted = 0,
    WorkflowExecutionCompleted = 1,
    WorkflowExecutionFailed = 2,
    WorkflowExecutionTimedOut = 3,
    DecisionTaskScheduled = 4,
    DecisionTaskStarted = 5,
    DecisionTaskCompleted = 6,
    DecisionTaskTimedOut = 7,
    DecisionTaskFailed = 8,
    ActivityTaskScheduled = 9,
    ActivityTaskStarted = 10,
    ActivityTaskCompleted = 11,
    ActivityTaskFailed = 12,
    ActivityTaskTimedOut = 13,
    ActivityTaskCancelRequested = 14,
    RequestCancelActivityTaskFailed = 15,
    ActivityTaskCanceled = 16,
    TimerStarted = 17,
    TimerFired = 18,
    CancelTimerFailed = 19,
    TimerCanceled = 20,
    WorkflowExecutionCancelRequested = 21,
    WorkflowExecutionCanceled = 22,
    RequestCancelExternalWorkflowExecutionInitiated = 23,
    RequestCancelExternalWorkflowExecutionFailed = 24,
    ExternalWorkflowExecutionCancelRequested = 25,
    MarkerRecorded = 26,
    WorkflowExecutionSignaled = 27,
    WorkflowExecutionTerminated = 28,
    WorkflowExecutionContinuedAsNew = 29,
    StartChildWorkflowExecutionInitiated = 30,
    StartChildWorkflowExecutionFailed = 31,
    ChildWorkflowExecutionStarted = 32,
    ChildWorkflowExecutionCompleted = 33,
    ChildWorkflowExecutionFailed = 34,
    ChildWorkflowExecutionTimedOut = 35,
    ChildWorkflowExecutionCanceled = 36,
    ChildWorkflowExecutionTerminated = 37,
    SignalExternalWorkflowExecutionInitiated = 38,
    SignalExternalWorkflowExecutionFailed = 39,
    ExternalWorkflowExecutionSignaled = 40,
    UpsertWorkflowSearchAttributes = 41,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventAttributes {
    WorkflowExecutionStartedEventAttributes(Box<WorkflowExecutionStartedEventAttributes>),
    WorkflowExecutionCompletedEventAttributes(Box<WorkflowExecutionCompletedEventAttributes>),
    WorkflowExecutionFailedEventAttributes(Box<WorkflowExecutionFailedEventAttributes>),
    WorkflowExecutionTimedOutEventAttributes(Box<WorkflowExecutionTimedOutEventAttributes>),
    DecisionTaskScheduledEventAttributes(Box<DecisionTaskScheduledEventAttributes>),
    DecisionTaskStartedEventAttributes(Box<DecisionTaskStartedEventAttributes>),
    DecisionTaskCompletedEventAttributes(Box<DecisionTaskCompletedEventAttributes>),
    ActivityTaskScheduledEventAttributes(Box<ActivityTaskScheduledEventAttributes>),
    ActivityTaskStartedEventAttributes(Box<ActivityTaskStartedEventAttributes>),
    ActivityTaskCompletedEventAttributes(Box<ActivityTaskCompletedEventAttributes>),
    ActivityTaskFailedEventAttributes(Box<ActivityTaskFailedEventAttributes>),
    ActivityTaskTimedOutEventAttributes(Box<ActivityTaskTimedOutEventAttributes>),
    ActivityTaskCancelRequestedEventAttributes(Box<ActivityTaskCancelRequestedEventAttributes>),
    RequestCancelActivityTaskFailedEventAttributes(
        Box<RequestCancelActivityTaskFailedEventAttributes>,
    ),
    ActivityTaskCanceledEventAttributes(Box<ActivityTaskCanceledEventAttributes>),
    TimerStartedEventAttributes(Box<TimerStartedEventAttributes>),
    TimerFiredEventAttributes(Box<TimerFiredEventAttributes>),
    CancelTimerFailedEventAttributes(Box<CancelTimerFailedEventAttributes>),
    TimerCanceledEventAttributes(Box<TimerCanceledEventAttributes>),
    WorkflowExecutionCancelRequestedEventAttributes(
        Box<WorkflowExecutionCancelRequestedEventAttributes>,
    ),
    WorkflowExecutionCanceledEventAttributes(Box<WorkflowExecutionCanceledEventAttributes>),
    RequestCancelExternalWorkflowExecutionInitiatedEventAttributes(
        Box<RequestCancelExternalWorkflowExecutionInitiatedEventAttributes>,
    ),
    RequestCancelExternalWorkflowExecutionFailedEventAttributes(
        Box<RequestCancelExternalWorkflowExecutionFailedEventAttributes>,
    ),
    ExternalWorkflowExecutionCancelRequestedEventAttributes(
        Box<ExternalWorkflowExecutionCancelRequestedEventAttributes>,
    ),
    MarkerRecordedEventAttributes(Box<MarkerRecordedEventAttributes>),
    WorkflowExecutionSignaledEventAttributes(Box<WorkflowExecutionSignaledEventAttributes>),
    StartChildWorkflowExecutionInitiatedEventAttributes(
        Box<StartChildWorkflowExecutionInitiatedEventAttributes>,
    ),
    StartChildWorkflowExecutionFailedEventAttributes(
        Box<StartChildWorkflowExecutionFailedEventAttributes>,
    ),
    ChildWorkflowExecutionStartedEventAttributes(Box<ChildWorkflowExecutionStartedEventAttributes>),
    ChildWorkflowExecutionCompletedEventAttributes(
        Box<ChildWorkflowExecutionCompletedEventAttributes>,
    ),
    ChildWorkflowExecutionFailedEventAttributes(Box<ChildWorkflowExecutionFailedEventAttributes>),
    ChildWorkflowExecutionTimedOutEventAttributes(
        Box<ChildWorkflowExecutionTimedOutEventAttributes>,
    ),
    ChildWorkflowExecutionCanceledEventAttributes(
        Box<ChildWorkflowExecutionCanceledEventAttributes>,
    ),
    ChildWorkflowExecutionTerminatedEventAttributes(
        Box<ChildWorkflowExecutionTerminatedEventAttributes>,
    ),
    SignalExternalWorkflowExecutionInitiatedEventAttributes(
        Box<SignalExternalWorkflowExecutionInitiatedEventAttributes>,
    ),
    SignalExternalWorkflowExecutionFailedEventAttributes(
        Box<SignalExternalWorkflowExecutionFailedEventAttributes>,
    ),
    ExternalWorkflowExecutionSignaledEventAttributes(
        Box<ExternalWorkflowExecutionSignaledEventAttributes>,
    ),
    UpsertWorkflowSearchAttributesEventAttributes(
        Box<UpsertWorkflowSearchAttributesEventAttributes>,
    ),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionStartedEventAttributes {
    pub workflow_type: Option<WorkflowType>,
    pub parent_workflow_execution: Option<WorkflowExecution>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: i32,
    pub task_start_to_close_timeout_seconds: i32,
    pub identity: String,
    pub continued_execution_run_id: Option<String>,
    pub initiator: Option<ContinueAsNewInitiator>,
    pub last_completion_result: Option<Vec<u8>>,
    pub original_execution_run_id: Option<String>,
    pub first_execution_run_id: Option<String>,
    pub retry_policy: Option<RetryPolicy>,
    pub attempt: i32,
    pub cron_schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionCompletedEventAttributes {
    pub result: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionFailedEventAttributes {
    pub reason: Option<String>,
    pub details: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionTimedOutEventAttributes {
    pub timeout_type: Option<TimeoutType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskScheduledEventAttributes {
    pub task_list: Option<TaskList>,
    pub start_to_close_timeout_seconds: i32,
    pub attempt: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskStartedEventAttributes {
    pub scheduled_event_id: i64,
    pub identity: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskCompletedEventAttributes {
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub identity: String,
    pub binary_checksum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskScheduledEventAttributes {
    pub activity_id: String,
    pub activity_type: Option<ActivityType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub schedule_to_close_timeout_seconds: Option<i32>,
    pub schedule_to_start_timeout_seconds: Option<i32>,
    pub start_to_close_timeout_seconds: Option<i32>,
    pub heartbeat_timeout_seconds: Option<i32>,
    pub decision_task_completed_event_id: i64,
    pub retry_policy: Option<RetryPolicy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskStartedEventAttributes {
    pub scheduled_event_id: i64,
    pub identity: String,
    pub request_id: String,
    pub attempt: i32,
    pub last_failure_details: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCompletedEventAttributes {
    pub result: Option<Vec<u8>>,
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskFailedEventAttributes {
    pub reason: Option<String>,
    pub details: Option<Vec<u8>>,
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskTimedOutEventAttributes {
    pub details: Option<Vec<u8>>,
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub timeout_type: TimeoutType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCancelRequestedEventAttributes {
    pub activity_id: String,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelActivityTaskFailedEventAttributes {
    pub activity_id: String,
    pub cause: String,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCanceledEventAttributes {
    pub details: Option<Vec<u8>>,
    pub latest_cancel_requested_event_id: i64,
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerStartedEventAttributes {
    pub timer_id: String,
    pub start_to_fire_timeout_seconds: i64,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerFiredEventAttributes {
    pub timer_id: String,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelTimerFailedEventAttributes {
    pub timer_id: String,
    pub started_event_id: i64,
    pub cause: String,
    pub decision_task_completed_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerCanceledEventAttributes {
    pub timer_id: String,
    pub started_event_id: i64,
    pub decision_task_completed_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionCancelRequestedEventAttributes {
    pub cause: Option<String>,
    pub external_initiated_event_id: Option<i64>,
    pub external_workflow_execution: Option<WorkflowExecution>,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionCanceledEventAttributes {
    pub details: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionInitiatedEventAttributes {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub control: Option<String>,
    pub child_workflow_only: bool,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionFailedEventAttributes {
    pub cause: CancelExternalWorkflowExecutionFailedCause,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub initiated_event_id: i64,
    pub decision_task_completed_event_id: i64,
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalWorkflowExecutionCancelRequestedEventAttributes {
    pub initiated_event_id: i64,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum CancelExternalWorkflowExecutionFailedCause {
    UnknownExternalWorkflowExecution = 0,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecordedEventAttributes {
    pub marker_name: String,
    pub details: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionSignaledEventAttributes {
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartChildWorkflowExecutionInitiatedEventAttributes {
    pub namespace: String,
    pub workflow_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub parent_close_policy: Option<ParentClosePolicy>,
    pub control: Option<String>,
    pub decision_task_completed_event_id: i64,
    pub workflow_id_reuse_policy: Option<WorkflowIdReusePolicy>,
    pub retry_policy: Option<RetryPolicy>,
    pub cron_schedule: Option<String>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ChildWorkflowExecutionFailedCause {
    WorkflowAlreadyRunning = 0,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartChildWorkflowExecutionFailedEventAttributes {
    pub namespace: String,
    pub workflow_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub cause: ChildWorkflowExecutionFailedCause,
    pub control: Option<String>,
    pub initiated_event_id: i64,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionStartedEventAttributes {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub initiated_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionCompletedEventAttributes {
    pub result: Option<Vec<u8>>,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub initiated_event_id: i64,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionFailedEventAttributes {
    pub reason: Option<String>,
    pub details: Option<Vec<u8>>,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub initiated_event_id: i64,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionTimedOutEventAttributes {
    pub timeout_type: TimeoutType,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub initiated_event_id: i64,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionCanceledEventAttributes {
    pub details: Option<Vec<u8>>,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub initiated_event_id: i64,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionTerminatedEventAttributes {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub initiated_event_id: i64,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionInitiatedEventAttributes {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
    pub control: Option<String>,
    pub child_workflow_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum SignalExternalWorkflowExecutionFailedCause {
    UnknownExternalWorkflowExecution = 0,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionFailedEventAttributes {
    pub cause: SignalExternalWorkflowExecutionFailedCause,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub initiated_event_id: i64,
    pub decision_task_completed_event_id: i64,
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalWorkflowExecutionSignaledEventAttributes {
    pub initiated_event_id: i64,
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertWorkflowSearchAttributesEventAttributes {
    pub decision_task_completed_event_id: i64,
    pub search_attributes: Option<SearchAttributes>,
}

/// Decision types for decision tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum DecisionType {
    ScheduleActivityTask = 0,
    RequestCancelActivityTask = 1,
    StartTimer = 2,
    CompleteWorkflowExecution = 3,
    FailWorkflowExecution = 4,
    CancelTimer = 5,
    CancelWorkflowExecution = 6,
    RequestCancelExternalWorkflowExecution = 7,
    RecordMarker = 8,
    ContinueAsNewWorkflowExecution = 9,
    StartChildWorkflowExecution = 10,
    SignalExternalWorkflowExecution = 11,
    UpsertWorkflowSearchAttributes = 12,
}

/// One command issued by the workflow, to be recorded by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision_type: DecisionType,
    pub attributes: Option<DecisionAttributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionAttributes {
    ScheduleActivityTaskDecisionAttributes(Box<ScheduleActivityTaskDecisionAttributes>),
    RequestCancelActivityTaskDecisionAttributes(Box<RequestCancelActivityTaskDecisionAttributes>),
    StartTimerDecisionAttributes(Box<StartTimerDecisionAttributes>),
    CompleteWorkflowExecutionDecisionAttributes(Box<CompleteWorkflowExecutionDecisionAttributes>),
    FailWorkflowExecutionDecisionAttributes(Box<FailWorkflowExecutionDecisionAttributes>),
    CancelTimerDecisionAttributes(Box<CancelTimerDecisionAttributes>),
    CancelWorkflowExecutionDecisionAttributes(Box<CancelWorkflowExecutionDecisionAttributes>),
    RequestCancelExternalWorkflowExecutionDecisionAttributes(
        Box<RequestCancelExternalWorkflowExecutionDecisionAttributes>,
    ),
    RecordMarkerDecisionAttributes(Box<RecordMarkerDecisionAttributes>),
    ContinueAsNewWorkflowExecutionDecisionAttributes(
        Box<ContinueAsNewWorkflowExecutionDecisionAttributes>,
    ),
    StartChildWorkflowExecutionDecisionAttributes(
        Box<StartChildWorkflowExecutionDecisionAttributes>,
    ),
    SignalExternalWorkflowExecutionDecisionAttributes(
        Box<SignalExternalWorkflowExecutionDecisionAttributes>,
    ),
    UpsertWorkflowSearchAttributesDecisionAttributes(
        Box<UpsertWorkflowSearchAttributesDecisionAttributes>,
    ),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleActivityTaskDecisionAttributes {
    pub activity_id: String,
    pub activity_type: Option<ActivityType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub schedule_to_close_timeout_seconds: Option<i32>,
    pub schedule_to_start_timeout_seconds: Option<i32>,
    pub start_to_close_timeout_seconds: Option<i32>,
    pub heartbeat_timeout_seconds: Option<i32>,
    pub retry_policy: Option<RetryPolicy>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelActivityTaskDecisionAttributes {
    pub activity_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartTimerDecisionAttributes {
    pub timer_id: String,
    pub start_to_fire_timeout_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteWorkflowExecutionDecisionAttributes {
    pub result: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailWorkflowExecutionDecisionAttributes {
    pub reason: Option<String>,
    pub details: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelTimerDecisionAttributes {
    pub timer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelWorkflowExecutionDecisionAttributes {
    pub details: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionDecisionAttributes {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub control: Option<String>,
    pub child_workflow_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMarkerDecisionAttributes {
    pub marker_name: String,
    pub details: Option<Vec<u8>>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContinueAsNewWorkflowExecutionDecisionAttributes {
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub backoff_start_interval_in_seconds: Option<i32>,
    pub retry_policy: Option<RetryPolicy>,
    pub initiator: Option<ContinueAsNewInitiator>,
    pub failure_details: Option<Vec<u8>>,
    pub last_completion_result: Option<Vec<u8>>,
    pub cron_schedule: Option<String>,
    pub memo: Option<Memo>,
    pub search_attributes: Option<SearchAttributes>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartChildWorkflowExecutionDecisionAttributes {
    pub namespace: String,
    pub workflow_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub parent_close_policy: Option<ParentClosePolicy>,
    pub control: Option<String>,
    pub workflow_id_reuse_policy: Option<WorkflowIdReusePolicy>,
    pub retry_policy: Option<RetryPolicy>,
    pub cron_schedule: Option<String>,
    pub memo: Option<Memo>,
    pub search_attributes: Option<SearchAttributes>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionDecisionAttributes {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub control: Option<String>,
    pub child_workflow_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertWorkflowSearchAttributesDecisionAttributes {
    pub search_attributes: Option<SearchAttributes>,
}

/// History of a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct History {
    pub events: Vec<HistoryEvent>,
}

/// Event filter type for history queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum HistoryEventFilterType {
    #[default]
    AllEvent = 0,
    CloseEvent = 1,
}
