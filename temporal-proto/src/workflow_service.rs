//! Workflow service call surface.
//!
//! This module defines the request/response types and the async service trait
//! for the calls the client issues against the orchestration server. Only the
//! calls the worker and deadline policy distinguish are modeled here.

use crate::shared::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Start workflow execution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowExecutionRequest {
    pub namespace: String,
    pub workflow_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub identity: String,
    pub request_id: String,
    pub workflow_id_reuse_policy: Option<WorkflowIdReusePolicy>,
    pub retry_policy: Option<RetryPolicy>,
    pub cron_schedule: Option<String>,
    pub memo: Option<Memo>,
    pub search_attributes: Option<SearchAttributes>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowExecutionResponse {
    pub run_id: String,
}

/// Signal workflow execution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalWorkflowExecutionRequest {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub identity: String,
    pub request_id: String,
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SignalWorkflowExecutionResponse {}

/// Request cancellation of a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelWorkflowExecutionRequest {
    pub namespace: String,
    pub workflow_execution: Option<WorkflowExecution>,
    pub identity: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RequestCancelWorkflowExecutionResponse {}

/// Long-poll for the next decision task on a task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollForDecisionTaskRequest {
    pub namespace: String,
    pub task_list: Option<TaskList>,
    pub identity: String,
    pub binary_checksum: String,
}

/// A decision task delivered by the server, carrying the history window
/// since the last checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PollForDecisionTaskResponse {
    pub task_token: Vec<u8>,
    pub workflow_execution: Option<WorkflowExecution>,
    pub workflow_type: Option<WorkflowType>,
    pub previous_started_event_id: i64,
    pub started_event_id: i64,
    pub attempt: i64,
    pub history: Option<History>,
    pub next_page_token: Option<Vec<u8>>,
}

/// Complete a decision task, returning the decision batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondDecisionTaskCompletedRequest {
    pub task_token: Vec<u8>,
    pub decisions: Vec<Decision>,
    pub identity: String,
    pub binary_checksum: String,
    pub return_new_decision_task: bool,
    pub force_create_new_decision_task: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RespondDecisionTaskCompletedResponse {
    pub decision_task: Option<PollForDecisionTaskResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum DecisionTaskFailedCause {
    UnhandledDecision = 0,
    BadScheduleActivityAttributes = 1,
    BadStartTimerAttributes = 2,
    BadCompleteWorkflowExecutionAttributes = 3,
    BadContinueAsNewAttributes = 4,
    WorkflowWorkerUnhandledFailure = 5,
}

/// Fail a decision task so the server retries from the last checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondDecisionTaskFailedRequest {
    pub task_token: Vec<u8>,
    pub cause: DecisionTaskFailedCause,
    pub details: Option<Vec<u8>>,
    pub identity: String,
    pub binary_checksum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RespondDecisionTaskFailedResponse {}

/// Long-poll for the next activity task on a task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollForActivityTaskRequest {
    pub namespace: String,
    pub task_list: Option<TaskList>,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PollForActivityTaskResponse {
    pub task_token: Vec<u8>,
    pub workflow_execution: Option<WorkflowExecution>,
    pub activity_id: String,
    pub activity_type: Option<ActivityType>,
    pub input: Option<Vec<u8>>,
    pub scheduled_event_id: i64,
    pub attempt: i32,
}

/// Fetch workflow history, optionally long-polling for new events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetWorkflowExecutionHistoryRequest {
    pub namespace: String,
    pub execution: Option<WorkflowExecution>,
    pub maximum_page_size: i32,
    pub next_page_token: Option<Vec<u8>>,
    pub wait_for_new_event: bool,
    pub history_event_filter_type: HistoryEventFilterType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GetWorkflowExecutionHistoryResponse {
    pub history: Option<History>,
    pub next_page_token: Option<Vec<u8>>,
    pub archived: bool,
}

/// Query a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryWorkflowRequest {
    pub namespace: String,
    pub execution: Option<WorkflowExecution>,
    pub query_type: String,
    pub query_args: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryWorkflowResponse {
    pub query_result: Option<Vec<u8>>,
}

/// Workflow service trait implemented by transports and decorators
#[async_trait]
pub trait WorkflowService: Send + Sync {
    type Error;

    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, Self::Error>;

    async fn signal_workflow_execution(
        &self,
        request: SignalWorkflowExecutionRequest,
    ) -> Result<SignalWorkflowExecutionResponse, Self::Error>;

    async fn request_cancel_workflow_execution(
        &self,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<RequestCancelWorkflowExecutionResponse, Self::Error>;

    async fn poll_for_decision_task(
        &self,
        request: PollForDecisionTaskRequest,
    ) -> Result<PollForDecisionTaskResponse, Self::Error>;

    async fn respond_decision_task_completed(
        &self,
        request: RespondDecisionTaskCompletedRequest,
    ) -> Result<RespondDecisionTaskCompletedResponse, Self::Error>;

    async fn respond_decision_task_failed(
        &self,
        request: RespondDecisionTaskFailedRequest,
    ) -> Result<RespondDecisionTaskFailedResponse, Self::Error>;

    async fn poll_for_activity_task(
        &self,
        request: PollForActivityTaskRequest,
    ) -> Result<PollForActivityTaskResponse, Self::Error>;

    async fn get_workflow_execution_history(
        &self,
        request: GetWorkflowExecutionHistoryRequest,
    ) -> Result<GetWorkflowExecutionHistoryResponse, Self::Error>;

    async fn query_workflow(
        &self,
        request: QueryWorkflowRequest,
    ) -> Result<QueryWorkflowResponse, Self::Error>;
}
