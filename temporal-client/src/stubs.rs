//! Workflow service stubs.
//!
//! `WorkflowServiceStubs` decorates a transport-level `WorkflowService` with
//! the client policies every call needs: a per-call deadline chosen by call
//! kind, the client-identity headers, and a graceful/immediate shutdown
//! protocol with termination await.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use temporal_core::{TemporalError, TemporalResult};
use temporal_proto::workflow_service::*;

use crate::options::{CallKind, ServiceStubsOptions};

/// Header carrying the client library version
pub const LIBRARY_VERSION_HEADER_NAME: &str = "temporal-client-version";

/// Header carrying the client feature-set version
pub const FEATURE_VERSION_HEADER_NAME: &str = "temporal-client-feature-version";

/// Header naming the client implementation
pub const CLIENT_NAME_HEADER_NAME: &str = "temporal-client-name";

pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FEATURE_VERSION: &str = "1.0.0";
pub const CLIENT_NAME: &str = "temporal-rust";

/// The identity header triple attached to every outgoing call.
pub fn client_identity_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        (LIBRARY_VERSION_HEADER_NAME, LIBRARY_VERSION),
        (FEATURE_VERSION_HEADER_NAME, FEATURE_VERSION),
        (CLIENT_NAME_HEADER_NAME, CLIENT_NAME),
    ]
}

/// Mint a unique request id for idempotent start/signal calls.
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Deadline- and lifecycle-aware wrapper around a workflow service transport.
pub struct WorkflowServiceStubs<S> {
    service: S,
    options: ServiceStubsOptions,
    shutdown_requested: AtomicBool,
    in_flight: AtomicUsize,
}

impl<S> WorkflowServiceStubs<S>
where
    S: WorkflowService<Error = TemporalError> + Send + Sync,
{
    pub fn new(service: S, options: ServiceStubsOptions) -> Self {
        Self {
            service,
            options,
            shutdown_requested: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn options(&self) -> &ServiceStubsOptions {
        &self.options
    }

    /// Stop accepting new calls; in-flight calls run to their deadlines.
    pub fn shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    /// Stop accepting new calls immediately. In-flight calls are not
    /// interrupted beyond their already-armed deadlines.
    pub fn shutdown_now(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub fn is_terminated(&self) -> bool {
        self.is_shutdown() && self.in_flight.load(Ordering::SeqCst) == 0
    }

    /// Wait until every in-flight call has drained after a shutdown, up to
    /// `timeout`. Returns the final termination status.
    pub async fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.is_terminated() {
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.is_terminated()
    }

    /// History long poll honoring the caller's remaining overall deadline.
    pub async fn get_workflow_execution_history_with_deadline(
        &self,
        request: GetWorkflowExecutionHistoryRequest,
        remaining: Option<Duration>,
    ) -> TemporalResult<GetWorkflowExecutionHistoryResponse> {
        let kind = if request.wait_for_new_event {
            CallKind::HistoryLongPoll
        } else {
            CallKind::Unary
        };
        self.call(
            kind,
            "GetWorkflowExecutionHistory",
            remaining,
            self.service.get_workflow_execution_history(request),
        )
        .await
    }

    async fn call<T>(
        &self,
        kind: CallKind,
        method: &str,
        remaining: Option<Duration>,
        future: impl Future<Output = TemporalResult<T>>,
    ) -> TemporalResult<T> {
        if self.is_shutdown() {
            return Err(TemporalError::IllegalState(format!(
                "{method} rejected: the service stubs have been shut down"
            )));
        }
        let deadline = self.options.rpc_deadline(kind, remaining);
        tracing::trace!(method, timeout_ms = deadline.as_millis() as u64, "rpc deadline");

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let result = tokio::time::timeout(deadline, future).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok(response) => response,
            Err(_) => Err(TemporalError::DeadlineExceeded(method.to_string())),
        }
    }
}

#[async_trait]
impl<S> WorkflowService for WorkflowServiceStubs<S>
where
    S: WorkflowService<Error = TemporalError> + Send + Sync,
{
    type Error = TemporalError;

    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> TemporalResult<StartWorkflowExecutionResponse> {
        self.call(
            CallKind::Unary,
            "StartWorkflowExecution",
            None,
            self.service.start_workflow_execution(request),
        )
        .await
    }

    async fn signal_workflow_execution(
        &self,
        request: SignalWorkflowExecutionRequest,
    ) -> TemporalResult<SignalWorkflowExecutionResponse> {
        self.call(
            CallKind::Unary,
            "SignalWorkflowExecution",
            None,
            self.service.signal_workflow_execution(request),
        )
        .await
    }

    async fn request_cancel_workflow_execution(
        &self,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> TemporalResult<RequestCancelWorkflowExecutionResponse> {
        self.call(
            CallKind::Unary,
            "RequestCancelWorkflowExecution",
            None,
            self.service.request_cancel_workflow_execution(request),
        )
        .await
    }

    async fn poll_for_decision_task(
        &self,
        request: PollForDecisionTaskRequest,
    ) -> TemporalResult<PollForDecisionTaskResponse> {
        self.call(
            CallKind::LongPoll,
            "PollForDecisionTask",
            None,
            self.service.poll_for_decision_task(request),
        )
        .await
    }

    async fn respond_decision_task_completed(
        &self,
        request: RespondDecisionTaskCompletedRequest,
    ) -> TemporalResult<RespondDecisionTaskCompletedResponse> {
        self.call(
            CallKind::Unary,
            "RespondDecisionTaskCompleted",
            None,
            self.service.respond_decision_task_completed(request),
        )
        .await
    }

    async fn respond_decision_task_failed(
        &self,
        request: RespondDecisionTaskFailedRequest,
    ) -> TemporalResult<RespondDecisionTaskFailedResponse> {
        self.call(
            CallKind::Unary,
            "RespondDecisionTaskFailed",
            None,
            self.service.respond_decision_task_failed(request),
        )
        .await
    }

    async fn poll_for_activity_task(
        &self,
        request: PollForActivityTaskRequest,
    ) -> TemporalResult<PollForActivityTaskResponse> {
        self.call(
            CallKind::LongPoll,
            "PollForActivityTask",
            None,
            self.service.poll_for_activity_task(request),
        )
        .await
    }

    async fn get_workflow_execution_history(
        &self,
        request: GetWorkflowExecutionHistoryRequest,
    ) -> TemporalResult<GetWorkflowExecutionHistoryResponse> {
        self.get_workflow_execution_history_with_deadline(request, None)
            .await
    }

    async fn query_workflow(
        &self,
        request: QueryWorkflowRequest,
    ) -> TemporalResult<QueryWorkflowResponse> {
        self.call(
            CallKind::Query,
            "QueryWorkflow",
            None,
            self.service.query_workflow(request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport stub whose query calls hang forever; everything else
    /// returns defaults.
    struct StubService {
        query_delay: Duration,
    }

    #[async_trait]
    impl WorkflowService for StubService {
        type Error = TemporalError;

        async fn start_workflow_execution(
            &self,
            _request: StartWorkflowExecutionRequest,
        ) -> TemporalResult<StartWorkflowExecutionResponse> {
            Ok(StartWorkflowExecutionResponse {
                run_id: "run-1".to_string(),
            })
        }

        async fn signal_workflow_execution(
            &self,
            _request: SignalWorkflowExecutionRequest,
        ) -> TemporalResult<SignalWorkflowExecutionResponse> {
            Ok(SignalWorkflowExecutionResponse::default())
        }

        async fn request_cancel_workflow_execution(
            &self,
            _request: RequestCancelWorkflowExecutionRequest,
        ) -> TemporalResult<RequestCancelWorkflowExecutionResponse> {
            Ok(RequestCancelWorkflowExecutionResponse::default())
        }

        async fn poll_for_decision_task(
            &self,
            _request: PollForDecisionTaskRequest,
        ) -> TemporalResult<PollForDecisionTaskResponse> {
            Ok(PollForDecisionTaskResponse::default())
        }

        async fn respond_decision_task_completed(
            &self,
            _request: RespondDecisionTaskCompletedRequest,
        ) -> TemporalResult<RespondDecisionTaskCompletedResponse> {
            Ok(RespondDecisionTaskCompletedResponse::default())
        }

        async fn respond_decision_task_failed(
            &self,
            _request: RespondDecisionTaskFailedRequest,
        ) -> TemporalResult<RespondDecisionTaskFailedResponse> {
            Ok(RespondDecisionTaskFailedResponse::default())
        }

        async fn poll_for_activity_task(
            &self,
            _request: PollForActivityTaskRequest,
        ) -> TemporalResult<PollForActivityTaskResponse> {
            Ok(PollForActivityTaskResponse::default())
        }

        async fn get_workflow_execution_history(
            &self,
            _request: GetWorkflowExecutionHistoryRequest,
        ) -> TemporalResult<GetWorkflowExecutionHistoryResponse> {
            Ok(GetWorkflowExecutionHistoryResponse::default())
        }

        async fn query_workflow(
            &self,
            _request: QueryWorkflowRequest,
        ) -> TemporalResult<QueryWorkflowResponse> {
            tokio::time::sleep(self.query_delay).await;
            Ok(QueryWorkflowResponse::default())
        }
    }

    fn stubs(query_delay: Duration, options: ServiceStubsOptions) -> WorkflowServiceStubs<StubService> {
        WorkflowServiceStubs::new(StubService { query_delay }, options)
    }

    #[test]
    fn test_identity_headers_triple() {
        let headers = client_identity_headers();
        assert_eq!(headers.len(), 3);
        assert!(headers.contains(&(CLIENT_NAME_HEADER_NAME, CLIENT_NAME)));
        assert!(headers.contains(&(LIBRARY_VERSION_HEADER_NAME, LIBRARY_VERSION)));
        assert!(headers.contains(&(FEATURE_VERSION_HEADER_NAME, FEATURE_VERSION)));
    }

    #[tokio::test]
    async fn test_query_call_respects_deadline() {
        let options =
            ServiceStubsOptions::default().with_rpc_query_timeout(Duration::from_millis(20));
        let stubs = stubs(Duration::from_secs(60), options);

        let err = stubs
            .query_workflow(QueryWorkflowRequest {
                namespace: "default".to_string(),
                execution: None,
                query_type: "state".to_string(),
                query_args: None,
            })
            .await
            .unwrap_err();
        assert!(temporal_core::is_deadline_exceeded_error(&err));
    }

    #[tokio::test]
    async fn test_calls_rejected_after_shutdown() {
        let stubs = stubs(Duration::from_millis(0), ServiceStubsOptions::default());
        stubs.shutdown();

        let err = stubs
            .poll_for_decision_task(PollForDecisionTaskRequest {
                namespace: "default".to_string(),
                task_list: None,
                identity: "worker-1".to_string(),
                binary_checksum: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TemporalError::IllegalState(_)));
    }

    #[tokio::test]
    async fn test_termination_after_shutdown() {
        let stubs = stubs(Duration::from_millis(0), ServiceStubsOptions::default());
        assert!(!stubs.is_terminated());

        stubs.shutdown();
        assert!(stubs.is_shutdown());
        assert!(stubs.await_termination(Duration::from_millis(100)).await);
    }
}
