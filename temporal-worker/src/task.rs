//! Decision task completion assembly.

use temporal_proto::workflow_service::{
    DecisionTaskFailedCause, RespondDecisionTaskCompletedRequest, RespondDecisionTaskFailedRequest,
};
use temporal_workflow::DecisionsHelper;

/// Render the engine's decision batch into a task completion and mark the
/// batch as sent.
///
/// The send notification must mirror the assembled batch exactly, so both
/// steps happen together here.
pub fn complete_decision_task(
    helper: &mut DecisionsHelper,
    identity: impl Into<String>,
    binary_checksum: impl Into<String>,
    force_create_new_decision_task: bool,
) -> RespondDecisionTaskCompletedRequest {
    let decisions = helper.get_decisions();
    tracing::debug!(count = decisions.len(), "completing decision task");
    helper.notify_decision_sent();

    RespondDecisionTaskCompletedRequest {
        task_token: helper.task().task_token.clone(),
        decisions,
        identity: identity.into(),
        binary_checksum: binary_checksum.into(),
        return_new_decision_task: true,
        force_create_new_decision_task,
    }
}

/// Fail the decision task so the server retries from the last checkpoint.
/// Used when replay hits a non-determinism or corrupted-event error.
pub fn fail_decision_task(
    helper: &DecisionsHelper,
    cause: DecisionTaskFailedCause,
    details: Option<Vec<u8>>,
    identity: impl Into<String>,
    binary_checksum: impl Into<String>,
) -> RespondDecisionTaskFailedRequest {
    RespondDecisionTaskFailedRequest {
        task_token: helper.task().task_token.clone(),
        cause,
        details,
        identity: identity.into(),
        binary_checksum: binary_checksum.into(),
    }
}
