//! End-to-end decision task scenarios: replaying server history into the
//! engine and assembling the outgoing completions.

use temporal_core::is_non_deterministic_error;
use temporal_proto::shared::*;
use temporal_proto::workflow_service::PollForDecisionTaskResponse;
use temporal_worker::{complete_decision_task, ReplayDispatcher};
use temporal_workflow::{DecisionEvents, DecisionsHelper};

fn started_attributes() -> WorkflowExecutionStartedEventAttributes {
    WorkflowExecutionStartedEventAttributes {
        workflow_type: Some(WorkflowType {
            name: "order-workflow".to_string(),
        }),
        parent_workflow_execution: None,
        task_list: Some(TaskList {
            name: "orders".to_string(),
            kind: TaskListKind::Normal,
        }),
        input: None,
        execution_start_to_close_timeout_seconds: 300,
        task_start_to_close_timeout_seconds: 10,
        identity: "starter".to_string(),
        continued_execution_run_id: None,
        initiator: None,
        last_completion_result: None,
        original_execution_run_id: None,
        first_execution_run_id: None,
        retry_policy: None,
        attempt: 0,
        cron_schedule: None,
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

fn task() -> PollForDecisionTaskResponse {
    PollForDecisionTaskResponse {
        task_token: b"token".to_vec(),
        workflow_execution: Some(WorkflowExecution::new("wf-1", "run-1")),
        workflow_type: Some(WorkflowType {
            name: "order-workflow".to_string(),
        }),
        previous_started_event_id: 0,
        started_event_id: 3,
        attempt: 0,
        history: Some(History {
            events: vec![event(
                1,
                EventType::WorkflowExecutionStarted,
                Some(EventAttributes::WorkflowExecutionStartedEventAttributes(
                    Box::new(started_attributes()),
                )),
            )],
        }),
        next_page_token: None,
    }
}

fn schedule_attributes(activity_id: &str) -> ScheduleActivityTaskDecisionAttributes {
    ScheduleActivityTaskDecisionAttributes {
        activity_id: activity_id.to_string(),
        activity_type: Some(ActivityType {
            name: "charge-card".to_string(),
        }),
        task_list: None,
        input: Some(b"order-17".to_vec()),
        schedule_to_close_timeout_seconds: Some(60),
        schedule_to_start_timeout_seconds: Some(10),
        start_to_close_timeout_seconds: Some(30),
        heartbeat_timeout_seconds: None,
        retry_policy: None,
        header: None,
    }
}

fn timer_attributes(timer_id: &str) -> StartTimerDecisionAttributes {
    StartTimerDecisionAttributes {
        timer_id: timer_id.to_string(),
        start_to_fire_timeout_seconds: 30,
    }
}

/// History recorded after the first task completed: the two decisions turned
/// into events, the activity ran to completion, the timer fired.
fn second_task_events() -> Vec<HistoryEvent> {
    vec![
        event(
            5,
            EventType::ActivityTaskScheduled,
            Some(EventAttributes::ActivityTaskScheduledEventAttributes(Box::new(
                ActivityTaskScheduledEventAttributes {
                    activity_id: "a1".to_string(),
                    activity_type: None,
                    task_list: None,
                    input: None,
                    schedule_to_close_timeout_seconds: None,
                    schedule_to_start_timeout_seconds: None,
                    start_to_close_timeout_seconds: None,
                    heartbeat_timeout_seconds: None,
                    decision_task_completed_event_id: 4,
                    retry_policy: None,
                },
            ))),
        ),
        event(
            6,
            EventType::TimerStarted,
            Some(EventAttributes::TimerStartedEventAttributes(Box::new(
                TimerStartedEventAttributes {
                    timer_id: "t1".to_string(),
                    start_to_fire_timeout_seconds: 30,
                    decision_task_completed_event_id: 4,
                },
            ))),
        ),
        event(
            7,
            EventType::ActivityTaskStarted,
            Some(EventAttributes::ActivityTaskStartedEventAttributes(Box::new(
                ActivityTaskStartedEventAttributes {
                    scheduled_event_id: 5,
                    identity: "worker-1".to_string(),
                    request_id: "r1".to_string(),
                    attempt: 0,
                    last_failure_details: None,
                },
            ))),
        ),
        event(
            8,
            EventType::ActivityTaskCompleted,
            Some(EventAttributes::ActivityTaskCompletedEventAttributes(Box::new(
                ActivityTaskCompletedEventAttributes {
                    result: Some(b"charged".to_vec()),
                    scheduled_event_id: 5,
                    started_event_id: 7,
                    identity: "worker-1".to_string(),
                },
            ))),
        ),
        event(
            9,
            EventType::TimerFired,
            Some(EventAttributes::TimerFiredEventAttributes(Box::new(
                TimerFiredEventAttributes {
                    timer_id: "t1".to_string(),
                    started_event_id: 6,
                },
            ))),
        ),
    ]
}

/// Run the full two-task scenario and return both outgoing batches.
fn run_scenario() -> (Vec<Decision>, Vec<Decision>) {
    let mut helper = DecisionsHelper::new(task());
    let mut dispatcher = ReplayDispatcher::new();

    // First task: no decision events yet, workflow code issues two commands.
    helper.handle_decision_task_started_event(DecisionEvents::new(vec![], false, 0, 5));
    let scheduled_event_id = helper
        .schedule_activity_task(schedule_attributes("a1"))
        .unwrap();
    assert_eq!(scheduled_event_id, 5);
    let timer_started_event_id = helper.start_timer(timer_attributes("t1")).unwrap();
    assert_eq!(timer_started_event_id, 6);

    let first = complete_decision_task(&mut helper, "worker-1", "checksum", false);

    // Second task: the recorded outcome of those commands replays into the
    // engine, then the workflow completes.
    dispatcher
        .replay_history(&mut helper, &second_task_events())
        .unwrap();
    helper.handle_decision_task_started_event(DecisionEvents::new(vec![], false, 0, 12));
    helper
        .complete_workflow_execution(Some(b"order-done".to_vec()))
        .unwrap();

    let second = complete_decision_task(&mut helper, "worker-1", "checksum", false);

    (first.decisions, second.decisions)
}

#[test]
fn test_two_task_scenario_produces_expected_batches() {
    let (first, second) = run_scenario();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].decision_type, DecisionType::ScheduleActivityTask);
    assert_eq!(first[1].decision_type, DecisionType::StartTimer);

    assert_eq!(second.len(), 1);
    assert_eq!(second[0].decision_type, DecisionType::CompleteWorkflowExecution);
}

#[test]
fn test_replay_twice_from_scratch_is_identical() {
    assert_eq!(run_scenario(), run_scenario());
}

#[test]
fn test_unknown_scheduled_event_fails_replay() {
    let mut helper = DecisionsHelper::new(task());
    let mut dispatcher = ReplayDispatcher::new();

    // History claims an activity was scheduled, but the workflow code never
    // issued the command.
    let err = dispatcher
        .replay_history(&mut helper, &second_task_events())
        .unwrap_err();
    assert!(is_non_deterministic_error(&err));
}

#[test]
fn test_corrupted_event_fails_replay() {
    let mut helper = DecisionsHelper::new(task());
    helper.handle_decision_task_started_event(DecisionEvents::new(vec![], false, 0, 5));
    helper
        .schedule_activity_task(schedule_attributes("a1"))
        .unwrap();
    complete_decision_task(&mut helper, "worker-1", "checksum", false);

    let mut dispatcher = ReplayDispatcher::new();
    let bare = vec![event(5, EventType::ActivityTaskStarted, None)];
    let err = dispatcher.replay_history(&mut helper, &bare).unwrap_err();
    assert!(temporal_core::is_corrupted_event_error(&err));
}

#[test]
fn test_continue_as_new_defaults_from_started_event() {
    let mut helper = DecisionsHelper::new(task());
    helper.handle_decision_task_started_event(DecisionEvents::new(vec![], false, 0, 5));
    helper
        .continue_as_new_workflow_execution(
            ContinueAsNewWorkflowExecutionDecisionAttributes::default(),
        )
        .unwrap();

    let decisions = helper.get_decisions();
    assert_eq!(decisions.len(), 1);
    match &decisions[0].attributes {
        Some(DecisionAttributes::ContinueAsNewWorkflowExecutionDecisionAttributes(attributes)) => {
            assert_eq!(
                attributes.workflow_type.as_ref().map(|t| t.name.as_str()),
                Some("order-workflow")
            );
            assert_eq!(
                attributes.task_list.as_ref().map(|t| t.name.as_str()),
                Some("orders")
            );
            assert_eq!(attributes.execution_start_to_close_timeout_seconds, Some(300));
            assert_eq!(attributes.task_start_to_close_timeout_seconds, Some(10));
        }
        other => panic!("unexpected attributes: {other:?}"),
    }
}
