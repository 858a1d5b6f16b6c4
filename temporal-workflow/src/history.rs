//! Replayed-history accessor.
//!
//! A `DecisionEvents` value is the window of history the server recorded for
//! one earlier decision task: the events that followed the corresponding
//! decision-task completion. The engine consults it to validate the event it
//! expects at a given id and to learn the anchor id for new decisions.

use temporal_proto::shared::HistoryEvent;

#[derive(Debug, Clone, Default)]
pub struct DecisionEvents {
    decision_events: Vec<HistoryEvent>,
    replay: bool,
    replay_current_time_milliseconds: i64,
    /// Id of the history event the next decision added in this task will
    /// correspond to. `decision_events[0]`, when present, sits at this id.
    next_decision_event_id: i64,
}

impl DecisionEvents {
    pub fn new(
        decision_events: Vec<HistoryEvent>,
        replay: bool,
        replay_current_time_milliseconds: i64,
        next_decision_event_id: i64,
    ) -> Self {
        Self {
            decision_events,
            replay,
            replay_current_time_milliseconds,
            next_decision_event_id,
        }
    }

    pub fn decision_events(&self) -> &[HistoryEvent] {
        &self.decision_events
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn replay_current_time_milliseconds(&self) -> i64 {
        self.replay_current_time_milliseconds
    }

    pub fn next_decision_event_id(&self) -> i64 {
        self.next_decision_event_id
    }

    /// The history event previously recorded at `event_id`, if the id falls
    /// inside this task's decision-event window.
    pub fn optional_decision_event(&self, event_id: i64) -> Option<&HistoryEvent> {
        let index = event_id - self.next_decision_event_id;
        if index < 0 {
            return None;
        }
        self.decision_events.get(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temporal_proto::shared::EventType;

    fn event(event_id: i64, event_type: EventType) -> HistoryEvent {
        HistoryEvent {
            event_id,
            timestamp: 0,
            event_type,
            version: 0,
            task_id: 0,
            attributes: None,
        }
    }

    #[test]
    fn test_optional_decision_event_lookup() {
        let events = DecisionEvents::new(
            vec![
                event(5, EventType::ActivityTaskScheduled),
                event(6, EventType::TimerStarted),
            ],
            true,
            0,
            5,
        );

        assert_eq!(
            events.optional_decision_event(5).map(|e| e.event_type),
            Some(EventType::ActivityTaskScheduled)
        );
        assert_eq!(
            events.optional_decision_event(6).map(|e| e.event_type),
            Some(EventType::TimerStarted)
        );
        assert!(events.optional_decision_event(4).is_none());
        assert!(events.optional_decision_event(7).is_none());
    }
}
