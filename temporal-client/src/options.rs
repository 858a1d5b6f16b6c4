//! Service client options.

use std::time::Duration;

/// Default timeout for ordinary service calls.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(1);

/// Default timeout for long-poll calls (task polling, history long polls).
/// Slightly above the server's 60s poll window times two, so the server side
/// closes the poll first.
pub const DEFAULT_RPC_LONG_POLL_TIMEOUT: Duration = Duration::from_secs(121);

/// Default timeout for query calls.
pub const DEFAULT_RPC_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// The kind of service call, as far as deadline selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Ordinary unary call
    Unary,
    /// Task long poll; always uses the full long-poll timeout
    LongPoll,
    /// History long poll; uses the long-poll timeout capped by the caller's
    /// remaining deadline
    HistoryLongPoll,
    /// Query call
    Query,
}

/// Options controlling the service stubs wrapper.
#[derive(Debug, Clone)]
pub struct ServiceStubsOptions {
    pub rpc_timeout: Duration,
    pub rpc_long_poll_timeout: Duration,
    pub rpc_query_timeout: Duration,
}

impl Default for ServiceStubsOptions {
    fn default() -> Self {
        Self {
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            rpc_long_poll_timeout: DEFAULT_RPC_LONG_POLL_TIMEOUT,
            rpc_query_timeout: DEFAULT_RPC_QUERY_TIMEOUT,
        }
    }
}

impl ServiceStubsOptions {
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    pub fn with_rpc_long_poll_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_long_poll_timeout = timeout;
        self
    }

    pub fn with_rpc_query_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_query_timeout = timeout;
        self
    }

    /// Pick the deadline for one call. `remaining` is the caller's remaining
    /// overall deadline, when it has one.
    pub fn rpc_deadline(&self, kind: CallKind, remaining: Option<Duration>) -> Duration {
        match kind {
            CallKind::Unary => remaining.unwrap_or(self.rpc_timeout),
            CallKind::LongPoll => self.rpc_long_poll_timeout,
            CallKind::HistoryLongPoll => match remaining {
                Some(remaining) => remaining.min(self.rpc_long_poll_timeout),
                None => self.rpc_long_poll_timeout,
            },
            CallKind::Query => self.rpc_query_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_uses_remaining_deadline_when_present() {
        let options = ServiceStubsOptions::default();
        assert_eq!(
            options.rpc_deadline(CallKind::Unary, None),
            DEFAULT_RPC_TIMEOUT
        );
        assert_eq!(
            options.rpc_deadline(CallKind::Unary, Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_long_poll_ignores_remaining_deadline() {
        let options = ServiceStubsOptions::default();
        assert_eq!(
            options.rpc_deadline(CallKind::LongPoll, Some(Duration::from_secs(600))),
            DEFAULT_RPC_LONG_POLL_TIMEOUT
        );
    }

    #[test]
    fn test_history_long_poll_is_capped_by_remaining_deadline() {
        let options = ServiceStubsOptions::default();
        assert_eq!(
            options.rpc_deadline(CallKind::HistoryLongPoll, None),
            DEFAULT_RPC_LONG_POLL_TIMEOUT
        );
        assert_eq!(
            options.rpc_deadline(CallKind::HistoryLongPoll, Some(Duration::from_secs(30))),
            Duration::from_secs(30)
        );
        assert_eq!(
            options.rpc_deadline(CallKind::HistoryLongPoll, Some(Duration::from_secs(600))),
            DEFAULT_RPC_LONG_POLL_TIMEOUT
        );
    }

    #[test]
    fn test_query_uses_query_timeout() {
        let options = ServiceStubsOptions::default();
        assert_eq!(
            options.rpc_deadline(CallKind::Query, None),
            DEFAULT_RPC_QUERY_TIMEOUT
        );
    }
}
