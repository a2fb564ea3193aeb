//! Retry state machine and backoff schedule for gateway calls.

use std::time::Duration;

use rand::Rng;

/// Base delay, doubled per failed attempt.
pub const BACKOFF_BASE: Duration = Duration::from_millis(600);
/// Upper bound of the random component added to every delay.
pub const MAX_JITTER: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Pending,
    Attempting(u32),
    Succeeded(u32),
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self { retries }
    }

    /// Next state given the outcome of the current one. `succeeded` is only
    /// consulted while attempting; terminal states are absorbing.
    pub fn advance(&self, state: RetryState, succeeded: bool) -> RetryState {
        match state {
            RetryState::Pending => RetryState::Attempting(0),
            RetryState::Attempting(n) if succeeded => RetryState::Succeeded(n),
            RetryState::Attempting(n) if n >= self.retries => {
                RetryState::Exhausted { attempts: n + 1 }
            }
            RetryState::Attempting(n) => RetryState::Attempting(n + 1),
            terminal => terminal,
        }
    }
}

/// `BACKOFF_BASE * 2^attempt + jitter`, with jitter capped at `MAX_JITTER`.
pub fn backoff_delay(attempt: u32, jitter: Duration) -> Duration {
    BACKOFF_BASE.saturating_mul(2u32.saturating_pow(attempt)) + jitter.min(MAX_JITTER)
}

pub fn jittered_backoff(attempt: u32) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
    backoff_delay(attempt, Duration::from_millis(jitter_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_starts_at_attempt_zero() {
        let policy = RetryPolicy::new(2);
        assert_eq!(
            policy.advance(RetryState::Pending, false),
            RetryState::Attempting(0)
        );
    }

    #[test]
    fn test_failures_walk_through_budget_then_exhaust() {
        let policy = RetryPolicy::new(2);
        let mut state = policy.advance(RetryState::Pending, false);
        state = policy.advance(state, false);
        assert_eq!(state, RetryState::Attempting(1));
        state = policy.advance(state, false);
        assert_eq!(state, RetryState::Attempting(2));
        state = policy.advance(state, false);
        assert_eq!(state, RetryState::Exhausted { attempts: 3 });
        assert_eq!(policy.advance(state, true), state);
    }

    #[test]
    fn test_success_records_attempt_index() {
        let policy = RetryPolicy::new(2);
        assert_eq!(
            policy.advance(RetryState::Attempting(1), true),
            RetryState::Succeeded(1)
        );
    }

    #[test]
    fn test_zero_retries_exhausts_after_first_failure() {
        let policy = RetryPolicy::new(0);
        assert_eq!(
            policy.advance(RetryState::Attempting(0), false),
            RetryState::Exhausted { attempts: 1 }
        );
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0, Duration::ZERO), Duration::from_millis(600));
        assert_eq!(backoff_delay(1, Duration::ZERO), Duration::from_millis(1200));
        assert_eq!(backoff_delay(3, Duration::ZERO), Duration::from_millis(4800));
    }

    #[test]
    fn test_backoff_jitter_is_capped() {
        assert_eq!(
            backoff_delay(0, Duration::from_secs(5)),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_jittered_backoff_stays_in_bounds() {
        for attempt in 0..4 {
            let delay = jittered_backoff(attempt);
            let floor = backoff_delay(attempt, Duration::ZERO);
            assert!(delay >= floor && delay <= floor + MAX_JITTER, "{delay:?}");
        }
    }
}
