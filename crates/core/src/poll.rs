//! Bounded polling against an external task API.
//!
//! [`poll_until`] fetches a status snapshot, classifies it, and either
//! stops on a terminal step or sleeps for a jittered interval and tries
//! again, up to a fixed attempt ceiling. It is shared by the seed-image
//! wait, the text-to-image endpoint and the studio client.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Interval, jitter and attempt ceiling for one poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Base delay between attempts.
    pub interval: Duration,
    /// Upper bound (exclusive) of the random delay added to `interval`.
    pub jitter: Duration,
    /// Maximum number of status fetches before giving up.
    pub max_attempts: u32,
}

impl PollConfig {
    /// Server-side waits: 5s + up to 0.8s, 36 attempts (about three minutes).
    pub const fn server() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            jitter: Duration::from_millis(800),
            max_attempts: 36,
        }
    }

    /// Client-side waits: 4s + up to 0.8s, 60 attempts (about four and a
    /// half minutes).
    pub const fn client() -> Self {
        Self {
            interval: Duration::from_millis(4000),
            jitter: Duration::from_millis(800),
            max_attempts: 60,
        }
    }

    /// No delay between attempts.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            interval: Duration::ZERO,
            jitter: Duration::ZERO,
            max_attempts,
        }
    }

    /// Delay before the next attempt: `interval` plus uniform jitter.
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        self.interval + Duration::from_millis(rand::rng().random_range(0..jitter_ms))
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::server()
    }
}

/// What a classifier decided about one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// Not terminal yet.
    Continue,
    /// Terminal success carrying the extracted value.
    Success(T),
    /// Terminal failure with a short reason (usually the provider status).
    Failure(String),
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Failed { reason: String, attempts: u32 },
    /// The attempt ceiling was reached without a terminal step.
    TimedOut { attempts: u32 },
}

impl<T> PollOutcome<T> {
    /// Number of fetches the loop performed.
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Succeeded { attempts, .. }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::TimedOut { attempts } => *attempts,
        }
    }
}

/// Poll until `classify` reports a terminal step or the attempts run out.
///
/// `fetch` receives the 1-based attempt number. A fetch error ends the loop
/// immediately and is returned as-is; it is never retried here. There is no
/// sleep after the final attempt.
pub async fn poll_until<S, T, E, F, Fut, C>(
    config: &PollConfig,
    mut fetch: F,
    mut classify: C,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<S, E>>,
    C: FnMut(&S) -> PollStep<T>,
{
    for attempt in 1..=config.max_attempts {
        let snapshot = fetch(attempt).await?;

        match classify(&snapshot) {
            PollStep::Success(value) => {
                return Ok(PollOutcome::Succeeded {
                    value,
                    attempts: attempt,
                });
            }
            PollStep::Failure(reason) => {
                return Ok(PollOutcome::Failed {
                    reason,
                    attempts: attempt,
                });
            }
            PollStep::Continue => {
                tracing::debug!(attempt, max_attempts = config.max_attempts, "Task not finished");
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.next_delay()).await;
                }
            }
        }
    }

    Ok(PollOutcome::TimedOut {
        attempts: config.max_attempts,
    })
}
