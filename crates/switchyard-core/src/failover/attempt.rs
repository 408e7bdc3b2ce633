//! Ordered try-next-on-failure loop shared by endpoint probing and uploads.

use std::{future::Future, time::Duration};

/// How [`attempt_in_order`] reacts to a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    /// Fixed pause before moving to the next candidate.
    pub delay: Duration,
    /// When false the first failure ends the pass.
    pub continue_on_failure: bool,
}

impl AttemptPolicy {
    #[must_use]
    pub fn failover(delay: Duration) -> Self {
        Self { delay, continue_on_failure: true }
    }

    #[must_use]
    pub fn single_shot() -> Self {
        Self { delay: Duration::ZERO, continue_on_failure: false }
    }
}

/// Result of an ordered pass.
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    Succeeded {
        /// Position of the winning candidate in the input slice.
        index: usize,
        value: T,
        attempts: usize,
    },
    Exhausted {
        attempts: usize,
        last_error: Option<E>,
    },
}

impl<T, E> AttemptOutcome<T, E> {
    #[must_use]
    pub fn attempts(&self) -> usize {
        match self {
            Self::Succeeded { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Runs `op` against each candidate in order until one succeeds.
///
/// Attempts never overlap: the next candidate is tried only after the previous
/// attempt finished and the policy delay elapsed. No delay follows the last
/// candidate.
pub async fn attempt_in_order<'a, C, T, E, F, Fut>(
    candidates: &'a [C],
    policy: AttemptPolicy,
    mut op: F,
) -> AttemptOutcome<T, E>
where
    F: FnMut(usize, &'a C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;
    let mut last_error = None;

    for (index, candidate) in candidates.iter().enumerate() {
        attempts += 1;

        match op(index, candidate).await {
            Ok(value) => return AttemptOutcome::Succeeded { index, value, attempts },
            Err(e) => {
                let has_next = index + 1 < candidates.len();
                last_error = Some(e);

                if !(has_next && policy.continue_on_failure) {
                    break;
                }

                tracing::trace!(
                    attempt = attempts,
                    delay_ms = policy.delay.as_millis(),
                    "attempt failed, moving to next candidate"
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    AttemptOutcome::Exhausted { attempts, last_error }
}
