use arc_swap::ArcSwap;
use futures::{
    future::join_all,
    stream::{FuturesUnordered, StreamExt},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::Mutex;

use super::{
    attempt::{attempt_in_order, AttemptOutcome, AttemptPolicy},
    candidate::Candidate,
    errors::SelectionError,
    probe::{EndpointProbe, ProbeResult},
    selector::{first_by_priority, select, SelectionPolicy},
};
use crate::store::SelectionCache;

/// How a pass spreads probes over the ordered candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeStrategy {
    /// One candidate at a time in selector order, with the failover delay between them.
    #[default]
    Sequential,
    /// All candidates at once; the best-ranked reachable one wins.
    Parallel,
    /// All candidates at once; the first reachable completion wins and the rest are dropped.
    Race,
}

/// Tunables for [`FailoverOrchestrator`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub policy: SelectionPolicy,
    pub strategy: ProbeStrategy,
    pub probe_timeout: Duration,
    /// Pause between sequential attempts.
    pub failover_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::Priority,
            strategy: ProbeStrategy::Sequential,
            probe_timeout: Duration::from_millis(3000),
            failover_delay: Duration::ZERO,
        }
    }
}

/// Pass state, `Idle -> Checking(i) -> {Success(i) | Checking(i+1)} -> Committed | Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverState {
    Idle,
    Checking(usize),
    Success(usize),
    Committed,
    Exhausted,
}

impl fmt::Display for FailoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Checking(i) => write!(f, "checking({i})"),
            Self::Success(i) => write!(f, "success({i})"),
            Self::Committed => f.write_str("committed"),
            Self::Exhausted => f.write_str("exhausted"),
        }
    }
}

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A still-valid cached selection; no probes ran.
    Cached,
    /// A probe pass found a reachable candidate and committed it.
    Probed,
    /// Every probe failed; best-effort default, not cached.
    Fallback,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => f.write_str("cached"),
            Self::Probed => f.write_str("probed"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub url: String,
    pub source: ResolutionSource,
    /// Probe calls made during this pass.
    pub attempts: usize,
}

impl Resolution {
    #[must_use]
    pub fn final_state(&self) -> FailoverState {
        match self.source {
            ResolutionSource::Cached | ResolutionSource::Probed => FailoverState::Committed,
            ResolutionSource::Fallback => FailoverState::Exhausted,
        }
    }
}

/// Picks a reachable candidate, caching the winner for later passes.
///
/// Passes are serialized per orchestrator: a caller arriving while a pass is
/// running waits for it and then takes the cached result, so at most one
/// commit happens per pass.
///
/// # Lock-Free Candidate Access
///
/// The candidate list lives in an `ArcSwap` so it can be replaced at runtime
/// without blocking readers.
pub struct FailoverOrchestrator {
    candidates: ArcSwap<Vec<Candidate>>,
    probe: Arc<dyn EndpointProbe>,
    cache: SelectionCache,
    config: OrchestratorConfig,
    pass_lock: Mutex<()>,
}

impl FailoverOrchestrator {
    #[must_use]
    pub fn new(
        candidates: Vec<Candidate>,
        probe: Arc<dyn EndpointProbe>,
        cache: SelectionCache,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            candidates: ArcSwap::from_pointee(candidates),
            probe,
            cache,
            config,
            pass_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &SelectionCache {
        &self.cache
    }

    #[must_use]
    pub fn candidates(&self) -> Arc<Vec<Candidate>> {
        self.candidates.load_full()
    }

    /// Replaces the candidate list. A cached selection that is no longer an
    /// enabled candidate is ignored on the next pass.
    pub fn update_candidates(&self, candidates: Vec<Candidate>) {
        tracing::info!(candidates = candidates.len(), "failover candidates updated");
        self.candidates.store(Arc::new(candidates));
    }

    /// Drops the cached selection so the next pass probes again.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Resolves the endpoint to use.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::EmptyCandidateSet`] if no candidate is enabled.
    /// Probe failures are never returned; exhaustion yields a
    /// [`ResolutionSource::Fallback`] resolution instead.
    pub async fn resolve(&self) -> Result<Resolution, SelectionError> {
        if let Some(resolution) = self.cached_resolution() {
            return Ok(resolution);
        }

        let _pass = self.pass_lock.lock().await;

        // another caller may have committed while we waited
        if let Some(resolution) = self.cached_resolution() {
            return Ok(resolution);
        }

        let candidates = self.candidates.load_full();
        let ordered = select(candidates.as_slice(), self.config.policy)?;

        tracing::debug!(
            candidates = ordered.len(),
            policy = %self.config.policy,
            strategy = ?self.config.strategy,
            "starting failover pass"
        );

        let (winner, attempts) = match self.config.strategy {
            ProbeStrategy::Sequential => self.run_sequential(&ordered).await,
            ProbeStrategy::Parallel => self.run_parallel(&ordered).await,
            ProbeStrategy::Race => self.run_race(&ordered).await,
        };

        if let Some((index, result)) = winner {
            self.transition(FailoverState::Checking(index), FailoverState::Success(index));
            self.cache.commit(&result.candidate.id);
            self.transition(FailoverState::Success(index), FailoverState::Committed);

            tracing::info!(
                url = %result.candidate.id,
                attempts,
                latency_ms = result.latency.map(|l| l.as_millis()),
                "endpoint selected"
            );
            return Ok(Resolution {
                url: result.candidate.id,
                source: ResolutionSource::Probed,
                attempts,
            });
        }

        self.transition(FailoverState::Checking(ordered.len().saturating_sub(1)), FailoverState::Exhausted);

        let fallback = first_by_priority(candidates.as_slice())
            .ok_or(SelectionError::EmptyCandidateSet)?
            .id
            .clone();

        tracing::warn!(
            url = %fallback,
            attempts,
            "no candidate reachable, falling back to highest-priority endpoint"
        );

        Ok(Resolution { url: fallback, source: ResolutionSource::Fallback, attempts })
    }

    fn cached_resolution(&self) -> Option<Resolution> {
        let cached = self.cache.read()?;

        let still_candidate =
            self.candidates.load().iter().any(|c| c.enabled && c.id == cached.url);
        if !still_candidate {
            tracing::debug!(url = %cached.url, "cached selection is no longer a candidate");
            self.cache.invalidate();
            return None;
        }

        self.transition(FailoverState::Idle, FailoverState::Committed);
        tracing::trace!(url = %cached.url, "using cached selection");
        Some(Resolution { url: cached.url, source: ResolutionSource::Cached, attempts: 0 })
    }

    async fn run_sequential(&self, ordered: &[Candidate]) -> (Option<(usize, ProbeResult)>, usize) {
        let policy = AttemptPolicy::failover(self.config.failover_delay);
        let timeout = self.config.probe_timeout;

        let outcome = attempt_in_order(ordered, policy, |index, candidate| {
            self.transition(
                if index == 0 { FailoverState::Idle } else { FailoverState::Checking(index - 1) },
                FailoverState::Checking(index),
            );
            async move {
                let result = self.probe.probe(candidate, timeout).await;
                if result.reachable {
                    Ok(result)
                } else {
                    tracing::warn!(candidate = %candidate.id, "candidate unreachable");
                    Err(result)
                }
            }
        })
        .await;

        match outcome {
            AttemptOutcome::Succeeded { index, value, attempts } => (Some((index, value)), attempts),
            AttemptOutcome::Exhausted { attempts, .. } => (None, attempts),
        }
    }

    async fn run_parallel(&self, ordered: &[Candidate]) -> (Option<(usize, ProbeResult)>, usize) {
        let timeout = self.config.probe_timeout;
        let results =
            join_all(ordered.iter().map(|candidate| self.probe.probe(candidate, timeout))).await;
        let attempts = results.len();

        let winner = results.into_iter().enumerate().find(|(_, result)| {
            if !result.reachable {
                tracing::warn!(candidate = %result.candidate.id, "candidate unreachable");
            }
            result.reachable
        });

        (winner, attempts)
    }

    async fn run_race(&self, ordered: &[Candidate]) -> (Option<(usize, ProbeResult)>, usize) {
        let timeout = self.config.probe_timeout;
        let mut in_flight: FuturesUnordered<_> = ordered
            .iter()
            .enumerate()
            .map(|(index, candidate)| async move {
                (index, self.probe.probe(candidate, timeout).await)
            })
            .collect();

        let mut attempts = 0;
        while let Some((index, result)) = in_flight.next().await {
            attempts += 1;
            if result.reachable {
                // dropping the set cancels the probes still running
                return (Some((index, result)), attempts);
            }
            tracing::warn!(candidate = %result.candidate.id, "candidate unreachable");
        }

        (None, attempts)
    }

    fn transition(&self, from: FailoverState, to: FailoverState) {
        tracing::trace!(from = %from, to = %to, key = %self.cache.key(), "failover state");
    }
}
