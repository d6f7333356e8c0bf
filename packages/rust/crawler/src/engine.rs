//! Positional enumeration engine.
//!
//! The collector walks a synthetic position cursor over a listing that only
//! exposes one item at a time. Each position is one navigate → find → activate
//! → read-location round trip against the shared [`PageSource`]. Failures
//! consume positions; too many in a row ends the run normally.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use jobscout_shared::{CollectorConfig, Identifier, Position, Result};

use crate::identifier::IdentifierExtractor;
use crate::pacing::Pacer;
use crate::query::build_query;
use crate::source::{ElementQuery, PageSource};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened at one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionOutcome {
    /// A new identifier was captured.
    Collected(Identifier),
    /// The identifier was already captured earlier in this run.
    Duplicate(Identifier),
    /// No interactive element at the expected location.
    NoElement,
    /// The element was found but activation never took effect.
    ActivationFailed,
    /// Activation worked but the resolved location carried no identifier.
    NoIdentifier(String),
    /// A transient fetch/interaction error, absorbed by the circuit breaker.
    Transient(String),
}

impl PositionOutcome {
    /// Whether this outcome counts toward the consecutive-failure limit.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Collected(_))
    }
}

/// Why the collection loop stopped. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    LimitReached,
    AttemptsExhausted,
    ConsecutiveFailures,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::LimitReached => "limit reached",
            Self::AttemptsExhausted => "attempt cap reached",
            Self::ConsecutiveFailures => "end of listing",
        })
    }
}

/// Summary of a completed collection run.
#[derive(Debug, Clone)]
pub struct CollectResult {
    /// Unique identifiers in discovery order.
    pub identifiers: Vec<Identifier>,
    /// Number of positions visited.
    pub positions_visited: u64,
    /// Position the next run should resume from.
    pub next_position: Position,
    /// Failed positions (position, reason).
    pub failures: Vec<(Position, String)>,
    pub stop_reason: StopReason,
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Progress hook
// ---------------------------------------------------------------------------

/// Observer for collection progress (checkpointing, UI updates).
pub trait CollectProgress: Send + Sync {
    /// Called after every visited position.
    fn on_position(&self, _position: Position, _outcome: &PositionOutcome) {}

    /// Called after a new identifier is captured, with the full ordered list.
    fn on_identifier(&self, _collected: &[Identifier]) {}

    /// Called once when the loop stops normally.
    fn on_finished(&self, _collected: &[Identifier], _reason: StopReason) {}
}

/// No-op observer.
pub struct SilentCollectProgress;

impl CollectProgress for SilentCollectProgress {}

// ---------------------------------------------------------------------------
// CollectionState
// ---------------------------------------------------------------------------

/// Per-run mutable state. `ordered` never holds duplicates and always has
/// the same length as `visited`.
#[derive(Debug, Default)]
struct CollectionState {
    visited: HashSet<Identifier>,
    ordered: Vec<Identifier>,
    position: Position,
    consecutive_failures: u32,
}

impl CollectionState {
    fn starting_at(position: Position) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Insert a new identifier. Returns `false` if it was already seen.
    fn insert(&mut self, id: &Identifier) -> bool {
        if !self.visited.insert(id.clone()) {
            return false;
        }
        self.ordered.push(id.clone());
        self.consecutive_failures = 0;
        true
    }

    fn fail(&mut self) {
        self.consecutive_failures += 1;
    }
}

// ---------------------------------------------------------------------------
// PositionalCollector
// ---------------------------------------------------------------------------

/// Drives a [`PageSource`] across increasing positions to enumerate
/// unique identifiers, with a consecutive-failure circuit breaker.
pub struct PositionalCollector {
    config: CollectorConfig,
    card_query: ElementQuery,
    extractor: IdentifierExtractor,
    pacer: Pacer,
}

impl PositionalCollector {
    /// Create a collector. Fails if an identifier pattern does not compile.
    pub fn new(config: CollectorConfig, pacer: Pacer) -> Result<Self> {
        let extractor = IdentifierExtractor::new(&config.identifier_patterns)?;
        let card_query = ElementQuery::new(config.card_selectors.iter().cloned());
        Ok(Self {
            config,
            card_query,
            extractor,
            pacer,
        })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Enumerate identifiers starting at `start`, up to `limit` (unbounded if `None`).
    ///
    /// Exhaustion is a normal stop. Only non-transient source errors are
    /// returned as `Err`.
    #[instrument(skip_all, fields(source = source.name(), start, limit))]
    pub async fn collect(
        &self,
        source: &mut dyn PageSource,
        base_query: &str,
        limit: Option<usize>,
        start: Position,
        progress: &dyn CollectProgress,
    ) -> Result<CollectResult> {
        let started = Instant::now();
        let mut state = CollectionState::starting_at(start);
        let mut failures: Vec<(Position, String)> = Vec::new();

        info!(
            max_attempts = self.config.max_attempts,
            max_consecutive_failures = self.config.max_consecutive_failures,
            "starting collection"
        );

        while limit.is_none_or(|l| state.ordered.len() < l)
            && state.position < self.config.max_attempts
            && state.consecutive_failures < self.config.max_consecutive_failures
        {
            if state.position > start {
                self.pacer.between_positions().await;
            }

            let position = state.position;
            let url = build_query(base_query, &self.config.position_param, position);

            let probed = match self.probe(source, &url).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_transient() => PositionOutcome::Transient(e.to_string()),
                Err(e) => {
                    warn!(position, error = %e, "page source failed, aborting collection");
                    return Err(e);
                }
            };

            let outcome = match probed {
                PositionOutcome::Collected(id) => {
                    if state.insert(&id) {
                        PositionOutcome::Collected(id)
                    } else {
                        PositionOutcome::Duplicate(id)
                    }
                }
                other => other,
            };

            if let PositionOutcome::Collected(id) = &outcome {
                info!(position, id = %id, collected = state.ordered.len(), "identifier collected");
                progress.on_identifier(&state.ordered);
            } else {
                state.fail();
                let reason = describe(&outcome);
                warn!(position, consecutive = state.consecutive_failures, %reason, "position failed");
                failures.push((position, reason));
            }
            progress.on_position(position, &outcome);

            state.position += 1;
        }

        let stop_reason = if limit.is_some_and(|l| state.ordered.len() >= l) {
            StopReason::LimitReached
        } else if state.consecutive_failures >= self.config.max_consecutive_failures {
            StopReason::ConsecutiveFailures
        } else {
            StopReason::AttemptsExhausted
        };

        progress.on_finished(&state.ordered, stop_reason);

        let result = CollectResult {
            positions_visited: state.position.saturating_sub(start),
            next_position: state.position,
            identifiers: state.ordered,
            failures,
            stop_reason,
            duration: started.elapsed(),
        };

        info!(
            collected = result.identifiers.len(),
            positions = result.positions_visited,
            failures = result.failures.len(),
            reason = %result.stop_reason,
            duration_ms = result.duration.as_millis() as u64,
            "collection finished"
        );

        Ok(result)
    }

    /// One position round trip. Duplicates are resolved by the caller, so a
    /// parsed identifier is always reported as `Collected` here.
    async fn probe(&self, source: &mut dyn PageSource, url: &str) -> Result<PositionOutcome> {
        source.navigate(url).await?;

        let Some(card) = source.find_first(&self.card_query).await? else {
            return Ok(PositionOutcome::NoElement);
        };

        let mut activated = false;
        for attempt in 1..=self.config.activation_attempts.max(1) {
            match source.activate(&card).await {
                Ok(true) => {
                    activated = true;
                    break;
                }
                Ok(false) => debug!(attempt, "activation did not take effect"),
                Err(e) if e.is_transient() => debug!(attempt, error = %e, "activation failed"),
                Err(e) => return Err(e),
            }
        }
        if !activated {
            return Ok(PositionOutcome::ActivationFailed);
        }

        let location = source.current_location();
        Ok(match self.extractor.extract(&location) {
            Some(id) => PositionOutcome::Collected(id),
            None => PositionOutcome::NoIdentifier(location),
        })
    }
}

fn describe(outcome: &PositionOutcome) -> String {
    match outcome {
        PositionOutcome::Collected(id) => format!("collected {id}"),
        PositionOutcome::Duplicate(id) => format!("duplicate identifier {id}"),
        PositionOutcome::NoElement => "no element found".into(),
        PositionOutcome::ActivationFailed => "activation failed".into(),
        PositionOutcome::NoIdentifier(location) => format!("no identifier in {location}"),
        PositionOutcome::Transient(reason) => reason.clone(),
    }
}
