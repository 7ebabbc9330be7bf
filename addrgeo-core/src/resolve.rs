//! Rate-limited geocoding with a degrading query strategy.
//!
//! A canonical address is resolved in up to three attempts, each with a
//! less specific query:
//!
//! 1. the full address
//! 2. the address without its first segment (street and house number)
//! 3. the last two segments, usually `<state>, <country>` or
//!    `<city>, <country>`
//!
//! Every request is preceded by [`ResolvePolicy::min_request_interval`]
//! and a failed request is followed by
//! [`ResolvePolicy::failure_cooldown`] unless it was the last attempt.

use crate::{
    entities::*,
    gateways::geocode::{GeoCodingGateway, GeocodingError},
};
use std::{fmt, thread, time::Duration};

/// Number of steps in the degradation plan.
pub const MAX_ATTEMPTS: usize = 3;

const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_FAILURE_COOLDOWN: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvePolicy {
    pub min_request_interval: Duration,
    pub failure_cooldown: Duration,
    /// Clamped to `1..=MAX_ATTEMPTS`.
    pub max_attempts: usize,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
            failure_cooldown: DEFAULT_FAILURE_COOLDOWN,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl ResolvePolicy {
    fn attempts(&self) -> usize {
        self.max_attempts.clamp(1, MAX_ATTEMPTS)
    }
}

/// Blocks the current thread between requests.
pub trait Pause {
    fn pause(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Resolved(Coordinate),
    Unresolved,
}

impl Resolution {
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved(pos) => Some(*pos),
            Self::Unresolved => None,
        }
    }

    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// The queries of all attempts for one address, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    queries: [String; MAX_ATTEMPTS],
}

impl QueryPlan {
    pub fn for_address(addr: &CanonicalAddress) -> Self {
        let full = addr.to_string();
        let without_street = addr.join_from(1);
        let region = addr
            .join_last(2)
            .unwrap_or_else(|| without_street.clone());
        Self {
            queries: [full, without_street, region],
        }
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }
}

/// Status of a single resolution, reported after every step.
///
/// Attempts are counted from 1.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionEvent {
    Attempt { attempt: usize, query: String },
    Resolved { attempt: usize, query: String, pos: Coordinate },
    NoMatch { attempt: usize, query: String },
    Timeout { attempt: usize, query: String },
    Failed { attempt: usize, query: String, reason: String },
    Exhausted { address: String },
}

impl fmt::Display for ResolutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempt { attempt, query } => write!(f, "Attempt {attempt} for: {query}"),
            Self::Resolved {
                attempt,
                query,
                pos,
            } => write!(f, "Found {query} at {pos} (attempt {attempt})"),
            Self::NoMatch { attempt, query } => {
                write!(f, "No match - Attempt {attempt} for: {query}")
            }
            Self::Timeout { attempt, query } => write!(f, "Timeout - Attempt {attempt} for: {query}"),
            Self::Failed {
                attempt,
                query,
                reason,
            } => write!(f, "Error - Attempt {attempt} for {query}: {reason}"),
            Self::Exhausted { address } => write!(f, "Address not found: {address}"),
        }
    }
}

/// Resolves canonical addresses one after another through a single
/// long-lived gateway.
#[derive(Debug)]
pub struct Resolver<G, P = ThreadSleep> {
    gateway: G,
    pause: P,
    policy: ResolvePolicy,
}

impl<G> Resolver<G, ThreadSleep>
where
    G: GeoCodingGateway,
{
    pub fn new(gateway: G, policy: ResolvePolicy) -> Self {
        Self::with_pause(gateway, ThreadSleep, policy)
    }
}

impl<G, P> Resolver<G, P>
where
    G: GeoCodingGateway,
    P: Pause,
{
    pub fn with_pause(gateway: G, pause: P, policy: ResolvePolicy) -> Self {
        Self {
            gateway,
            pause,
            policy,
        }
    }

    pub fn policy(&self) -> &ResolvePolicy {
        &self.policy
    }

    /// Never fails: gateway errors only move on to the next attempt.
    pub fn resolve<F>(&self, addr: &CanonicalAddress, mut notify: F) -> Resolution
    where
        F: FnMut(&ResolutionEvent),
    {
        if addr.is_empty() {
            log::debug!("Skipping empty address");
            return Resolution::Unresolved;
        }
        let plan = QueryPlan::for_address(addr);
        let attempts: Vec<_> = plan
            .queries()
            .iter()
            .take(self.policy.attempts())
            .enumerate()
            .map(|(index, query)| (index + 1, query))
            .filter(|(attempt, query)| {
                if query.is_empty() {
                    log::debug!("Skipping attempt {attempt} for '{addr}': nothing left to query");
                }
                !query.is_empty()
            })
            .collect();
        let last_attempt = attempts.last().map(|(attempt, _)| *attempt);
        for (attempt, query) in attempts {
            let cool_down = || {
                if Some(attempt) != last_attempt {
                    self.pause.pause(self.policy.failure_cooldown);
                }
            };
            self.pause.pause(self.policy.min_request_interval);
            notify(&ResolutionEvent::Attempt {
                attempt,
                query: query.clone(),
            });
            match self.gateway.resolve_lat_lng(query) {
                Ok(Some(pos)) if pos.is_valid() => {
                    log::debug!("Resolved address location '{query}': {pos}");
                    notify(&ResolutionEvent::Resolved {
                        attempt,
                        query: query.clone(),
                        pos,
                    });
                    return Resolution::Resolved(pos);
                }
                Ok(Some(pos)) => {
                    log::warn!("Discarding invalid location {pos} for '{query}'");
                    notify(&ResolutionEvent::NoMatch {
                        attempt,
                        query: query.clone(),
                    });
                }
                Ok(None) => {
                    log::debug!("No match for '{query}' (attempt {attempt})");
                    notify(&ResolutionEvent::NoMatch {
                        attempt,
                        query: query.clone(),
                    });
                }
                Err(GeocodingError::Timeout) => {
                    log::warn!("Timeout while resolving '{query}' (attempt {attempt})");
                    notify(&ResolutionEvent::Timeout {
                        attempt,
                        query: query.clone(),
                    });
                    cool_down();
                }
                Err(err) => {
                    log::warn!("Failed to resolve address location '{query}': {err}");
                    notify(&ResolutionEvent::Failed {
                        attempt,
                        query: query.clone(),
                        reason: err.to_string(),
                    });
                    cool_down();
                }
            }
        }
        notify(&ResolutionEvent::Exhausted {
            address: addr.to_string(),
        });
        Resolution::Unresolved
    }
}
