//! Bounded, batched discovery of playable public IPs.
//!
//! Random sampling of the IPv4 space misses often: unallocated ranges come
//! back bogon, and some high-traffic networks are excluded from play. The
//! orchestrator bounds the total number of lookups to B×N while running each
//! batch of B concurrently, so a miss streak costs one round trip per batch
//! rather than one per candidate.

use std::net::Ipv4Addr;
use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;

use crate::geo::GeoLookup;
use crate::types::GeoRecord;

/// Produce a random IPv4 candidate, one uniform octet at a time.
///
/// No routability filtering here; the validator sorts that out.
pub fn random_candidate() -> Ipv4Addr {
    let mut rng = rand::rng();
    Ipv4Addr::new(rng.random(), rng.random(), rng.random(), rng.random())
}

/// Why a candidate was not playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NetworkError,
    BogonAddress,
    MissingLocation,
    MissingOrganization,
    ExcludedNetwork,
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted(GeoRecord),
    Rejected(RejectReason),
}

/// Wraps one lookup per candidate and classifies the result.
///
/// Network failures are absorbed into `Rejected(NetworkError)` here; they
/// drive continuation, never a crash.
pub struct Validator {
    lookup: Arc<dyn GeoLookup>,
    excluded_asns: Vec<String>,
}

impl Validator {
    pub fn new(lookup: Arc<dyn GeoLookup>, excluded_asns: Vec<String>) -> Self {
        Self {
            lookup,
            excluded_asns,
        }
    }

    pub async fn validate(&self, ip: Ipv4Addr) -> Outcome {
        let response = match self.lookup.lookup(ip).await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Lookup for {} failed: {}", ip, e);
                return Outcome::Rejected(RejectReason::NetworkError);
            }
        };

        if response.bogon {
            return Outcome::Rejected(RejectReason::BogonAddress);
        }

        let coordinate = match response.coordinate {
            Some(c) => c,
            None => return Outcome::Rejected(RejectReason::MissingLocation),
        };

        let organization = match response.organization {
            Some(o) => o,
            None => return Outcome::Rejected(RejectReason::MissingOrganization),
        };

        let asn = organization
            .split_whitespace()
            .next()
            .unwrap_or(&organization);
        if self.excluded_asns.iter().any(|excluded| excluded == asn) {
            return Outcome::Rejected(RejectReason::ExcludedNetwork);
        }

        Outcome::Accepted(GeoRecord {
            ip: response.ip,
            coordinate,
            organization,
            hostname: response.hostname,
            city: response.city,
            region: response.region,
            country: response.country,
        })
    }
}

/// Result of one discovery attempt. `Exhausted` is a normal return value.
#[derive(Debug, Clone)]
pub enum DiscoveryOutcome {
    Found(GeoRecord),
    Exhausted,
}

/// Drives bounded, batched, concurrent validation until a candidate is
/// accepted or the B×N attempt budget runs out.
pub struct Discovery {
    validator: Validator,
    batch_size: usize,
    batch_count: usize,
}

impl Discovery {
    pub fn new(validator: Validator, batch_size: usize, batch_count: usize) -> Self {
        Self {
            validator,
            batch_size,
            batch_count,
        }
    }

    /// Run one discovery attempt.
    ///
    /// Batches are strictly sequential; within a batch all validations run
    /// concurrently and every one settles before outcomes are inspected.
    /// Outcomes are scanned in issue order, so selection is deterministic for
    /// a fixed set of responses. Once a candidate is accepted, no further
    /// batch is started.
    pub async fn discover(&self) -> DiscoveryOutcome {
        for batch in 0..self.batch_count {
            let validations: Vec<_> = (0..self.batch_size)
                .map(|_| {
                    let ip = random_candidate();
                    self.validator.validate(ip)
                })
                .collect();

            let outcomes = join_all(validations).await;

            for (slot, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Outcome::Accepted(record) => {
                        tracing::debug!(
                            "Discovered {} ({}) in batch {} slot {}",
                            record.ip,
                            record.organization,
                            batch,
                            slot
                        );
                        return DiscoveryOutcome::Found(record);
                    }
                    Outcome::Rejected(reason) => {
                        tracing::trace!("Candidate rejected in batch {}: {:?}", batch, reason);
                    }
                }
            }
        }

        tracing::debug!(
            "Discovery exhausted after {} candidates",
            self.batch_size * self.batch_count
        );
        DiscoveryOutcome::Exhausted
    }
}
