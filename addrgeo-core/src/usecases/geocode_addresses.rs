use crate::{
    entities::*,
    gateways::{geocode::GeoCodingGateway, progress::ProgressObserver},
    resolve::{Pause, Resolver},
};
use std::sync::atomic::{AtomicBool, Ordering};

/// An address for which no coordinate could be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedEntry {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchOutcome {
    /// One entry per processed address in input order, `None` if unresolved.
    pub results: Vec<Option<Coordinate>>,
    pub unresolved: Vec<UnresolvedEntry>,
    /// Set if the batch was aborted before all addresses were processed.
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn resolved_count(&self) -> usize {
        self.results.iter().filter(|x| x.is_some()).count()
    }
}

/// Resolves all addresses strictly one after another.
///
/// `cancel` is checked before each address, never while waiting for
/// the geocoding service.
pub fn geocode_addresses<G, P, O>(
    resolver: &Resolver<G, P>,
    addresses: &[CanonicalAddress],
    observer: &O,
    cancel: &AtomicBool,
) -> BatchOutcome
where
    G: GeoCodingGateway,
    P: Pause,
    O: ProgressObserver + ?Sized,
{
    let total = addresses.len();
    let mut outcome = BatchOutcome {
        results: Vec::with_capacity(total),
        ..Default::default()
    };
    for (index, addr) in addresses.iter().enumerate() {
        let current = index + 1;
        if cancel.load(Ordering::Relaxed) {
            log::info!("Geocoding cancelled after {index} of {total} addresses");
            outcome.cancelled = true;
            observer.on_progress(
                index,
                total,
                &format!("Cancelled after {index} of {total} addresses."),
            );
            return outcome;
        }
        observer.on_progress(current, total, &format!("Processing: {addr}"));
        let resolution = resolver.resolve(addr, |ev| {
            observer.on_progress(current, total, &ev.to_string());
        });
        let pos = resolution.coordinate();
        if pos.is_none() {
            outcome.unresolved.push(UnresolvedEntry {
                address: addr.to_string(),
            });
        }
        outcome.results.push(pos);
    }
    let summary = if outcome.unresolved.is_empty() {
        "Processing completed successfully!".to_string()
    } else {
        format!(
            "Completed. {} addresses were not found.",
            outcome.unresolved.len()
        )
    };
    log::info!("{summary}");
    observer.on_progress(total, total, &summary);
    outcome
}
