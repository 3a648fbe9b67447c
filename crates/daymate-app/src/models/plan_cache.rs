use std::collections::HashMap;

use daymate_api::PlanEnvelope;

/// Generated plans keyed by location id, plus the generation loading flag.
///
/// Clearing the cache bumps an epoch; results from requests started before
/// the clear carry the old epoch and are dropped by [`PlanCache::finish`].
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: HashMap<String, PlanEnvelope>,
    in_flight: usize,
    epoch: u64,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location_id: &str) -> Option<&PlanEnvelope> {
        self.plans.get(location_id)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Drop the plan for one location. Other entries are untouched.
    pub fn evict(&mut self, location_id: &str) -> Option<PlanEnvelope> {
        self.plans.remove(location_id)
    }

    /// Forget every cached plan (session change).
    pub fn clear(&mut self) {
        self.plans.clear();
        self.epoch += 1;
        tracing::debug!("Plan cache cleared (epoch {})", self.epoch);
    }

    /// Mark a generation request as started. Returns the epoch the result
    /// must be tagged with.
    pub fn begin(&mut self) -> u64 {
        self.in_flight += 1;
        self.epoch
    }

    /// Settle a generation request. The loading count drops on every
    /// outcome; a successful plan is stored only if its epoch is current.
    /// Returns true if the plan was stored.
    pub fn finish(&mut self, location_id: &str, epoch: u64, plan: Option<PlanEnvelope>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        let Some(plan) = plan else {
            return false;
        };
        if epoch != self.epoch {
            tracing::debug!(
                "Dropping plan for {} from epoch {} (now {})",
                location_id,
                epoch,
                self.epoch
            );
            return false;
        }
        self.plans.insert(location_id.to_string(), plan);
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}
