use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{LayoutError, Result};
use crate::region::RegionId;

/// Prefix of region ids minted by the editor.
pub const REGION_ID_PREFIX: &str = "temp-region-";

/// Widget ids are drawn from `0..WIDGET_ID_CEILING`.
pub const WIDGET_ID_CEILING: u32 = 1_000_000_000;

/// Region id bookkeeping plus the widget id generator of one tree.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    counter: u64,
    region_ids: HashSet<RegionId>,
    rng: StdRng,
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Registry with a reproducible widget id sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            counter: 0,
            region_ids: HashSet::new(),
            rng,
        }
    }

    /// Record an id read from markup. Ids must be unique per template.
    pub fn register_region(&mut self, id: &str) -> Result<()> {
        if !self.region_ids.insert(id.to_string()) {
            return Err(LayoutError::DuplicateRegionId(id.to_string()));
        }
        Ok(())
    }

    pub fn release_region(&mut self, id: &str) {
        self.region_ids.remove(id);
    }

    pub fn contains_region(&self, id: &str) -> bool {
        self.region_ids.contains(id)
    }

    pub fn region_count(&self) -> usize {
        self.region_ids.len()
    }

    /// Mint the next free `temp-region-N` id and register it.
    pub fn next_region_id(&mut self) -> RegionId {
        loop {
            self.counter += 1;
            let candidate = format!("{REGION_ID_PREFIX}{}", self.counter);
            if self.region_ids.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Draw random numeric ids until one is non-empty and not `taken`.
    pub fn next_widget_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = self.rng.gen_range(0..WIDGET_ID_CEILING).to_string();
            if candidate.is_empty() || taken(&candidate) {
                continue;
            }
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_ids_skip_registered_names() {
        let mut registry = IdRegistry::with_seed(1);
        registry.register_region("temp-region-1").unwrap();
        assert_eq!(registry.next_region_id(), "temp-region-2");
        assert_eq!(registry.next_region_id(), "temp-region-3");
        assert_eq!(registry.region_count(), 3);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = IdRegistry::with_seed(1);
        registry.register_region("header").unwrap();
        let err = registry.register_region("header").unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateRegionId(id) if id == "header"));
    }

    #[test]
    fn widget_ids_avoid_taken_values() {
        let mut first = IdRegistry::with_seed(7);
        let blocked = first.next_widget_id(|_| false);

        let mut second = IdRegistry::with_seed(7);
        let next = second.next_widget_id(|id| id == blocked);
        assert_ne!(next, blocked);
        assert!(next.parse::<u32>().unwrap() < WIDGET_ID_CEILING);
    }
}
