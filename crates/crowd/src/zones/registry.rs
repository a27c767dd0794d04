use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::config::SiteConfig;
use crate::error::{ConfigError, CrowdError};
use crate::occupancy::Classification;

use super::types::{ZoneId, ZoneState};

/// Authoritative store of every zone, in registration order.
///
/// Zones are never added or removed after startup. The id index is built
/// once and only read afterwards.
#[derive(Resource, Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<ZoneState>,
    index: HashMap<ZoneId, usize>,
}

impl ZoneRegistry {
    /// Validates the configuration and builds the initial zone set.
    ///
    /// Initial visitor counts are clamped, every other inconsistency is a
    /// fatal [`ConfigError`].
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        config.validate_timing()?;
        if config.zones.is_empty() {
            return Err(ConfigError::NoZones);
        }

        let mut zones = Vec::with_capacity(config.zones.len());
        let mut index = HashMap::with_capacity(config.zones.len());
        for zone_config in &config.zones {
            let id = zone_config.id.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptyZoneId);
            }
            if index.contains_key(&ZoneId::from(id)) {
                return Err(ConfigError::DuplicateZone(id.to_string()));
            }
            if zone_config.capacity == 0 {
                return Err(ConfigError::ZeroCapacity(id.to_string()));
            }
            if let Some(drift) = zone_config.drift {
                if drift.min > drift.max {
                    return Err(ConfigError::InvalidDrift {
                        zone: id.to_string(),
                        min: drift.min,
                        max: drift.max,
                    });
                }
            }
            index.insert(ZoneId::from(id), zones.len());
            zones.push(ZoneState::from_config(zone_config));
        }

        // Alternatives can point forward, so they are checked once every id
        // is known.
        for zone in &zones {
            let Some(alt) = &zone.alternative else {
                continue;
            };
            if alt == &zone.id {
                return Err(ConfigError::SelfAlternative(zone.id.to_string()));
            }
            if !index.contains_key(alt) {
                return Err(ConfigError::UnknownAlternative {
                    zone: zone.id.to_string(),
                    alternative: alt.to_string(),
                });
            }
        }

        Ok(Self { zones, index })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ZoneId) -> Result<&ZoneState, CrowdError> {
        self.index
            .get(id)
            .map(|&i| &self.zones[i])
            .ok_or_else(|| CrowdError::NotFound(id.clone()))
    }

    fn get_mut(&mut self, id: &ZoneId) -> Result<&mut ZoneState, CrowdError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.zones[i]),
            None => Err(CrowdError::NotFound(id.clone())),
        }
    }

    /// Zones in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ZoneState> {
        self.zones.iter()
    }

    pub fn for_each(&self, mut f: impl FnMut(&ZoneState)) {
        for zone in &self.zones {
            f(zone);
        }
    }

    pub fn ids(&self) -> Vec<ZoneId> {
        self.zones.iter().map(|z| z.id.clone()).collect()
    }

    /// Copies of every zone, for presentation or serialization.
    pub fn snapshot(&self) -> Vec<ZoneState> {
        self.zones.clone()
    }

    pub fn total_visitors(&self) -> u64 {
        self.zones.iter().map(|z| z.visitors as u64).sum()
    }

    pub fn total_capacity(&self) -> u64 {
        self.zones.iter().map(|z| z.capacity as u64).sum()
    }

    /// Stores a new visitor count, clamped into `[0, capacity]`.
    ///
    /// Classification is not touched; callers reclassify afterwards.
    /// Returns the count actually stored.
    pub fn set_visitors(&mut self, id: &ZoneId, new_count: i64) -> Result<u32, CrowdError> {
        let zone = self.get_mut(id)?;
        let clamped = new_count.clamp(0, zone.capacity as i64) as u32;
        zone.visitors = clamped;
        Ok(clamped)
    }

    /// Writes a classification result. Status and colour always change
    /// together.
    pub(crate) fn apply_classification(
        &mut self,
        id: &ZoneId,
        classification: &Classification,
    ) -> Result<(), CrowdError> {
        let zone = self.get_mut(id)?;
        zone.status = classification.status;
        zone.color = classification.status.color();
        zone.queue_time_minutes = classification.queue_time_minutes;
        zone.recommended_arrival = classification.recommended_arrival;
        Ok(())
    }

    /// Puts a zone under warning with the given countdown.
    pub(crate) fn activate_warning(
        &mut self,
        id: &ZoneId,
        countdown_secs: u32,
    ) -> Result<(), CrowdError> {
        let zone = self.get_mut(id)?;
        if countdown_secs == 0 {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {id} cannot enter warning with an empty countdown"
            )));
        }
        if !zone.warning_eligible {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {id} is not eligible for warnings"
            )));
        }
        zone.warning_active = true;
        zone.countdown_remaining_secs = countdown_secs;
        Ok(())
    }

    /// Overwrites the remaining countdown of a zone already under warning.
    pub(crate) fn set_countdown(&mut self, id: &ZoneId, secs: u32) -> Result<(), CrowdError> {
        let zone = self.get_mut(id)?;
        if !zone.warning_active {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {id} has no active warning to count down"
            )));
        }
        zone.countdown_remaining_secs = secs;
        Ok(())
    }

    pub(crate) fn clear_warning(&mut self, id: &ZoneId) -> Result<(), CrowdError> {
        let zone = self.get_mut(id)?;
        zone.warning_active = false;
        zone.countdown_remaining_secs = 0;
        Ok(())
    }

    /// Restores every zone to its configured starting count and drops all
    /// warnings. Classification is left for the caller.
    pub(crate) fn restore_initial(&mut self) {
        for zone in &mut self.zones {
            zone.visitors = zone.initial_visitors;
            zone.warning_active = false;
            zone.countdown_remaining_secs = 0;
        }
    }

    /// Every invariant the registry currently breaks, zone by zone, plus
    /// cross-zone checks on alternatives.
    pub fn check_invariants(&self) -> Vec<CrowdError> {
        let mut errors: Vec<CrowdError> = self
            .zones
            .iter()
            .filter_map(|z| z.check_invariants().err())
            .collect();

        let mut seen = HashSet::new();
        for zone in &self.zones {
            if !seen.insert(&zone.id) {
                errors.push(CrowdError::InvariantViolation(format!(
                    "zone id {} registered twice",
                    zone.id
                )));
            }
            if let Some(alt) = &zone.alternative {
                if !self.index.contains_key(alt) {
                    errors.push(CrowdError::InvariantViolation(format!(
                        "zone {} names unknown alternative {alt}",
                        zone.id
                    )));
                }
            }
        }
        errors
    }

    /// Repairs what can be repaired in place: visitor counts above capacity,
    /// mismatched colours and countdowns left without a warning. Returns the
    /// number of fields corrected.
    pub(crate) fn repair(&mut self) -> u32 {
        let mut fixed = 0;
        for zone in &mut self.zones {
            if zone.visitors > zone.capacity {
                zone.visitors = zone.capacity;
                fixed += 1;
            }
            if zone.color != zone.status.color() {
                zone.color = zone.status.color();
                fixed += 1;
            }
            if zone.countdown_remaining_secs > 0 && !zone.warning_active {
                zone.countdown_remaining_secs = 0;
                fixed += 1;
            }
        }
        fixed
    }

    #[cfg(test)]
    pub(crate) fn zone_mut_for_test(&mut self, id: &ZoneId) -> &mut ZoneState {
        let i = self.index[id];
        &mut self.zones[i]
    }

    /// Writes a raw visitor count, skipping the clamp.
    #[cfg(test)]
    pub(crate) fn corrupt_visitors_for_test(&mut self, id: &ZoneId, visitors: u32) {
        self.zone_mut_for_test(id).visitors = visitors;
    }
}
