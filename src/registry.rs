//! Exchange Registry
//!
//! Name-keyed catalogue of exchange venues with enumerable insertion order.
//! Only the owner may add or remove entries; lookups are open to anyone.
//!
//! The ordered name list and the name → entry map are kept consistent:
//! a name is in the list iff its entry is live. Removal compacts the list
//! (no tombstones) and keeps the relative order of the remaining names.
//!
//! Created: 2026-10-16

use crate::error::{ArbError, ArbResult};
use crate::types::{ExchangeEntry, ExchangeInfo, VenueKind};
use alloy::primitives::Address;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ExchangeRegistry {
    owner: Address,
    /// Live entries indexed by name
    entries: HashMap<String, ExchangeEntry>,
    /// Live names in insertion order
    names: Vec<String>,
}

impl ExchangeRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            entries: HashMap::new(),
            names: Vec::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    fn only_owner(&self, caller: Address) -> ArbResult<()> {
        if caller != self.owner {
            return Err(ArbError::NotOwner(caller));
        }
        Ok(())
    }

    /// Register a venue under `name`. Fails if the name is taken.
    pub fn add(
        &mut self,
        caller: Address,
        name: &str,
        primary: Address,
        secondary: Address,
        kind: VenueKind,
    ) -> ArbResult<()> {
        self.only_owner(caller)?;
        if self.entries.contains_key(name) {
            return Err(ArbError::DuplicateVenue(name.to_string()));
        }

        self.entries.insert(
            name.to_string(),
            ExchangeEntry {
                name: name.to_string(),
                primary,
                secondary,
                kind,
            },
        );
        self.names.push(name.to_string());
        info!("Exchange registered: {} ({}) router={:?} aux={:?}", name, kind, primary, secondary);
        Ok(())
    }

    /// Drop a venue. Fails if the name is not registered.
    pub fn remove(&mut self, caller: Address, name: &str) -> ArbResult<ExchangeEntry> {
        self.only_owner(caller)?;
        let entry = self
            .entries
            .remove(name)
            .ok_or_else(|| ArbError::VenueNotFound(name.to_string()))?;
        self.names.retain(|n| n != name);
        info!("Exchange removed: {}", name);
        Ok(entry)
    }

    /// Live names in insertion order
    pub fn list(&self) -> Vec<String> {
        self.names.clone()
    }

    /// `(primary, secondary, kind)` or the null triple for unknown names
    pub fn info(&self, name: &str) -> ExchangeInfo {
        let info = self.entries.get(name).map(ExchangeEntry::info).unwrap_or_default();
        debug!("Registry lookup {}: {:?}", name, info);
        info
    }

    pub fn entry(&self, name: &str) -> Option<&ExchangeEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
