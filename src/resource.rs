//! Resource vocabulary and the bounded stockpile ledger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Every good the settlement can produce, store, or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Farming
    Wheat,
    Carrot,
    Potato,
    Beetroot,
    Melon,
    Pumpkin,
    // Mining
    Stone,
    Coal,
    Iron,
    Gold,
    Diamond,
    // Lumber
    Log,
    Planks,
    Stick,
    // Ranching
    Leather,
    Beef,
    Porkchop,
    Mutton,
    Wool,
    Feather,
    Egg,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 21] = [
        ResourceKind::Wheat,
        ResourceKind::Carrot,
        ResourceKind::Potato,
        ResourceKind::Beetroot,
        ResourceKind::Melon,
        ResourceKind::Pumpkin,
        ResourceKind::Stone,
        ResourceKind::Coal,
        ResourceKind::Iron,
        ResourceKind::Gold,
        ResourceKind::Diamond,
        ResourceKind::Log,
        ResourceKind::Planks,
        ResourceKind::Stick,
        ResourceKind::Leather,
        ResourceKind::Beef,
        ResourceKind::Porkchop,
        ResourceKind::Mutton,
        ResourceKind::Wool,
        ResourceKind::Feather,
        ResourceKind::Egg,
    ];

    /// Stable identifier used in persisted documents.
    pub fn id(self) -> &'static str {
        match self {
            ResourceKind::Wheat => "wheat",
            ResourceKind::Carrot => "carrot",
            ResourceKind::Potato => "potato",
            ResourceKind::Beetroot => "beetroot",
            ResourceKind::Melon => "melon",
            ResourceKind::Pumpkin => "pumpkin",
            ResourceKind::Stone => "stone",
            ResourceKind::Coal => "coal",
            ResourceKind::Iron => "iron",
            ResourceKind::Gold => "gold",
            ResourceKind::Diamond => "diamond",
            ResourceKind::Log => "log",
            ResourceKind::Planks => "planks",
            ResourceKind::Stick => "stick",
            ResourceKind::Leather => "leather",
            ResourceKind::Beef => "beef",
            ResourceKind::Porkchop => "porkchop",
            ResourceKind::Mutton => "mutton",
            ResourceKind::Wool => "wool",
            ResourceKind::Feather => "feather",
            ResourceKind::Egg => "egg",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Wheat => "Wheat",
            ResourceKind::Carrot => "Carrot",
            ResourceKind::Potato => "Potato",
            ResourceKind::Beetroot => "Beetroot",
            ResourceKind::Melon => "Melon",
            ResourceKind::Pumpkin => "Pumpkin",
            ResourceKind::Stone => "Stone",
            ResourceKind::Coal => "Coal",
            ResourceKind::Iron => "Iron",
            ResourceKind::Gold => "Gold",
            ResourceKind::Diamond => "Diamond",
            ResourceKind::Log => "Log",
            ResourceKind::Planks => "Planks",
            ResourceKind::Stick => "Stick",
            ResourceKind::Leather => "Leather",
            ResourceKind::Beef => "Beef",
            ResourceKind::Porkchop => "Porkchop",
            ResourceKind::Mutton => "Mutton",
            ResourceKind::Wool => "Wool",
            ResourceKind::Feather => "Feather",
            ResourceKind::Egg => "Egg",
        }
    }
}

pub const DEFAULT_CAPACITY: u32 = 1000;
const MIN_CAPACITY: u32 = 100;

/// Bounded mapping from resource kind to count.
///
/// `add` partial-accepts up to the remaining headroom and never fails;
/// `remove` is all-or-nothing. Zero-count entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stockpile {
    resources: BTreeMap<ResourceKind, u32>,
    capacity: u32,
}

impl Default for Stockpile {
    fn default() -> Self {
        Self::new()
    }
}

impl Stockpile {
    pub fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Add up to `amount` of `kind`, truncated to the remaining headroom.
    /// Returns the amount actually accepted.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let accepted = amount.min(self.remaining_capacity());
        if accepted > 0 {
            *self.resources.entry(kind).or_insert(0) += accepted;
        }
        accepted
    }

    /// Remove exactly `amount` of `kind`. Fails without mutation when the
    /// stored count is insufficient.
    pub fn remove(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let current = self.count(kind);
        if current < amount {
            return false;
        }
        let rest = current - amount;
        if rest == 0 {
            self.resources.remove(&kind);
        } else {
            self.resources.insert(kind, rest);
        }
        true
    }

    pub fn count(&self, kind: ResourceKind) -> u32 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    pub fn has(&self, kind: ResourceKind, amount: u32) -> bool {
        self.count(kind) >= amount
    }

    pub fn total_stored(&self) -> u32 {
        self.resources.values().sum()
    }

    /// Every non-zero entry, ordered by kind.
    pub fn entries(&self) -> &BTreeMap<ResourceKind, u32> {
        &self.resources
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity.max(MIN_CAPACITY);
    }

    pub fn raise_capacity(&mut self, increase: u32) {
        self.capacity += increase;
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.total_stored())
    }

    pub fn is_full(&self) -> bool {
        self.remaining_capacity() == 0
    }
}
