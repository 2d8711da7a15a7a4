//! The settlement aggregate: one grid, one citizen roster, one stockpile,
//! one contract ledger, one tech tree, and the coin/influence counters.
//!
//! Every interactive operation lives here and reports success or the
//! accepted amount; nothing in this module panics or produces user-facing
//! text. Persistence is the caller's concern (see `registry`).

use std::collections::BTreeMap;

use rand::Rng;

use crate::building::{Building, BuildingKind, Grid, MAX_BUILDING_LEVEL};
use crate::citizen::{Citizen, CitizenId, CitizenJob, MAX_LEVEL};
use crate::contract::Contract;
use crate::resource::{ResourceKind, Stockpile};
use crate::tech::{TechNode, TechTree};

pub const STARTING_COINS: u32 = 500;
pub const STARTING_MAX_CITIZENS: u32 = 5;
pub const TOWN_HALL_CELL: (i32, i32) = (3, 3);

const BASE_CONTRACT_COUNT: usize = 3;

/// Lifetime counters that only ever grow (except on full reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementStats {
    pub total_coins_earned: u64,
    pub total_items_produced: u64,
    pub days_played: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub(crate) grid: Grid,
    pub(crate) citizens: BTreeMap<CitizenId, Citizen>,
    pub(crate) max_citizens: u32,
    pub(crate) coins: u32,
    pub(crate) influence: u32,
    pub(crate) stockpile: Stockpile,
    pub(crate) contracts: Vec<Contract>,
    pub(crate) last_contract_refresh: Option<u64>,
    pub(crate) tech: TechTree,
    pub(crate) stats: SettlementStats,
    pub(crate) next_citizen_id: u64,
    pub(crate) next_contract_id: u64,
}

impl Default for Settlement {
    fn default() -> Self {
        Self::new()
    }
}

impl Settlement {
    pub fn new() -> Self {
        let mut grid = Grid::new();
        if let Some(cell) = grid.get_mut(TOWN_HALL_CELL.0, TOWN_HALL_CELL.1) {
            cell.set_kind(BuildingKind::TownHall);
        }
        Self {
            grid,
            citizens: BTreeMap::new(),
            max_citizens: STARTING_MAX_CITIZENS,
            coins: STARTING_COINS,
            influence: 0,
            stockpile: Stockpile::new(),
            contracts: Vec::new(),
            last_contract_refresh: None,
            tech: TechTree::new(),
            stats: SettlementStats::default(),
            next_citizen_id: 0,
            next_contract_id: 0,
        }
    }

    /// Wipe everything back to the fresh-settlement state.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }

    // === Grid ===

    pub fn building(&self, x: i32, z: i32) -> Option<&Building> {
        self.grid.get(x, z)
    }

    pub fn adjacent_buildings(&self, x: i32, z: i32) -> Vec<&Building> {
        self.grid.adjacent(x, z)
    }

    pub fn building_count(&self, kind: BuildingKind) -> usize {
        self.grid.count(kind)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Place a new building on an empty cell. Fails on occupied or
    /// out-of-range cells, a locked tech gate, or insufficient coins.
    pub fn construct_building(&mut self, x: i32, z: i32, kind: BuildingKind) -> bool {
        if kind == BuildingKind::Empty {
            return false;
        }
        if let Some(required) = kind.required_tech() {
            if !self.tech.is_unlocked(required) {
                return false;
            }
        }
        match self.grid.get(x, z) {
            Some(cell) if cell.is_empty() => {}
            _ => return false,
        }
        if !self.spend_coins(kind.base_cost()) {
            return false;
        }
        if let Some(cell) = self.grid.get_mut(x, z) {
            cell.set_kind(kind);
        }
        if kind == BuildingKind::House {
            self.max_citizens += 1;
        }
        true
    }

    /// Raise a building one level, paying the kind's upgrade cost.
    pub fn upgrade_building(&mut self, x: i32, z: i32) -> bool {
        let (kind, level) = match self.grid.get(x, z) {
            Some(cell) if !cell.is_empty() => (cell.kind(), cell.level()),
            _ => return false,
        };
        if level >= MAX_BUILDING_LEVEL {
            return false;
        }
        if !self.spend_coins(kind.upgrade_cost(level + 1)) {
            return false;
        }
        if let Some(cell) = self.grid.get_mut(x, z) {
            cell.upgrade();
        }
        true
    }

    /// Clear a cell back to an empty plot, refunding half the base cost
    /// and releasing any assigned worker. The town hall is protected.
    pub fn demolish_building(&mut self, x: i32, z: i32) -> bool {
        let (kind, worker) = match self.grid.get(x, z) {
            Some(cell) if !cell.is_empty() && cell.kind() != BuildingKind::TownHall => {
                (cell.kind(), cell.worker())
            }
            _ => return false,
        };
        self.coins += kind.base_cost() / 2;
        if let Some(id) = worker {
            if let Some(citizen) = self.citizens.get_mut(&id) {
                citizen.set_job(CitizenJob::None);
            }
        }
        if let Some(cell) = self.grid.get_mut(x, z) {
            cell.set_kind(BuildingKind::Empty);
            cell.set_level(1);
            cell.worker = None;
        }
        true
    }

    /// Assign a citizen to a building, releasing any previous posting of
    /// that citizen and any previous occupant of the target cell.
    pub fn assign_citizen(&mut self, id: CitizenId, x: i32, z: i32) -> bool {
        if !self.citizens.contains_key(&id) {
            return false;
        }
        let kind = match self.grid.get(x, z) {
            Some(cell) if !cell.is_empty() => cell.kind(),
            _ => return false,
        };
        for (cx, cz) in Grid::coords() {
            if let Some(cell) = self.grid.get_mut(cx, cz) {
                if cell.worker == Some(id) {
                    cell.worker = None;
                }
            }
        }
        let displaced = self.grid.get(x, z).and_then(Building::worker);
        if let Some(previous) = displaced {
            if let Some(citizen) = self.citizens.get_mut(&previous) {
                citizen.set_job(CitizenJob::None);
            }
        }
        if let Some(cell) = self.grid.get_mut(x, z) {
            cell.worker = Some(id);
        }
        if let Some(citizen) = self.citizens.get_mut(&id) {
            citizen.set_job(kind.preferred_job());
        }
        true
    }

    // === Citizens ===

    pub fn citizen(&self, id: CitizenId) -> Option<&Citizen> {
        self.citizens.get(&id)
    }

    pub fn citizens(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.values()
    }

    pub fn citizen_count(&self) -> usize {
        self.citizens.len()
    }

    pub fn max_citizens(&self) -> u32 {
        self.max_citizens
    }

    /// Recruitment gets pricier as the settlement grows.
    pub fn recruitment_cost(&self) -> u32 {
        50 + 25 * self.citizens.len() as u32
    }

    pub fn can_recruit_citizen(&self) -> bool {
        (self.citizens.len() as u32) < self.max_citizens && self.coins >= self.recruitment_cost()
    }

    pub fn recruit_citizen(&mut self, rng: &mut impl Rng) -> Option<CitizenId> {
        if !self.can_recruit_citizen() {
            return None;
        }
        let cost = self.recruitment_cost();
        if !self.spend_coins(cost) {
            return None;
        }
        let id = CitizenId::from_raw(self.next_citizen_id);
        self.next_citizen_id += 1;
        self.citizens.insert(id, Citizen::new(id, rng));
        Some(id)
    }

    /// Pay the academy to grant exactly the XP needed for the citizen's
    /// next level. Requires the Academy tech and a built academy.
    pub fn train_citizen(&mut self, id: CitizenId) -> bool {
        if !self.tech.is_unlocked(TechNode::EducationI) {
            return false;
        }
        if self.grid.count(BuildingKind::Academy) == 0 {
            return false;
        }
        let (cost, needed) = match self.citizens.get(&id) {
            Some(citizen) if citizen.level() < MAX_LEVEL => {
                match (citizen.training_cost(), citizen.xp_for_next_level()) {
                    (Some(cost), Some(threshold)) => (cost, threshold),
                    _ => return false,
                }
            }
            _ => return false,
        };
        if !self.spend_coins(cost) {
            return false;
        }
        if let Some(citizen) = self.citizens.get_mut(&id) {
            citizen.add_xp(needed);
        }
        true
    }

    pub fn average_happiness(&self) -> u32 {
        if self.citizens.is_empty() {
            return 50;
        }
        let total: u32 = self.citizens.values().map(|c| u32::from(c.happiness())).sum();
        total / self.citizens.len() as u32
    }

    // === Economy ===

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn influence(&self) -> u32 {
        self.influence
    }

    /// Credit coins as earnings (tracked in the lifetime stats).
    pub fn add_coins(&mut self, amount: u32) {
        self.coins += amount;
        self.stats.total_coins_earned += u64::from(amount);
    }

    pub fn spend_coins(&mut self, amount: u32) -> bool {
        if self.coins < amount {
            return false;
        }
        self.coins -= amount;
        true
    }

    pub fn add_influence(&mut self, amount: u32) {
        self.influence += amount;
    }

    pub fn spend_influence(&mut self, amount: u32) -> bool {
        if self.influence < amount {
            return false;
        }
        self.influence -= amount;
        true
    }

    /// Daily influence from a content populace: one point per ten
    /// happiness above the 50 baseline, once average reaches 60.
    pub fn generate_daily_influence(&mut self) {
        let happiness = self.average_happiness();
        if happiness >= 60 {
            self.influence += (happiness - 50) / 10;
        }
    }

    pub fn stats(&self) -> SettlementStats {
        self.stats
    }

    pub(crate) fn add_items_produced(&mut self, count: u32) {
        self.stats.total_items_produced += u64::from(count);
    }

    pub(crate) fn increment_days_played(&mut self) {
        self.stats.days_played += 1;
    }

    // === Stockpile ===

    pub fn stockpile(&self) -> &Stockpile {
        &self.stockpile
    }

    /// Take resources out of the stockpile (e.g. to a player inventory).
    /// Returns the amount actually withdrawn.
    pub fn withdraw_resource(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let available = self.stockpile.count(kind);
        let accepted = amount.min(available);
        if accepted > 0 {
            self.stockpile.remove(kind, accepted);
        }
        accepted
    }

    /// Put resources into the stockpile, truncated at capacity.
    /// Returns the amount actually accepted.
    pub fn deposit_resource(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        self.stockpile.add(kind, amount)
    }

    // === Contracts ===

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn last_contract_refresh(&self) -> Option<u64> {
        self.last_contract_refresh
    }

    /// How many contracts a refresh produces, gated by logistics tech.
    pub fn contract_slots(&self) -> usize {
        if self.tech.is_unlocked(TechNode::ContractsII) {
            BASE_CONTRACT_COUNT + 2
        } else if self.tech.is_unlocked(TechNode::ContractsI) {
            BASE_CONTRACT_COUNT + 1
        } else {
            BASE_CONTRACT_COUNT
        }
    }

    /// Discard every active contract (complete or not) and draw a fresh
    /// batch sized by the unlocked logistics tier.
    pub fn generate_new_contracts(&mut self, rng: &mut impl Rng, now: u64) {
        self.contracts.clear();
        for _ in 0..self.contract_slots() {
            let id = self.next_contract_id;
            self.next_contract_id += 1;
            self.contracts.push(Contract::generate(id, rng, now));
        }
        self.last_contract_refresh = Some(now);
    }

    /// Move resources from the stockpile into a contract. The accepted
    /// amount is bounded by the request's remaining need and by what the
    /// stockpile holds; the reward pays out once on completion.
    pub fn deliver_to_contract(&mut self, contract_id: u64, amount: u32) -> u32 {
        let (kind, remaining) = match self.contracts.iter().find(|c| c.id() == contract_id) {
            Some(c) if !c.is_completed() => (c.kind(), c.remaining()),
            _ => return 0,
        };
        let accepted = amount.min(remaining).min(self.stockpile.count(kind));
        if accepted == 0 {
            return 0;
        }
        if !self.stockpile.remove(kind, accepted) {
            return 0;
        }
        let mut reward = None;
        if let Some(contract) = self.contracts.iter_mut().find(|c| c.id() == contract_id) {
            contract.deliver(accepted);
            if contract.is_completed() {
                reward = Some(contract.reward());
            }
        }
        if let Some(reward) = reward {
            self.add_coins(reward);
        }
        accepted
    }

    // === Tech ===

    pub fn tech(&self) -> &TechTree {
        &self.tech
    }

    /// Unlock a tech node, debiting both costs. Storage nodes raise the
    /// stockpile capacity as a side effect.
    pub fn unlock_tech(&mut self, node: TechNode) -> bool {
        if !self.tech.can_unlock(node, self.coins, self.influence) {
            return false;
        }
        if !self.spend_coins(node.coin_cost()) {
            return false;
        }
        if !self.spend_influence(node.influence_cost()) {
            // Roll back the coin debit; can_unlock makes this unreachable
            // in practice.
            self.coins += node.coin_cost();
            return false;
        }
        self.tech.unlock(node);
        match node {
            TechNode::StorageI => self.stockpile.raise_capacity(500),
            TechNode::StorageII => self.stockpile.raise_capacity(1000),
            TechNode::StorageIII => self.stockpile.raise_capacity(2500),
            _ => {}
        }
        true
    }
}
