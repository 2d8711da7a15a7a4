//! Building kinds, per-cell building state, and the fixed settlement grid.

use serde::{Deserialize, Serialize};

use crate::citizen::{CitizenId, CitizenJob};
use crate::tech::TechNode;

pub const GRID_SIZE: i32 = 7;
pub const MAX_BUILDING_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    #[default]
    Empty,
    House,
    Greenhouse,
    Quarry,
    LumberYard,
    MobBarn,
    Market,
    Bank,
    Academy,
    GuardTower,
    TownHall,
}

/// Happiness-relevant category a building projects onto adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacencyBonus {
    None,
    Housing,
    Commerce,
    Pollution,
    Nature,
    Security,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 11] = [
        BuildingKind::Empty,
        BuildingKind::House,
        BuildingKind::Greenhouse,
        BuildingKind::Quarry,
        BuildingKind::LumberYard,
        BuildingKind::MobBarn,
        BuildingKind::Market,
        BuildingKind::Bank,
        BuildingKind::Academy,
        BuildingKind::GuardTower,
        BuildingKind::TownHall,
    ];

    /// Stable identifier used in persisted documents.
    pub fn id(self) -> &'static str {
        match self {
            BuildingKind::Empty => "empty",
            BuildingKind::House => "house",
            BuildingKind::Greenhouse => "greenhouse",
            BuildingKind::Quarry => "quarry",
            BuildingKind::LumberYard => "lumber_yard",
            BuildingKind::MobBarn => "mob_barn",
            BuildingKind::Market => "market",
            BuildingKind::Bank => "bank",
            BuildingKind::Academy => "academy",
            BuildingKind::GuardTower => "guard_tower",
            BuildingKind::TownHall => "town_hall",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            BuildingKind::Empty => "Empty Plot",
            BuildingKind::House => "House",
            BuildingKind::Greenhouse => "Greenhouse",
            BuildingKind::Quarry => "Quarry",
            BuildingKind::LumberYard => "Lumber Yard",
            BuildingKind::MobBarn => "Mob Barn",
            BuildingKind::Market => "Market",
            BuildingKind::Bank => "Bank",
            BuildingKind::Academy => "Academy",
            BuildingKind::GuardTower => "Guard Tower",
            BuildingKind::TownHall => "Town Hall",
        }
    }

    pub fn base_cost(self) -> u32 {
        match self {
            BuildingKind::Empty => 0,
            BuildingKind::House => 100,
            BuildingKind::Greenhouse => 250,
            BuildingKind::Quarry => 300,
            BuildingKind::LumberYard => 200,
            BuildingKind::MobBarn => 350,
            BuildingKind::Market => 500,
            BuildingKind::Bank => 1000,
            BuildingKind::Academy => 750,
            BuildingKind::GuardTower => 400,
            BuildingKind::TownHall => 2000,
        }
    }

    pub fn upgrade_cost(self, to_level: u8) -> u32 {
        self.base_cost() / 2 * u32::from(to_level)
    }

    /// Nominal production cycle length in raw host ticks (20 ticks per
    /// simulated second). Zero for non-producers.
    pub fn base_production_time(self) -> u32 {
        match self {
            BuildingKind::Greenhouse => 200,
            BuildingKind::Quarry => 300,
            BuildingKind::LumberYard => 250,
            BuildingKind::MobBarn => 400,
            _ => 0,
        }
    }

    pub fn is_producer(self) -> bool {
        matches!(
            self,
            BuildingKind::Greenhouse
                | BuildingKind::Quarry
                | BuildingKind::LumberYard
                | BuildingKind::MobBarn
        )
    }

    pub fn preferred_job(self) -> CitizenJob {
        match self {
            BuildingKind::Greenhouse => CitizenJob::Farmer,
            BuildingKind::Quarry => CitizenJob::Miner,
            BuildingKind::LumberYard => CitizenJob::Lumberjack,
            BuildingKind::MobBarn => CitizenJob::Rancher,
            BuildingKind::Market => CitizenJob::Merchant,
            BuildingKind::Academy => CitizenJob::Scholar,
            BuildingKind::GuardTower => CitizenJob::Guard,
            _ => CitizenJob::None,
        }
    }

    pub fn adjacency_bonus(self) -> AdjacencyBonus {
        match self {
            BuildingKind::House => AdjacencyBonus::Housing,
            BuildingKind::Market => AdjacencyBonus::Commerce,
            BuildingKind::Quarry => AdjacencyBonus::Pollution,
            BuildingKind::Greenhouse => AdjacencyBonus::Nature,
            BuildingKind::GuardTower => AdjacencyBonus::Security,
            _ => AdjacencyBonus::None,
        }
    }

    /// Tech node that must be unlocked before this kind can be built.
    pub fn required_tech(self) -> Option<TechNode> {
        match self {
            BuildingKind::Greenhouse => Some(TechNode::FarmingI),
            BuildingKind::Quarry => Some(TechNode::MiningI),
            BuildingKind::LumberYard => Some(TechNode::ForestryI),
            BuildingKind::MobBarn => Some(TechNode::RanchingI),
            BuildingKind::House => Some(TechNode::HousingI),
            BuildingKind::Market => Some(TechNode::CommerceI),
            BuildingKind::Bank => Some(TechNode::CommerceII),
            BuildingKind::Academy => Some(TechNode::EducationI),
            BuildingKind::GuardTower => Some(TechNode::DefenseI),
            BuildingKind::Empty | BuildingKind::TownHall => None,
        }
    }
}

/// One grid cell: kind, level, production progress, optional worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    pub(crate) kind: BuildingKind,
    pub(crate) level: u8,
    pub(crate) progress: u32,
    pub(crate) worker: Option<CitizenId>,
}

impl Default for Building {
    fn default() -> Self {
        Self::new()
    }
}

impl Building {
    pub fn new() -> Self {
        Self::with_kind(BuildingKind::Empty)
    }

    pub fn with_kind(kind: BuildingKind) -> Self {
        Self {
            kind,
            level: 1,
            progress: 0,
            worker: None,
        }
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// Change the building kind; production progress always resets.
    pub(crate) fn set_kind(&mut self, kind: BuildingKind) {
        self.kind = kind;
        self.progress = 0;
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub(crate) fn set_level(&mut self, level: u8) {
        self.level = level.clamp(1, MAX_BUILDING_LEVEL);
    }

    pub(crate) fn upgrade(&mut self) {
        if self.level < MAX_BUILDING_LEVEL {
            self.level += 1;
        }
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Accumulate production progress, capped at 100. Non-producer kinds
    /// never accumulate.
    pub(crate) fn add_progress(&mut self, amount: u32) {
        if self.kind.is_producer() {
            self.progress = (self.progress + amount).min(100);
        }
    }

    pub fn production_ready(&self) -> bool {
        self.progress >= 100
    }

    pub(crate) fn reset_progress(&mut self) {
        self.progress = 0;
    }

    pub fn worker(&self) -> Option<CitizenId> {
        self.worker
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == BuildingKind::Empty
    }

    /// Production efficiency percentage: 75 + 25 per building level,
    /// plus 20 per worker level when staffed. The two terms are additive
    /// so building tier and worker skill each scale output linearly.
    pub fn efficiency(&self, worker_level: Option<u8>) -> u32 {
        let base = 75 + 25 * u32::from(self.level);
        match worker_level {
            Some(level) => base + 20 * u32::from(level),
            None => base,
        }
    }
}

/// Fixed 7x7 board of building cells. Out-of-range coordinates answer
/// `None` rather than panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Building>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        let cells = (0..GRID_SIZE * GRID_SIZE).map(|_| Building::new()).collect();
        Self { cells }
    }

    fn index(x: i32, z: i32) -> Option<usize> {
        if (0..GRID_SIZE).contains(&x) && (0..GRID_SIZE).contains(&z) {
            Some((z * GRID_SIZE + x) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, z: i32) -> Option<&Building> {
        Self::index(x, z).map(|i| &self.cells[i])
    }

    pub(crate) fn get_mut(&mut self, x: i32, z: i32) -> Option<&mut Building> {
        Self::index(x, z).map(|i| &mut self.cells[i])
    }

    /// The up-to-four cardinal neighbors of a cell; edge cells get fewer.
    pub fn adjacent(&self, x: i32, z: i32) -> Vec<&Building> {
        [(x, z - 1), (x, z + 1), (x + 1, z), (x - 1, z)]
            .into_iter()
            .filter_map(|(nx, nz)| self.get(nx, nz))
            .collect()
    }

    pub fn count(&self, kind: BuildingKind) -> usize {
        self.cells.iter().filter(|b| b.kind == kind).count()
    }

    /// All coordinates in row-major order.
    pub fn coords() -> impl Iterator<Item = (i32, i32)> {
        (0..GRID_SIZE).flat_map(|z| (0..GRID_SIZE).map(move |x| (x, z)))
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), &Building)> {
        Self::coords().map(move |(x, z)| {
            ((x, z), &self.cells[(z * GRID_SIZE + x) as usize])
        })
    }
}
