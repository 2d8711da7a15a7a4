//! The technology tree: a DAG of unlockable nodes gated by prerequisites
//! and coin/influence costs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechBranch {
    None,
    Industry,
    Civics,
    Logistics,
}

impl TechBranch {
    pub fn label(self) -> &'static str {
        match self {
            TechBranch::None => "None",
            TechBranch::Industry => "Industry",
            TechBranch::Civics => "Civics",
            TechBranch::Logistics => "Logistics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechNode {
    SettlementBasics,
    // Industry
    FarmingI,
    FarmingII,
    FarmingIII,
    MiningI,
    MiningII,
    MiningIII,
    ForestryI,
    ForestryII,
    RanchingI,
    RanchingII,
    // Civics
    HousingI,
    HousingII,
    CommerceI,
    CommerceII,
    EducationI,
    EducationII,
    DefenseI,
    DefenseII,
    // Logistics
    StorageI,
    StorageII,
    StorageIII,
    AutomationI,
    AutomationII,
    ContractsI,
    ContractsII,
}

impl TechNode {
    pub const ALL: [TechNode; 26] = [
        TechNode::SettlementBasics,
        TechNode::FarmingI,
        TechNode::FarmingII,
        TechNode::FarmingIII,
        TechNode::MiningI,
        TechNode::MiningII,
        TechNode::MiningIII,
        TechNode::ForestryI,
        TechNode::ForestryII,
        TechNode::RanchingI,
        TechNode::RanchingII,
        TechNode::HousingI,
        TechNode::HousingII,
        TechNode::CommerceI,
        TechNode::CommerceII,
        TechNode::EducationI,
        TechNode::EducationII,
        TechNode::DefenseI,
        TechNode::DefenseII,
        TechNode::StorageI,
        TechNode::StorageII,
        TechNode::StorageIII,
        TechNode::AutomationI,
        TechNode::AutomationII,
        TechNode::ContractsI,
        TechNode::ContractsII,
    ];

    /// Stable identifier used in persisted documents.
    pub fn id(self) -> &'static str {
        match self {
            TechNode::SettlementBasics => "settlement_basics",
            TechNode::FarmingI => "farming_1",
            TechNode::FarmingII => "farming_2",
            TechNode::FarmingIII => "farming_3",
            TechNode::MiningI => "mining_1",
            TechNode::MiningII => "mining_2",
            TechNode::MiningIII => "mining_3",
            TechNode::ForestryI => "forestry_1",
            TechNode::ForestryII => "forestry_2",
            TechNode::RanchingI => "ranching_1",
            TechNode::RanchingII => "ranching_2",
            TechNode::HousingI => "housing_1",
            TechNode::HousingII => "housing_2",
            TechNode::CommerceI => "commerce_1",
            TechNode::CommerceII => "commerce_2",
            TechNode::EducationI => "education_1",
            TechNode::EducationII => "education_2",
            TechNode::DefenseI => "defense_1",
            TechNode::DefenseII => "defense_2",
            TechNode::StorageI => "storage_1",
            TechNode::StorageII => "storage_2",
            TechNode::StorageIII => "storage_3",
            TechNode::AutomationI => "automation_1",
            TechNode::AutomationII => "automation_2",
            TechNode::ContractsI => "contracts_1",
            TechNode::ContractsII => "contracts_2",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|node| node.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            TechNode::SettlementBasics => "Settlement Basics",
            TechNode::FarmingI => "Basic Farming",
            TechNode::FarmingII => "Advanced Crops",
            TechNode::FarmingIII => "Master Agriculture",
            TechNode::MiningI => "Basic Mining",
            TechNode::MiningII => "Deep Mining",
            TechNode::MiningIII => "Gem Extraction",
            TechNode::ForestryI => "Forestry",
            TechNode::ForestryII => "Advanced Forestry",
            TechNode::RanchingI => "Animal Husbandry",
            TechNode::RanchingII => "Advanced Ranching",
            TechNode::HousingI => "Basic Housing",
            TechNode::HousingII => "Comfortable Homes",
            TechNode::CommerceI => "Marketplace",
            TechNode::CommerceII => "Banking",
            TechNode::EducationI => "Academy",
            TechNode::EducationII => "Advanced Studies",
            TechNode::DefenseI => "Guard Tower",
            TechNode::DefenseII => "Militia",
            TechNode::StorageI => "Expanded Storage",
            TechNode::StorageII => "Warehouses",
            TechNode::StorageIII => "Mass Storage",
            TechNode::AutomationI => "Auto-Collection",
            TechNode::AutomationII => "Auto-Feed",
            TechNode::ContractsI => "Trade Routes",
            TechNode::ContractsII => "Merchant Guild",
        }
    }

    pub fn branch(self) -> TechBranch {
        match self {
            TechNode::SettlementBasics => TechBranch::None,
            TechNode::FarmingI
            | TechNode::FarmingII
            | TechNode::FarmingIII
            | TechNode::MiningI
            | TechNode::MiningII
            | TechNode::MiningIII
            | TechNode::ForestryI
            | TechNode::ForestryII
            | TechNode::RanchingI
            | TechNode::RanchingII => TechBranch::Industry,
            TechNode::HousingI
            | TechNode::HousingII
            | TechNode::CommerceI
            | TechNode::CommerceII
            | TechNode::EducationI
            | TechNode::EducationII
            | TechNode::DefenseI
            | TechNode::DefenseII => TechBranch::Civics,
            TechNode::StorageI
            | TechNode::StorageII
            | TechNode::StorageIII
            | TechNode::AutomationI
            | TechNode::AutomationII
            | TechNode::ContractsI
            | TechNode::ContractsII => TechBranch::Logistics,
        }
    }

    pub fn coin_cost(self) -> u32 {
        match self {
            TechNode::SettlementBasics => 0,
            TechNode::FarmingI => 100,
            TechNode::FarmingII => 250,
            TechNode::FarmingIII => 500,
            TechNode::MiningI => 150,
            TechNode::MiningII => 350,
            TechNode::MiningIII => 600,
            TechNode::ForestryI => 120,
            TechNode::ForestryII => 300,
            TechNode::RanchingI => 200,
            TechNode::RanchingII => 400,
            TechNode::HousingI => 100,
            TechNode::HousingII => 250,
            TechNode::CommerceI => 200,
            TechNode::CommerceII => 500,
            TechNode::EducationI => 300,
            TechNode::EducationII => 600,
            TechNode::DefenseI => 350,
            TechNode::DefenseII => 700,
            TechNode::StorageI => 150,
            TechNode::StorageII => 350,
            TechNode::StorageIII => 600,
            TechNode::AutomationI => 250,
            TechNode::AutomationII => 450,
            TechNode::ContractsI => 200,
            TechNode::ContractsII => 500,
        }
    }

    pub fn influence_cost(self) -> u32 {
        match self {
            TechNode::SettlementBasics => 0,
            TechNode::FarmingI => 0,
            TechNode::FarmingII => 10,
            TechNode::FarmingIII => 25,
            TechNode::MiningI => 0,
            TechNode::MiningII => 15,
            TechNode::MiningIII => 30,
            TechNode::ForestryI => 0,
            TechNode::ForestryII => 10,
            TechNode::RanchingI => 5,
            TechNode::RanchingII => 20,
            TechNode::HousingI => 5,
            TechNode::HousingII => 15,
            TechNode::CommerceI => 10,
            TechNode::CommerceII => 25,
            TechNode::EducationI => 15,
            TechNode::EducationII => 35,
            TechNode::DefenseI => 20,
            TechNode::DefenseII => 40,
            TechNode::StorageI => 5,
            TechNode::StorageII => 15,
            TechNode::StorageIII => 30,
            TechNode::AutomationI => 10,
            TechNode::AutomationII => 20,
            TechNode::ContractsI => 10,
            TechNode::ContractsII => 25,
        }
    }

    /// Direct prerequisite edges of the DAG.
    pub fn prerequisites(self) -> &'static [TechNode] {
        match self {
            TechNode::SettlementBasics => &[],
            TechNode::FarmingI => &[TechNode::SettlementBasics],
            TechNode::FarmingII => &[TechNode::FarmingI],
            TechNode::FarmingIII => &[TechNode::FarmingII],
            TechNode::MiningI => &[TechNode::SettlementBasics],
            TechNode::MiningII => &[TechNode::MiningI],
            TechNode::MiningIII => &[TechNode::MiningII],
            TechNode::ForestryI => &[TechNode::SettlementBasics],
            TechNode::ForestryII => &[TechNode::ForestryI],
            TechNode::RanchingI => &[TechNode::FarmingI],
            TechNode::RanchingII => &[TechNode::RanchingI],
            TechNode::HousingI => &[TechNode::SettlementBasics],
            TechNode::HousingII => &[TechNode::HousingI],
            TechNode::CommerceI => &[TechNode::HousingI],
            TechNode::CommerceII => &[TechNode::CommerceI],
            TechNode::EducationI => &[TechNode::HousingI],
            TechNode::EducationII => &[TechNode::EducationI],
            TechNode::DefenseI => &[TechNode::HousingI],
            TechNode::DefenseII => &[TechNode::DefenseI],
            TechNode::StorageI => &[TechNode::SettlementBasics],
            TechNode::StorageII => &[TechNode::StorageI],
            TechNode::StorageIII => &[TechNode::StorageII],
            TechNode::AutomationI => &[TechNode::StorageI],
            TechNode::AutomationII => &[TechNode::AutomationI],
            TechNode::ContractsI => &[TechNode::CommerceI],
            TechNode::ContractsII => &[TechNode::ContractsI],
        }
    }
}

/// Unlock state over the tech node graph. Unlocks are monotonic: a node
/// is never revoked once unlocked, and the root node is always unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechTree {
    unlocked: BTreeSet<TechNode>,
}

impl Default for TechTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TechTree {
    pub fn new() -> Self {
        let mut unlocked = BTreeSet::new();
        unlocked.insert(TechNode::SettlementBasics);
        Self { unlocked }
    }

    pub fn is_unlocked(&self, node: TechNode) -> bool {
        self.unlocked.contains(&node)
    }

    /// A node is unlockable when it is still locked, every direct
    /// prerequisite is unlocked, and both costs are affordable.
    pub fn can_unlock(&self, node: TechNode, coins: u32, influence: u32) -> bool {
        if self.is_unlocked(node) {
            return false;
        }
        if node.prerequisites().iter().any(|p| !self.is_unlocked(*p)) {
            return false;
        }
        coins >= node.coin_cost() && influence >= node.influence_cost()
    }

    /// Mark a node unlocked. Idempotent; never touches the economy —
    /// the caller debits costs before calling.
    pub fn unlock(&mut self, node: TechNode) -> bool {
        self.unlocked.insert(node)
    }

    /// Nodes unlockable right now, for UI enumeration.
    pub fn available_nodes(&self, coins: u32, influence: u32) -> Vec<TechNode> {
        TechNode::ALL
            .into_iter()
            .filter(|node| self.can_unlock(*node, coins, influence))
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    pub fn unlocked(&self) -> impl Iterator<Item = TechNode> + '_ {
        self.unlocked.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_starts_unlocked() {
        let tree = TechTree::new();
        assert!(tree.is_unlocked(TechNode::SettlementBasics));
        assert_eq!(tree.unlocked_count(), 1);
    }

    #[test]
    fn prerequisites_gate_unlocking() {
        let mut tree = TechTree::new();
        // MiningII needs MiningI.
        assert!(!tree.can_unlock(TechNode::MiningII, 10_000, 10_000));
        assert!(tree.can_unlock(TechNode::MiningI, 150, 0));
        tree.unlock(TechNode::MiningI);
        assert!(tree.can_unlock(TechNode::MiningII, 350, 15));
    }

    #[test]
    fn costs_gate_unlocking() {
        let tree = TechTree::new();
        assert!(!tree.can_unlock(TechNode::MiningI, 149, 0));
        assert!(tree.can_unlock(TechNode::MiningI, 150, 0));
        assert!(!tree.can_unlock(TechNode::HousingI, 100, 4));
        assert!(tree.can_unlock(TechNode::HousingI, 100, 5));
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut tree = TechTree::new();
        assert!(tree.unlock(TechNode::MiningI));
        assert!(!tree.unlock(TechNode::MiningI));
        assert!(!tree.can_unlock(TechNode::MiningI, u32::MAX, u32::MAX));
    }

    #[test]
    fn graph_is_acyclic() {
        // Walk every node's transitive prerequisites; a cycle would
        // revisit the starting node.
        fn visit(node: TechNode, origin: TechNode, depth: usize) {
            assert!(depth < TechNode::ALL.len(), "prerequisite cycle");
            for prereq in node.prerequisites() {
                assert_ne!(*prereq, origin, "cycle through {:?}", origin);
                visit(*prereq, origin, depth + 1);
            }
        }
        for node in TechNode::ALL {
            visit(node, node, 0);
        }
    }

    #[test]
    fn ids_round_trip() {
        for node in TechNode::ALL {
            assert_eq!(TechNode::from_id(node.id()), Some(node));
        }
    }
}
