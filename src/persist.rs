//! Settlement <-> JSON document conversion.
//!
//! Encoding is explicit and keyed rather than derived so the document
//! layout stays stable across refactors. Decoding is tolerant: missing
//! or malformed fields fall back to fresh-settlement defaults and
//! unknown identifiers are skipped, so a load never fails outright.

use serde_json::{json, Map, Value};

use crate::building::{BuildingKind, Grid, MAX_BUILDING_LEVEL};
use crate::citizen::{Citizen, CitizenId, CitizenJob, MAX_LEVEL};
use crate::contract::Contract;
use crate::resource::ResourceKind;
use crate::settlement::{Settlement, STARTING_COINS, STARTING_MAX_CITIZENS};
use crate::tech::{TechNode, TechTree};

pub fn save(settlement: &Settlement) -> Value {
    let grid: Vec<Value> = settlement
        .grid()
        .iter()
        .map(|(_, building)| {
            let mut cell = Map::new();
            cell.insert("type".into(), json!(building.kind().id()));
            cell.insert("level".into(), json!(building.level()));
            cell.insert("progress".into(), json!(building.progress()));
            if let Some(worker) = building.worker() {
                cell.insert("citizen".into(), json!(worker.raw()));
            }
            Value::Object(cell)
        })
        .collect();

    let citizens: Vec<Value> = settlement
        .citizens()
        .map(|citizen| {
            json!({
                "id": citizen.id().raw(),
                "name": citizen.name(),
                "job": citizen.job().id(),
                "level": citizen.level(),
                "xp": citizen.xp(),
                "happiness": citizen.happiness(),
            })
        })
        .collect();

    let resources: Map<String, Value> = settlement
        .stockpile()
        .entries()
        .iter()
        .map(|(kind, count)| (kind.id().to_string(), json!(count)))
        .collect();

    let contracts: Vec<Value> = settlement
        .contracts()
        .iter()
        .map(|contract| {
            json!({
                "id": contract.id(),
                "item": contract.kind().id(),
                "amount": contract.requested(),
                "reward": contract.reward(),
                "delivered": contract.delivered(),
                "completed": contract.is_completed(),
                "expires": contract.expires_at(),
            })
        })
        .collect();

    let techs: Vec<Value> = settlement
        .tech()
        .unlocked()
        .map(|node| json!(node.id()))
        .collect();

    let mut doc = Map::new();
    doc.insert("grid".into(), Value::Array(grid));
    doc.insert("citizens".into(), Value::Array(citizens));
    doc.insert("maxCitizens".into(), json!(settlement.max_citizens()));
    doc.insert("coins".into(), json!(settlement.coins()));
    doc.insert("influence".into(), json!(settlement.influence()));
    doc.insert(
        "stockpile".into(),
        json!({
            "maxCapacity": settlement.stockpile().capacity(),
            "resources": resources,
        }),
    );
    doc.insert("contracts".into(), Value::Array(contracts));
    if let Some(refresh) = settlement.last_contract_refresh() {
        doc.insert("lastContractRefresh".into(), json!(refresh));
    }
    doc.insert("techs".into(), Value::Array(techs));
    let stats = settlement.stats();
    doc.insert("totalCoinsEarned".into(), json!(stats.total_coins_earned));
    doc.insert("totalItemsProduced".into(), json!(stats.total_items_produced));
    doc.insert("daysPlayed".into(), json!(stats.days_played));
    doc.insert("nextCitizenId".into(), json!(settlement.next_citizen_id));
    doc.insert("nextContractId".into(), json!(settlement.next_contract_id));
    Value::Object(doc)
}

pub fn load(doc: &Value) -> Settlement {
    let mut settlement = Settlement::new();

    load_grid(doc, &mut settlement.grid);
    load_citizens(doc, &mut settlement);
    settlement.max_citizens = u32_field(doc, "maxCitizens", STARTING_MAX_CITIZENS)
        .max(STARTING_MAX_CITIZENS);
    settlement.coins = u32_field(doc, "coins", STARTING_COINS);
    settlement.influence = u32_field(doc, "influence", 0);
    load_stockpile(doc, &mut settlement);
    load_contracts(doc, &mut settlement);
    settlement.last_contract_refresh = doc.get("lastContractRefresh").and_then(Value::as_u64);
    settlement.tech = load_techs(doc);
    settlement.stats.total_coins_earned = u64_field(doc, "totalCoinsEarned", 0);
    settlement.stats.total_items_produced = u64_field(doc, "totalItemsProduced", 0);
    settlement.stats.days_played = u32_field(doc, "daysPlayed", 0);

    // Id counters must stay ahead of every persisted id, even in documents
    // written before the counters were recorded.
    let max_citizen = settlement.citizens.keys().map(|id| id.raw() + 1).max();
    settlement.next_citizen_id =
        u64_field(doc, "nextCitizenId", 0).max(max_citizen.unwrap_or(0));
    let max_contract = settlement.contracts.iter().map(|c| c.id() + 1).max();
    settlement.next_contract_id =
        u64_field(doc, "nextContractId", 0).max(max_contract.unwrap_or(0));

    // Stale worker references (citizen ids that no longer exist) are
    // cleared rather than carried.
    for (x, z) in Grid::coords() {
        if let Some(cell) = settlement.grid.get_mut(x, z) {
            if let Some(worker) = cell.worker {
                if !settlement.citizens.contains_key(&worker) {
                    cell.worker = None;
                }
            }
        }
    }

    settlement
}

fn load_grid(doc: &Value, grid: &mut Grid) {
    let cells = match doc.get("grid").and_then(Value::as_array) {
        Some(cells) => cells,
        None => return,
    };
    for ((x, z), entry) in Grid::coords().zip(cells) {
        let cell = match grid.get_mut(x, z) {
            Some(cell) => cell,
            None => continue,
        };
        let kind = entry
            .get("type")
            .and_then(Value::as_str)
            .and_then(BuildingKind::from_id)
            .unwrap_or(BuildingKind::Empty);
        cell.set_kind(kind);
        cell.set_level(clamped_u8(entry, "level", 1, MAX_BUILDING_LEVEL));
        let progress = entry
            .get("progress")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .min(100) as u32;
        cell.progress = if kind.is_producer() { progress } else { 0 };
        cell.worker = entry
            .get("citizen")
            .and_then(Value::as_u64)
            .map(CitizenId::from_raw);
    }
}

fn load_citizens(doc: &Value, settlement: &mut Settlement) {
    let entries = match doc.get("citizens").and_then(Value::as_array) {
        Some(entries) => entries,
        None => return,
    };
    for entry in entries {
        let id = match entry.get("id").and_then(Value::as_u64) {
            Some(raw) => CitizenId::from_raw(raw),
            None => continue,
        };
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Settler")
            .to_string();
        let mut citizen = Citizen::with_name(id, name);
        citizen.job = entry
            .get("job")
            .and_then(Value::as_str)
            .and_then(CitizenJob::from_id)
            .unwrap_or(CitizenJob::None);
        citizen.level = clamped_u8(entry, "level", 1, MAX_LEVEL);
        citizen.xp = u32_field(entry, "xp", 0);
        citizen.happiness = entry
            .get("happiness")
            .and_then(Value::as_u64)
            .map_or(50, |value| value.min(100) as u8);
        settlement.citizens.insert(id, citizen);
    }
}

fn load_stockpile(doc: &Value, settlement: &mut Settlement) {
    let stockpile = match doc.get("stockpile") {
        Some(stockpile) => stockpile,
        None => return,
    };
    if let Some(capacity) = stockpile.get("maxCapacity").and_then(Value::as_u64) {
        settlement.stockpile.set_capacity(capacity.min(u64::from(u32::MAX)) as u32);
    }
    let resources = match stockpile.get("resources").and_then(Value::as_object) {
        Some(resources) => resources,
        None => return,
    };
    for (id, count) in resources {
        let kind = match ResourceKind::from_id(id) {
            Some(kind) => kind,
            None => continue,
        };
        if let Some(count) = count.as_u64() {
            settlement.stockpile.add(kind, count.min(u64::from(u32::MAX)) as u32);
        }
    }
}

fn load_contracts(doc: &Value, settlement: &mut Settlement) {
    let entries = match doc.get("contracts").and_then(Value::as_array) {
        Some(entries) => entries,
        None => return,
    };
    for entry in entries {
        let kind = match entry
            .get("item")
            .and_then(Value::as_str)
            .and_then(ResourceKind::from_id)
        {
            Some(kind) => kind,
            None => continue,
        };
        let requested = u32_field(entry, "amount", 0);
        if requested == 0 {
            continue;
        }
        let delivered = u32_field(entry, "delivered", 0).min(requested);
        settlement.contracts.push(Contract {
            id: u64_field(entry, "id", 0),
            kind,
            requested,
            reward: u32_field(entry, "reward", 0),
            delivered,
            completed: entry
                .get("completed")
                .and_then(Value::as_bool)
                .unwrap_or(delivered >= requested),
            expires_at: u64_field(entry, "expires", 0),
        });
    }
}

fn load_techs(doc: &Value) -> TechTree {
    // The root node is part of TechTree::new(); re-adding it is a no-op.
    let mut tech = TechTree::new();
    if let Some(entries) = doc.get("techs").and_then(Value::as_array) {
        for entry in entries {
            if let Some(node) = entry.as_str().and_then(TechNode::from_id) {
                tech.unlock(node);
            }
        }
    }
    tech
}

fn u32_field(doc: &Value, key: &str, default: u32) -> u32 {
    doc.get(key)
        .and_then(Value::as_u64)
        .map_or(default, |value| value.min(u64::from(u32::MAX)) as u32)
}

fn u64_field(doc: &Value, key: &str, default: u64) -> u64 {
    doc.get(key).and_then(Value::as_u64).unwrap_or(default)
}

fn clamped_u8(doc: &Value, key: &str, min: u8, max: u8) -> u8 {
    doc.get(key)
        .and_then(Value::as_u64)
        .map_or(min, |value| value.min(u64::from(max)) as u8)
        .clamp(min, max)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_document_loads_as_fresh_settlement() {
        let loaded = load(&json!({}));
        assert_eq!(loaded, Settlement::new());
    }

    #[test]
    fn unknown_identifiers_are_skipped() {
        let doc = json!({
            "grid": [{"type": "wizard_tower", "level": 3}],
            "citizens": [
                {"id": 0, "name": "Ada", "job": "alchemist", "level": 2, "xp": 10, "happiness": 70},
            ],
            "stockpile": {"maxCapacity": 1000, "resources": {"mithril": 40, "stone": 12}},
            "techs": ["farming_1", "levitation_9"],
        });
        let loaded = load(&doc);
        // Unknown building kind decodes as an empty plot with no progress.
        let cell = loaded.building(0, 0).expect("cell");
        assert!(cell.is_empty());
        // Unknown job falls back to unemployed; the citizen survives.
        let citizen = loaded.citizen(CitizenId::from_raw(0)).expect("citizen");
        assert_eq!(citizen.job(), CitizenJob::None);
        assert_eq!(citizen.level(), 2);
        // Unknown resources and techs are dropped, known ones kept.
        assert_eq!(loaded.stockpile().count(ResourceKind::Stone), 12);
        assert_eq!(loaded.stockpile().total_stored(), 12);
        assert!(loaded.tech().is_unlocked(TechNode::FarmingI));
    }

    #[test]
    fn stale_worker_references_are_cleared() {
        let doc = json!({
            "grid": [{"type": "quarry", "level": 1, "progress": 10, "citizen": 99}],
        });
        let loaded = load(&doc);
        let cell = loaded.building(0, 0).expect("cell");
        assert_eq!(cell.kind(), BuildingKind::Quarry);
        assert!(!cell.has_worker());
    }

    #[test]
    fn id_counters_stay_ahead_of_persisted_ids() {
        let doc = json!({
            "citizens": [{"id": 7, "name": "Ada"}],
            "contracts": [
                {"id": 12, "item": "wheat", "amount": 50, "reward": 100, "delivered": 0,
                 "completed": false, "expires": 24000},
            ],
        });
        let loaded = load(&doc);
        assert_eq!(loaded.next_citizen_id, 8);
        assert_eq!(loaded.next_contract_id, 13);
    }

    #[test]
    fn populated_settlement_round_trips() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut s = Settlement::new();
        s.coins = 10_000;
        s.influence = 40;
        s.tech.unlock(TechNode::MiningI);
        s.tech.unlock(TechNode::HousingI);
        assert!(s.construct_building(0, 0, BuildingKind::Quarry));
        assert!(s.construct_building(6, 6, BuildingKind::House));
        let worker = s.recruit_citizen(&mut rng).expect("recruit");
        assert!(s.assign_citizen(worker, 0, 0));
        s.deposit_resource(ResourceKind::Stone, 250);
        s.generate_new_contracts(&mut rng, 120);
        s.deliver_to_contract(s.contracts()[0].id(), 10);
        s.add_coins(25);
        s.increment_days_played();

        let restored = load(&save(&s));
        assert_eq!(restored, s);
    }
}
