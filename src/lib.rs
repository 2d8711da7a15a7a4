//! Tick-driven settlement economy simulation.
//!
//! A settlement is a 7x7 building grid, a citizen roster, a shared
//! stockpile, a tech tree, and a ledger of delivery contracts, all
//! advanced by a [`tick::TickManager`] that runs one simulation step per
//! fixed host-tick interval. [`registry::WorldRegistry`] keeps one
//! settlement per named world and persists each as a JSON file.

pub mod building;
pub mod citizen;
pub mod config;
pub mod contract;
pub mod persist;
pub mod registry;
pub mod resource;
pub mod settlement;
pub mod tech;
pub mod tick;

pub use config::SimConfig;
pub use registry::WorldRegistry;
pub use settlement::Settlement;
pub use tick::TickManager;
