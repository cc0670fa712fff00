//! # Colony Core
//!
//! Deterministic simulation engine for an incremental colony-management game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (persistence goes through the [`store::ColonyStore`] trait)
//! - No system randomness or clock reads (callers pass `now`)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Offline catch-up over arbitrary time gaps in one tick
//! - Headless tools and schedulers
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`simulation`] - Tick orchestrator and command surface
//! - [`economy`] - Production rates, energy balance and storage
//! - [`production`] - Building, research and shipyard queues
//! - [`fleet`] - Fleet dispatch, travel and arrival resolution
//! - [`combat`] - Value-based battle resolution
//! - [`map_generation`] - Seeded hex map with NPC garrisons
//! - [`data`] - Static data tables, built in or loaded from RON
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod colony;
pub mod combat;
pub mod config;
pub mod coords;
pub mod data;
pub mod economy;
pub mod error;
pub mod fleet;
pub mod kinds;
pub mod map_generation;
pub mod math;
pub mod production;
pub mod resources;
pub mod simulation;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::colony::{Colony, EntityId, Visibility};
    pub use crate::combat::{simulate_combat, CombatReport, Forces, Winner};
    pub use crate::config::EngineConfig;
    pub use crate::coords::Coord;
    pub use crate::data::{ResourceCost, StaticData};
    pub use crate::economy::ProductionRates;
    pub use crate::error::{ColonyError, Result};
    pub use crate::fleet::{ActiveFleet, DispatchError, FleetArrival, Mission};
    pub use crate::kinds::{
        BuildingKind, ConstructionTarget, DefenseKind, QueueKind, ResearchKind, UnitKind,
    };
    pub use crate::map_generation::{generate, MapData, Tile};
    pub use crate::math::Fixed;
    pub use crate::production::{ConstructionError, QueueItem};
    pub use crate::resources::{ResourceBundle, ResourceKind};
    pub use crate::simulation::{ColonyEngine, TickEvents};
    pub use crate::store::{ColonyStore, MemoryStore};
}
