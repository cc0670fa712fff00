//! Tick orchestrator.
//!
//! A [`ColonyEngine`] owns one colony and shares the generated map and the
//! static data tables with every other engine through `Arc`. Time never
//! advances on its own: an external scheduler calls [`ColonyEngine::tick`]
//! with the current Unix time and the engine catches the colony up over the
//! whole gap in one step.
//!
//! # Determinism
//!
//! Every step is a pure function of the colony, the map, the data tables and
//! `now`:
//! - No floating-point math (uses fixed-point via [`Fixed`](crate::math::Fixed))
//! - No system randomness or clock reads
//! - Ordered maps everywhere, fleets resolved by `(arrival_time, id)`
//! - Same inputs always produce the same [`Colony::state_hash`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use colony_core::config::EngineConfig;
//! use colony_core::data::StaticData;
//! use colony_core::kinds::{BuildingKind, ConstructionTarget};
//! use colony_core::map_generation::generate;
//! use colony_core::simulation::ColonyEngine;
//!
//! let config = EngineConfig::default().with_map_size(21);
//! let map = Arc::new(generate(config.map_size, config.map_seed));
//! let data = Arc::new(StaticData::builtin());
//! let mut engine = ColonyEngine::new_colony(map, data, config, "alice", "New Eden", 0);
//!
//! let order = ConstructionTarget::Building(BuildingKind::MetallumMine);
//! engine.start_construction(order, 1, 0).unwrap();
//!
//! // An hour later the upgrade is done.
//! let events = engine.tick(3_600_000);
//! assert_eq!(events.completed.len(), 1);
//! assert_eq!(engine.colony().building_level(BuildingKind::MetallumMine), 2);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::colony::{Colony, EntityId};
use crate::combat::{self, CombatReport, Forces};
use crate::config::EngineConfig;
use crate::coords::Coord;
use crate::data::StaticData;
use crate::economy::{self, ProductionRates};
use crate::fleet::{self, DispatchError, FleetArrival, Mission};
use crate::kinds::{ConstructionTarget, QueueKind, UnitKind};
use crate::map_generation::{MapData, Tile};
use crate::production::{self, ConstructionError, QueueItem, Quote};

/// Everything that happened during one or more ticks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickEvents {
    /// Time the colony was advanced to.
    pub now: u64,
    /// Milliseconds of simulated time covered.
    pub elapsed_ms: u64,
    /// Rates in effect during the most recent step.
    pub rates: ProductionRates,
    /// Queue items promoted into colony state.
    pub completed: Vec<QueueItem>,
    /// Fleets that arrived, in resolution order.
    pub arrivals: Vec<FleetArrival>,
    /// Combat reports recorded.
    pub reports: Vec<EntityId>,
    /// Tiles whose visibility expired.
    pub expired: Vec<Coord>,
}

impl TickEvents {
    /// Check if anything beyond the economy changed.
    #[must_use]
    pub fn has_activity(&self) -> bool {
        !self.completed.is_empty() || !self.arrivals.is_empty() || !self.expired.is_empty()
    }

    /// Fold a later step into this one.
    fn absorb(&mut self, later: Self) {
        self.now = later.now;
        self.elapsed_ms = self.elapsed_ms.saturating_add(later.elapsed_ms);
        self.rates = later.rates;
        self.completed.extend(later.completed);
        self.arrivals.extend(later.arrivals);
        self.reports.extend(later.reports);
        self.expired.extend(later.expired);
    }
}

/// Simulation engine for a single colony.
#[derive(Debug, Clone)]
pub struct ColonyEngine {
    map: Arc<MapData>,
    data: Arc<StaticData>,
    config: EngineConfig,
    colony: Colony,
    /// Events of catch-up steps run by commands, reported by the next tick.
    pending: TickEvents,
}

impl ColonyEngine {
    /// Wrap an existing colony, e.g. one loaded from a store.
    ///
    /// The colony is normalized and its storage recomputed; the first
    /// [`tick`](Self::tick) catches it up from `last_updated`.
    #[must_use]
    pub fn new(map: Arc<MapData>, data: Arc<StaticData>, config: EngineConfig, mut colony: Colony) -> Self {
        colony.normalize();
        colony.storage = economy::storage_capacity(&colony, &data);
        Self {
            map,
            data,
            config,
            colony,
            pending: TickEvents::default(),
        }
    }

    /// Found a colony on the map's centre tile with the configured starting
    /// stock and buildings.
    #[must_use]
    pub fn new_colony(
        map: Arc<MapData>,
        data: Arc<StaticData>,
        config: EngineConfig,
        player: &str,
        name: &str,
        now: u64,
    ) -> Self {
        let mut colony = Colony::new(
            player,
            name,
            map.center(),
            config.starting_resources.to_bundle(),
            now,
        );
        for (&kind, &level) in &config.starting_buildings {
            colony.buildings.insert(kind, level);
        }
        tracing::info!(player, name, home = %colony.home, "colony founded");
        Self::new(map, data, config, colony)
    }

    /// The colony being simulated.
    #[must_use]
    pub const fn colony(&self) -> &Colony {
        &self.colony
    }

    /// Give up the engine and keep the colony.
    #[must_use]
    pub fn into_colony(self) -> Colony {
        self.colony
    }

    /// The shared map.
    #[must_use]
    pub fn map_data(&self) -> &MapData {
        &self.map
    }

    /// The shared static data.
    #[must_use]
    pub fn static_data(&self) -> &StaticData {
        &self.data
    }

    /// Engine settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The colony's home tile, if it lies on the map.
    #[must_use]
    pub fn home_tile(&self) -> Option<&Tile> {
        self.map.tile(self.colony.home)
    }

    /// Rates the colony would produce at right now.
    #[must_use]
    pub fn production_rates(&self) -> ProductionRates {
        economy::production_rates(&self.colony, self.home_tile(), &self.data)
    }

    /// Advance the colony to `now`.
    ///
    /// Runs the economy, promotes finished queue items, resolves arrived
    /// fleets, expires stale visibility and finally recomputes storage and
    /// clamps stock to it. Events of catch-up steps run by earlier commands
    /// are included.
    pub fn tick(&mut self, now: u64) -> TickEvents {
        let mut events = std::mem::take(&mut self.pending);
        let step = self.advance(now);
        events.absorb(step);
        events
    }

    fn advance(&mut self, now: u64) -> TickEvents {
        let elapsed_ms = now.saturating_sub(self.colony.last_updated);
        let tile = self.map.tile(self.colony.home);

        let rates = economy::apply_economy(&mut self.colony, tile, &self.data, elapsed_ms);
        let completed = production::complete_queues(&mut self.colony, now);
        let arrivals = fleet::resolve_arrivals(
            &mut self.colony,
            &self.map,
            &self.data,
            now,
            self.config.combat_report_limit,
        );
        let expired = fleet::decay_visibility(&mut self.colony, now, self.config.fog_of_war_ms);

        // completed storage upgrades apply right away
        self.colony.storage = economy::storage_capacity(&self.colony, &self.data);
        economy::clamp_to_storage(&mut self.colony);
        self.colony.last_updated = self.colony.last_updated.max(now);

        let reports = arrivals
            .iter()
            .filter_map(|arrival| match arrival {
                FleetArrival::Battle { report, .. } => Some(*report),
                _ => None,
            })
            .collect();

        tracing::debug!(
            colony = %self.colony.id,
            now,
            elapsed_ms,
            state_hash = self.colony.state_hash(),
            "tick"
        );

        #[cfg(feature = "debug-validation")]
        {
            let violations = self.colony.invariant_violations();
            if !violations.is_empty() {
                tracing::error!(colony = %self.colony.id, ?violations, "colony invariants broken");
            }
            debug_assert!(violations.is_empty(), "colony invariants broken: {violations:?}");
        }

        TickEvents {
            now,
            elapsed_ms,
            rates,
            completed,
            arrivals,
            reports,
            expired,
        }
    }

    fn catch_up(&mut self, now: u64) {
        let step = self.advance(now);
        self.pending.absorb(step);
    }

    /// Price an order against the current state without placing it.
    pub fn quote(&self, target: ConstructionTarget, amount: u32) -> Result<Quote, ConstructionError> {
        production::quote(&self.colony, &self.data, target, amount)
    }

    /// Catch up to `now`, then place an order.
    pub fn start_construction(
        &mut self,
        target: ConstructionTarget,
        amount: u32,
        now: u64,
    ) -> Result<EntityId, ConstructionError> {
        self.catch_up(now);
        production::start_construction(&mut self.colony, &self.data, target, amount, now)
    }

    /// Catch up to `now`, then cancel a queued order and refund it.
    pub fn cancel_construction(
        &mut self,
        queue: QueueKind,
        id: EntityId,
        now: u64,
    ) -> Result<QueueItem, ConstructionError> {
        self.catch_up(now);
        production::cancel_construction(&mut self.colony, queue, id, now)
    }

    /// Catch up to `now`, then launch a fleet from the home tile.
    pub fn dispatch_fleet(
        &mut self,
        units: &BTreeMap<UnitKind, u32>,
        destination: Coord,
        mission: Mission,
        now: u64,
    ) -> Result<EntityId, DispatchError> {
        self.catch_up(now);
        fleet::dispatch_fleet(
            &mut self.colony,
            &self.map,
            &self.data,
            units,
            destination,
            mission,
            now,
        )
    }

    /// Fight a battle with this engine's data tables. Touches no state.
    #[must_use]
    pub fn simulate_combat(
        &self,
        attacker: &Forces,
        defender: &Forces,
        attacker_name: &str,
        defender_name: &str,
    ) -> CombatReport {
        combat::simulate_combat(attacker, defender, &self.data, attacker_name, defender_name)
    }
}
