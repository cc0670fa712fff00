//! Fleet dispatch, travel and arrival resolution.
//!
//! Fleets are immutable values. Dispatch debits ships from the colony and
//! records an [`ActiveFleet`]; on arrival the fleet is removed and, for a
//! victorious attack, replaced by a new return-trip fleet carrying the
//! survivors and plunder home.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colony::{Colony, EntityId};
use crate::combat::{simulate_combat, Forces, Winner};
use crate::coords::Coord;
use crate::data::StaticData;
use crate::kinds::{ResearchKind, UnitKind};
use crate::map_generation::MapData;
use crate::math::ratio;
use crate::resources::ResourceBundle;

/// No trip is shorter than this.
pub const MIN_TRAVEL_TIME_MS: u64 = 1_000;

/// What a fleet does on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mission {
    /// Fight the garrison at the destination.
    Attack,
    /// Reveal the destination and its neighbours.
    Explore,
}

impl std::str::FromStr for Mission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(Self::Attack),
            "explore" => Ok(Self::Explore),
            other => Err(format!("unknown mission '{other}', expected attack or explore")),
        }
    }
}

/// A group of ships in transit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveFleet {
    /// Unique id within the colony.
    pub id: EntityId,
    /// Ships aboard; no zero entries.
    pub units: BTreeMap<UnitKind, u32>,
    /// Departure tile.
    pub origin: Coord,
    /// Target tile.
    pub destination: Coord,
    /// Purpose of the trip.
    pub mission: Mission,
    /// Unix milliseconds of departure.
    pub departure_time: u64,
    /// Unix milliseconds of arrival.
    pub arrival_time: u64,
    /// Whether this is the homeward leg.
    pub return_trip: bool,
    /// Resources carried.
    pub cargo: ResourceBundle,
}

/// Reasons a dispatch is rejected. A rejected dispatch changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No ships requested.
    #[error("fleet has no ships")]
    EmptyFleet,

    /// More ships requested than are docked.
    #[error("not enough {kind}: requested {requested}, docked {available}")]
    InsufficientUnits {
        /// Ship kind short.
        kind: UnitKind,
        /// Requested count.
        requested: u32,
        /// Docked count.
        available: u32,
    },

    /// Destination is not on the map.
    #[error("destination {0} is not on the map")]
    UnknownDestination(Coord),

    /// No static data for a requested ship.
    #[error("no static data for '{0}'")]
    UnknownType(UnitKind),

    /// A requested ship cannot move.
    #[error("'{0}' cannot leave orbit")]
    Immobile(UnitKind),
}

/// What happened when a fleet arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetArrival {
    /// A return trip docked.
    Returned {
        /// Fleet id.
        fleet: EntityId,
        /// Ships restored to the colony.
        units: BTreeMap<UnitKind, u32>,
        /// Resources deposited.
        cargo: ResourceBundle,
    },
    /// An exploration revealed tiles.
    Explored {
        /// Fleet id.
        fleet: EntityId,
        /// Tiles revealed, destination first.
        revealed: Vec<Coord>,
    },
    /// An attack was fought.
    Battle {
        /// Fleet id.
        fleet: EntityId,
        /// Recorded report.
        report: EntityId,
        /// Battle outcome.
        winner: Winner,
        /// Return trip carrying survivors, if any.
        return_fleet: Option<EntityId>,
    },
    /// An attack found nobody to fight.
    NoTarget {
        /// Fleet id.
        fleet: EntityId,
        /// Destination that was empty.
        destination: Coord,
    },
}

/// Speed of the slowest ship in `units`.
///
/// # Errors
///
/// Returns [`DispatchError::UnknownType`] or [`DispatchError::Immobile`]
/// for a ship without data or without speed, and
/// [`DispatchError::EmptyFleet`] when `units` holds no ships.
pub fn slowest_speed(units: &BTreeMap<UnitKind, u32>, data: &StaticData) -> Result<u32, DispatchError> {
    let mut slowest: Option<u32> = None;
    for (&kind, &count) in units {
        if count == 0 {
            continue;
        }
        let info = data.unit(kind).ok_or(DispatchError::UnknownType(kind))?;
        if !info.is_mobile() {
            return Err(DispatchError::Immobile(kind));
        }
        slowest = Some(slowest.map_or(info.speed, |s| s.min(info.speed)));
    }
    slowest.ok_or(DispatchError::EmptyFleet)
}

/// Travel time `distance * travel_constant / (speed * warp_bonus)` where
/// `warp_bonus = 1 + bonus% * warp_level`, at least one second.
#[must_use]
pub fn travel_time_ms(distance: u32, speed: u32, warp_level: u32, data: &StaticData) -> u64 {
    let bonus_pct = data
        .research(ResearchKind::WarpDrive)
        .map_or(0, |r| r.bonus_pct_per_level);
    let warp_pct = 100u128 + u128::from(bonus_pct) * u128::from(warp_level);
    let numerator =
        u128::from(distance) * u128::from(data.tuning.travel_constant) * 100 * 1_000;
    let denominator = u128::from(speed.max(1)) * warp_pct;
    let ms = u64::try_from(numerator / denominator).unwrap_or(u64::MAX);
    ms.max(MIN_TRAVEL_TIME_MS)
}

/// Validate and launch a fleet from the colony's home tile.
///
/// Ships are debited immediately.
///
/// # Errors
///
/// Returns a [`DispatchError`] and leaves the colony untouched when the
/// fleet is empty, the destination is off the map, a ship kind is unknown
/// or immobile, or the colony lacks the ships.
pub fn dispatch_fleet(
    colony: &mut Colony,
    map: &MapData,
    data: &StaticData,
    units: &BTreeMap<UnitKind, u32>,
    destination: Coord,
    mission: Mission,
    now: u64,
) -> Result<EntityId, DispatchError> {
    let units: BTreeMap<UnitKind, u32> = units
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(&kind, &count)| (kind, count))
        .collect();
    if units.is_empty() {
        return Err(DispatchError::EmptyFleet);
    }
    if !map.contains(destination) {
        return Err(DispatchError::UnknownDestination(destination));
    }
    let speed = slowest_speed(&units, data)?;
    for (&kind, &requested) in &units {
        let available = colony.unit_count(kind);
        if requested > available {
            return Err(DispatchError::InsufficientUnits {
                kind,
                requested,
                available,
            });
        }
    }

    for (&kind, &count) in &units {
        if let Some(docked) = colony.units.get_mut(&kind) {
            *docked -= count;
        }
    }

    let distance = colony.home.distance(destination);
    let warp = colony.research_level(ResearchKind::WarpDrive);
    let arrival_time = now.saturating_add(travel_time_ms(distance, speed, warp, data));
    let id = colony.allocate_id();
    colony.active_fleets.push(ActiveFleet {
        id,
        units,
        origin: colony.home,
        destination,
        mission,
        departure_time: now,
        arrival_time,
        return_trip: false,
        cargo: ResourceBundle::ZERO,
    });

    tracing::debug!(colony = %colony.id, id, %destination, ?mission, arrival_time, "fleet dispatched");
    Ok(id)
}

/// Resolve every fleet that has arrived by `now`, in `(arrival_time, id)`
/// order.
///
/// Combat reports go to the front of the history, which is trimmed to
/// `report_limit` entries.
pub fn resolve_arrivals(
    colony: &mut Colony,
    map: &MapData,
    data: &StaticData,
    now: u64,
    report_limit: usize,
) -> Vec<FleetArrival> {
    let (mut arrived, in_flight): (Vec<_>, Vec<_>) = std::mem::take(&mut colony.active_fleets)
        .into_iter()
        .partition(|fleet| fleet.arrival_time <= now);
    colony.active_fleets = in_flight;
    arrived.sort_by_key(|fleet| (fleet.arrival_time, fleet.id));

    arrived
        .into_iter()
        .map(|fleet| {
            if fleet.return_trip {
                resolve_return(colony, fleet)
            } else {
                match fleet.mission {
                    Mission::Explore => resolve_explore(colony, map, &fleet, now),
                    Mission::Attack => resolve_attack(colony, map, data, fleet, report_limit),
                }
            }
        })
        .collect()
}

fn resolve_return(colony: &mut Colony, fleet: ActiveFleet) -> FleetArrival {
    for (&kind, &count) in &fleet.units {
        let docked = colony.units.entry(kind).or_insert(0);
        *docked = docked.saturating_add(count);
    }
    colony.resources += fleet.cargo;
    tracing::info!(colony = %colony.id, fleet = fleet.id, "fleet returned");
    FleetArrival::Returned {
        fleet: fleet.id,
        units: fleet.units,
        cargo: fleet.cargo,
    }
}

fn resolve_explore(colony: &mut Colony, map: &MapData, fleet: &ActiveFleet, now: u64) -> FleetArrival {
    let mut revealed = vec![fleet.destination];
    revealed.extend(map.neighbors(fleet.destination));
    for &coord in &revealed {
        colony.reveal(coord, now);
    }
    tracing::info!(colony = %colony.id, fleet = fleet.id, destination = %fleet.destination, "exploration complete");
    FleetArrival::Explored {
        fleet: fleet.id,
        revealed,
    }
}

fn resolve_attack(
    colony: &mut Colony,
    map: &MapData,
    data: &StaticData,
    fleet: ActiveFleet,
    report_limit: usize,
) -> FleetArrival {
    let Some(garrison) = map.tile(fleet.destination).and_then(|t| t.npc.as_ref()) else {
        tracing::info!(colony = %colony.id, fleet = fleet.id, destination = %fleet.destination, "attack found no target");
        return FleetArrival::NoTarget {
            fleet: fleet.id,
            destination: fleet.destination,
        };
    };

    let attacker = Forces::from_units(fleet.units.clone());
    let defender = Forces {
        units: garrison.units.clone(),
        defenses: garrison.defenses.clone(),
    };
    let mut report = simulate_combat(&attacker, &defender, data, &colony.name, &garrison.name);

    let mut return_fleet = None;
    if report.winner == Winner::Attacker {
        report.plunder = garrison.cache.scaled(ratio(1, 2)).floored();
        let survivors = report.attacker.survivors().units;
        if !survivors.is_empty() {
            // survivors are a subset of a fleet that already moved
            let travel = slowest_speed(&survivors, data).map_or(MIN_TRAVEL_TIME_MS, |speed| {
                let distance = fleet.destination.distance(fleet.origin);
                let warp = colony.research_level(ResearchKind::WarpDrive);
                travel_time_ms(distance, speed, warp, data)
            });
            let id = colony.allocate_id();
            colony.active_fleets.push(ActiveFleet {
                id,
                units: survivors,
                origin: fleet.destination,
                destination: fleet.origin,
                mission: fleet.mission,
                departure_time: fleet.arrival_time,
                arrival_time: fleet.arrival_time.saturating_add(travel),
                return_trip: true,
                cargo: report.plunder,
            });
            return_fleet = Some(id);
        }
    }

    report.id = colony.allocate_id();
    report.timestamp = fleet.arrival_time;
    report.location = fleet.destination;
    let report_id = report.id;
    let winner = report.winner;

    colony.combat_reports.push_front(report);
    colony.combat_reports.truncate(report_limit);

    tracing::info!(
        colony = %colony.id,
        fleet = fleet.id,
        report = report_id,
        ?winner,
        destination = %fleet.destination,
        "battle fought"
    );
    FleetArrival::Battle {
        fleet: fleet.id,
        report: report_id,
        winner,
        return_fleet,
    }
}

/// Forget tiles not seen for longer than `fog_of_war_ms`. The home tile is
/// never forgotten. Returns the expired coordinates.
pub fn decay_visibility(colony: &mut Colony, now: u64, fog_of_war_ms: u64) -> Vec<Coord> {
    let home = colony.home;
    let expired: Vec<Coord> = colony
        .map_visibility
        .iter()
        .filter(|&(&coord, seen)| coord != home && now.saturating_sub(seen.last_seen) > fog_of_war_ms)
        .map(|(&coord, _)| coord)
        .collect();
    for coord in &expired {
        colony.map_visibility.remove(coord);
    }
    if !expired.is_empty() {
        tracing::debug!(colony = %colony.id, expired = expired.len(), "visibility decayed");
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::Visibility;
    use crate::kinds::DefenseKind;
    use crate::map_generation::{generate, Elevation, NpcGarrison, PlanetKind, Tile};

    const NOW: u64 = 10_000_000;
    const DAY_MS: u64 = 86_400_000;

    fn setup() -> (Colony, MapData, StaticData) {
        let map = generate(21, 42);
        let mut colony = Colony::new(
            "p",
            "Alice",
            map.center(),
            ResourceBundle::new(1000, 1000, 0),
            NOW,
        );
        colony.storage = ResourceBundle::new(1_000_000, 1_000_000, 1_000_000);
        colony.units.insert(UnitKind::LightFighter, 10);
        colony.units.insert(UnitKind::ExplorationProbe, 2);
        (colony, map, StaticData::builtin())
    }

    fn fleet_of(kind: UnitKind, count: u32) -> BTreeMap<UnitKind, u32> {
        BTreeMap::from([(kind, count)])
    }

    fn garrison_tile(fighters: u32, launchers: u32) -> Tile {
        let mut tile = Tile::planet(PlanetKind::Desert, Elevation::Low);
        tile.npc = Some(NpcGarrison {
            name: "Raider Den".to_string(),
            units: fleet_of(UnitKind::LightFighter, fighters),
            defenses: BTreeMap::from([(DefenseKind::RocketLauncher, launchers)]),
            cache: ResourceBundle::new(5000, 2000, 300),
        });
        tile
    }

    #[test]
    fn test_travel_time() {
        let data = StaticData::builtin();
        // 6_000_000 / 10_000 = 600 s per hex
        assert_eq!(travel_time_ms(3, 10_000, 0, &data), 1_800_000);
        // warp 5 is a 1.5x bonus
        assert_eq!(travel_time_ms(3, 10_000, 5, &data), 1_200_000);
        assert_eq!(travel_time_ms(0, 10_000, 0, &data), MIN_TRAVEL_TIME_MS);
    }

    #[test]
    fn test_dispatch_debits_units() {
        let (mut colony, map, data) = setup();
        let destination = Coord::new(12, 10);

        let id = dispatch_fleet(
            &mut colony,
            &map,
            &data,
            &fleet_of(UnitKind::LightFighter, 4),
            destination,
            Mission::Attack,
            NOW,
        )
        .unwrap();

        assert_eq!(colony.unit_count(UnitKind::LightFighter), 6);
        let fleet = &colony.active_fleets[0];
        assert_eq!(fleet.id, id);
        assert_eq!(fleet.origin, colony.home);
        let distance = colony.home.distance(destination);
        assert_eq!(fleet.arrival_time, NOW + travel_time_ms(distance, 12_500, 0, &data));
    }

    #[test]
    fn test_fleet_moves_at_slowest_speed() {
        let data = StaticData::builtin();
        let mixed = BTreeMap::from([(UnitKind::ExplorationProbe, 1), (UnitKind::SmallCargo, 1)]);
        assert_eq!(slowest_speed(&mixed, &data), Ok(5_000));
    }

    #[test]
    fn test_dispatch_rejections_change_nothing() {
        let (mut colony, map, mut data) = setup();
        let snapshot = colony.clone();
        let target = Coord::new(12, 10);

        assert_eq!(
            dispatch_fleet(&mut colony, &map, &data, &BTreeMap::new(), target, Mission::Attack, NOW),
            Err(DispatchError::EmptyFleet)
        );
        assert_eq!(
            dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 0), target, Mission::Attack, NOW),
            Err(DispatchError::EmptyFleet)
        );
        assert_eq!(
            dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 11), target, Mission::Attack, NOW),
            Err(DispatchError::InsufficientUnits {
                kind: UnitKind::LightFighter,
                requested: 11,
                available: 10
            })
        );
        assert_eq!(
            dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 1), Coord::new(99, 99), Mission::Attack, NOW),
            Err(DispatchError::UnknownDestination(Coord::new(99, 99)))
        );

        if let Some(probe) = data.units.get_mut(&UnitKind::ExplorationProbe) {
            probe.speed = 0;
        }
        assert_eq!(
            dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::ExplorationProbe, 1), target, Mission::Explore, NOW),
            Err(DispatchError::Immobile(UnitKind::ExplorationProbe))
        );
        data.units.remove(&UnitKind::ExplorationProbe);
        assert_eq!(
            dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::ExplorationProbe, 1), target, Mission::Explore, NOW),
            Err(DispatchError::UnknownType(UnitKind::ExplorationProbe))
        );

        assert_eq!(colony, snapshot);
    }

    #[test]
    fn test_explore_reveals_destination_and_neighbors() {
        let (mut colony, map, data) = setup();
        let destination = Coord::new(3, 4);
        dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::ExplorationProbe, 1), destination, Mission::Explore, NOW).unwrap();

        let later = NOW + DAY_MS;
        let arrivals = resolve_arrivals(&mut colony, &map, &data, later, 20);

        assert_eq!(arrivals.len(), 1);
        assert!(colony.active_fleets.is_empty());
        assert_eq!(colony.unit_count(UnitKind::ExplorationProbe), 1);
        for coord in std::iter::once(destination).chain(map.neighbors(destination)) {
            assert_eq!(colony.map_visibility.get(&coord), Some(&Visibility { last_seen: later }));
        }
    }

    #[test]
    fn test_victorious_attack_returns_with_plunder() {
        let (mut colony, mut map, data) = setup();
        let target = Coord::new(15, 10);
        map = map.with_tile(target, garrison_tile(1, 1));

        dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 10), target, Mission::Attack, NOW).unwrap();
        let arrival = colony.active_fleets[0].arrival_time;

        let arrivals = resolve_arrivals(&mut colony, &map, &data, arrival, 20);
        let FleetArrival::Battle { winner, return_fleet, .. } = &arrivals[0] else {
            panic!("expected a battle, got {arrivals:?}");
        };
        assert_eq!(*winner, Winner::Attacker);
        assert!(return_fleet.is_some());

        let report = &colony.combat_reports[0];
        assert_eq!(report.plunder, ResourceBundle::new(2500, 1000, 150));
        assert_eq!(report.location, target);
        assert_eq!(report.timestamp, arrival);

        let homeward = &colony.active_fleets[0];
        assert!(homeward.return_trip);
        assert_eq!(homeward.departure_time, arrival);
        assert_eq!(homeward.destination, colony.home);
        assert_eq!(homeward.cargo, report.plunder);

        // bring them home
        let survivors = report.attacker.survivors().units.clone();
        let before = colony.resources;
        let home_at = homeward.arrival_time;
        resolve_arrivals(&mut colony, &map, &data, home_at, 20);
        assert_eq!(colony.resources, before + ResourceBundle::new(2500, 1000, 150));
        assert_eq!(
            colony.unit_count(UnitKind::LightFighter),
            survivors.get(&UnitKind::LightFighter).copied().unwrap_or(0)
        );
        assert!(colony.active_fleets.is_empty());
    }

    #[test]
    fn test_defeat_loses_the_fleet() {
        let (mut colony, mut map, data) = setup();
        let target = Coord::new(15, 10);
        map = map.with_tile(target, garrison_tile(200, 50));

        dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 2), target, Mission::Attack, NOW).unwrap();
        resolve_arrivals(&mut colony, &map, &data, NOW + DAY_MS, 20);

        assert_eq!(colony.combat_reports[0].winner, Winner::Defender);
        assert_eq!(colony.combat_reports[0].plunder, ResourceBundle::ZERO);
        assert!(colony.active_fleets.is_empty());
        assert_eq!(colony.unit_count(UnitKind::LightFighter), 8);
    }

    #[test]
    fn test_attack_without_garrison_is_dropped() {
        let (mut colony, mut map, data) = setup();
        let target = Coord::new(15, 10);
        map = map.with_tile(target, Tile::planet(PlanetKind::Frozen, Elevation::High));

        dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 3), target, Mission::Attack, NOW).unwrap();
        let arrivals = resolve_arrivals(&mut colony, &map, &data, NOW + DAY_MS, 20);

        assert_eq!(arrivals, vec![FleetArrival::NoTarget { fleet: 1, destination: target }]);
        assert!(colony.combat_reports.is_empty());
        assert!(colony.active_fleets.is_empty());
    }

    #[test]
    fn test_report_history_is_bounded() {
        let (mut colony, mut map, data) = setup();
        let target = Coord::new(15, 10);
        map = map.with_tile(target, garrison_tile(200, 50));
        colony.units.insert(UnitKind::LightFighter, 30);

        for _ in 0..25 {
            dispatch_fleet(&mut colony, &map, &data, &fleet_of(UnitKind::LightFighter, 1), target, Mission::Attack, NOW).unwrap();
        }
        resolve_arrivals(&mut colony, &map, &data, NOW + DAY_MS, 20);

        assert_eq!(colony.combat_reports.len(), 20);
        // most recent first
        assert!(colony.combat_reports[0].id > colony.combat_reports[19].id);
    }

    #[test]
    fn test_fog_of_war_expiry() {
        let (mut colony, _, _) = setup();
        let now = NOW + 2 * DAY_MS;
        let stale = Coord::new(1, 1);
        let fresh = Coord::new(2, 2);
        colony.reveal(stale, now - DAY_MS - 1);
        colony.reveal(fresh, now - DAY_MS);
        let home = colony.home;
        colony.reveal(home, 0);

        let expired = decay_visibility(&mut colony, now, DAY_MS);

        assert_eq!(expired, vec![stale]);
        assert!(colony.map_visibility.contains_key(&fresh));
        assert!(colony.map_visibility.contains_key(&home));
    }

    #[test]
    fn test_mission_parse() {
        assert_eq!("attack".parse::<Mission>(), Ok(Mission::Attack));
        assert!("defend".parse::<Mission>().is_err());
    }
}
