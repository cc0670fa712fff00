//! Plain-text views of a colony for the terminal.

use std::fmt::Write as _;

use colony_core::coords::Coord;
use colony_core::map_generation::MapData;
use colony_core::math::Fixed;
use colony_core::resources::ResourceKind;
use colony_core::simulation::ColonyEngine;

fn whole(value: Fixed) -> i64 {
    value.floor().to_num::<i64>()
}

/// Summarize stock, rates, holdings, queues and fleets.
#[must_use]
pub fn render_status(engine: &ColonyEngine, now: u64) -> String {
    let colony = engine.colony();
    let rates = engine.production_rates();
    let mut out = String::new();

    let _ = writeln!(out, "{} ({}) at {}", colony.name, colony.id, colony.home);
    for resource in ResourceKind::STORABLE {
        let _ = writeln!(
            out,
            "  {:<10} {:>10} / {:<10} {:+}/h",
            resource.name(),
            whole(colony.resources.get(resource)),
            whole(colony.storage.get(resource)),
            whole(rates.per_hour.get(resource)),
        );
    }
    let _ = writeln!(
        out,
        "  {:<10} {:>+10} (factor {:.2})",
        ResourceKind::Energy.name(),
        whole(colony.resources.energy),
        rates.energy_factor.to_num::<f64>(),
    );

    section(&mut out, "buildings", colony.buildings.iter().map(|(k, v)| (k.name(), v)));
    section(&mut out, "research", colony.research.iter().map(|(k, v)| (k.name(), v)));
    section(&mut out, "units", colony.units.iter().map(|(k, v)| (k.name(), v)));
    section(&mut out, "defenses", colony.defenses.iter().map(|(k, v)| (k.name(), v)));

    for queue in colony_core::kinds::QueueKind::ALL {
        let items = colony.queue(queue);
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{queue} queue:");
        for item in items {
            let _ = writeln!(
                out,
                "  #{} {} x{} done in {}s",
                item.id,
                item.target,
                item.level_or_amount,
                item.end_time.saturating_sub(now) / 1000,
            );
        }
    }

    if !colony.active_fleets.is_empty() {
        let _ = writeln!(out, "fleets:");
        for fleet in &colony.active_fleets {
            let ships: u32 = fleet.units.values().sum();
            let leg = if fleet.return_trip { "returning from" } else { "bound for" };
            let _ = writeln!(
                out,
                "  #{} {:?} {ships} ships {leg} {} in {}s",
                fleet.id,
                fleet.mission,
                fleet.destination,
                fleet.arrival_time.saturating_sub(now) / 1000,
            );
        }
    }

    if let Some(report) = colony.combat_reports.front() {
        let _ = writeln!(
            out,
            "last battle: #{} at {} vs {}, winner {:?}",
            report.id, report.location, report.defender.name, report.winner
        );
    }
    out
}

fn section<'a>(out: &mut String, title: &str, entries: impl Iterator<Item = (&'a str, &'a u32)>) {
    let entries: Vec<_> = entries.filter(|(_, n)| **n > 0).collect();
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for (name, n) in entries {
        let _ = writeln!(out, "  {name:<20} {n}");
    }
}

/// Describe one map tile.
#[must_use]
pub fn render_tile(map: &MapData, coord: Coord) -> String {
    let Some(tile) = map.tile(coord) else {
        return format!("{coord}: outside the map");
    };
    let mut out = format!("{coord}: {:?} ({:?})", tile.kind, tile.elevation);
    if map.is_safe_zone(coord) {
        out.push_str(", safe zone");
    }
    if let Some(biome) = &tile.biome {
        let _ = write!(out, ", {} {:+}%", biome.resource, biome.delta_pct);
    }
    if let Some(npc) = &tile.npc {
        let ships: u32 = npc.units.values().sum();
        let guns: u32 = npc.defenses.values().sum();
        let _ = write!(out, ", held by {} ({ships} ships, {guns} defenses)", npc.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::kinds::{BuildingKind, ConstructionTarget};
    use colony_test_utils::fixtures::{founded_engine, garrison_tile, test_map, T0};

    #[test]
    fn test_status_lists_stock_and_queue() {
        let mut engine = founded_engine(T0);
        engine
            .start_construction(ConstructionTarget::Building(BuildingKind::SolarPlant), 1, T0)
            .unwrap();

        let text = render_status(&engine, T0);
        assert!(text.starts_with("First Light (tester) at"));
        assert!(text.contains("metallum"));
        assert!(text.contains("building queue:"));
        assert!(text.contains("solar_plant x2"));
        assert!(!text.contains("fleets:"));
    }

    #[test]
    fn test_tile_mentions_garrison() {
        let coord = Coord::new(3, 3);
        let map = test_map().with_tile(coord, garrison_tile(4, 2, colony_core::resources::ResourceBundle::ZERO));

        let text = render_tile(&map, coord);
        assert!(text.contains("3:3"));
        assert!(text.contains("4 ships, 2 defenses"));
    }

    #[test]
    fn test_tile_outside_map() {
        assert!(render_tile(&test_map(), Coord::new(-1, 0)).contains("outside"));
    }
}
