//! Commands across separate invocations sharing one save directory.

use colony_core::data::StaticData;
use colony_core::fleet::Mission;
use colony_core::kinds::{BuildingKind, ConstructionTarget, QueueKind, UnitKind};
use colony_test_utils::fixtures::{test_config, T0};
use colony_tools::args::parse_fleet;
use colony_tools::{JsonFileStore, Session};

fn session(dir: &std::path::Path) -> Session {
    Session::new(JsonFileStore::new(dir), StaticData::builtin(), test_config())
}

#[test]
fn test_order_survives_restart_and_completes() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = session(dir.path());
    let mut engine = first.open("alice", T0).unwrap();
    engine
        .start_construction(ConstructionTarget::Building(BuildingKind::MetallumMine), 1, T0)
        .unwrap();
    let done = engine.colony().building_queue[0].end_time;
    first.save(&engine).unwrap();

    let mut second = session(dir.path());
    let mut engine = second.open("alice", done).unwrap();
    assert_eq!(engine.colony().building_queue.len(), 1);
    let events = engine.tick(done);
    assert_eq!(events.completed.len(), 1);
    assert_eq!(engine.colony().building_level(BuildingKind::MetallumMine), 2);
    second.save(&engine).unwrap();

    let reloaded = session(dir.path()).open("alice", done).unwrap();
    assert!(reloaded.colony().building_queue.is_empty());
}

#[test]
fn test_cancel_in_later_invocation_refunds() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(dir.path());

    let mut engine = session.open("bob", T0).unwrap();
    engine
        .start_construction(ConstructionTarget::Building(BuildingKind::SolarPlant), 1, T0)
        .unwrap();
    let second = engine
        .start_construction(ConstructionTarget::Building(BuildingKind::KristallinMine), 1, T0)
        .unwrap();
    session.save(&engine).unwrap();

    let mut engine = session.open("bob", T0).unwrap();
    let before = engine.colony().resources;
    let item = engine.cancel_construction(QueueKind::Building, second, T0).unwrap();
    assert_eq!(engine.colony().resources.metallum, before.metallum + item.cost.metallum);
    assert_eq!(engine.colony().resources.kristallin, before.kristallin + item.cost.kristallin);
    assert_eq!(engine.colony().building_queue.len(), 1);
}

#[test]
fn test_players_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(dir.path());

    let mut alice = session.open("alice", T0).unwrap();
    let fleet = parse_fleet(&["light_fighter=1"]).unwrap();
    let rejected = alice.dispatch_fleet(&fleet, alice.colony().home, Mission::Attack, T0);
    assert!(rejected.is_err());
    session.save(&alice).unwrap();

    let bob = session.open("bob", T0).unwrap();
    assert_eq!(bob.colony().id, "bob");
    assert_eq!(bob.colony().unit_count(UnitKind::LightFighter), 0);
    assert!(dir.path().join("alice.json").exists());
    assert!(!dir.path().join("bob.json").exists());
}
