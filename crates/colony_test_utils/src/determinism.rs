//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine produces identical
//! colonies given identical inputs.
//!
//! # Testing Strategy
//!
//! A colony must come out the same however often it is replayed, whether it
//! is ticked every five seconds or caught up after a day offline. Sources
//! of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`colony_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Colonies use ordered maps and fleets resolve in `(arrival_time, id)`
//!   order.
//!
//! - **Clock reads**: The engine never reads the clock; every tick gets
//!   `now` from the caller.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual subsystem determinism (economy, combat, etc.)
//! 2. **Property tests**: Random tick gaps and orders must still replay
//! 3. **Integration tests**: Full colony scenarios are reproducible
//! 4. **Parallel tests**: Running N engines on threads all match

use std::thread;

use colony_core::colony::Colony;
use colony_core::simulation::ColonyEngine;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Colony simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel engine runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final colony hash from each engine.
    pub hashes: Vec<u64>,
    /// Number of ticks each engine ran.
    pub ticks: u64,
    /// Number of engines run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all engines produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all engines matched.
    ///
    /// # Panics
    ///
    /// Panics if engines produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel engines diverged!\n\
                 Engines: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state; receives the step index
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use colony_test_utils::determinism::verify_determinism;
/// use colony_test_utils::fixtures::{founded_engine, T0};
///
/// let result = verify_determinism(
///     3,
///     50,
///     || founded_engine(T0),
///     |engine, step| {
///         engine.tick(T0 + (step + 1) * 60_000);
///     },
///     |engine| engine.colony().state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for tick in 0..ticks {
            step(&mut state, tick);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Absolute tick times reached by adding each gap to `start` in turn.
#[must_use]
pub fn tick_times(start: u64, gaps: &[u64]) -> Vec<u64> {
    gaps.iter()
        .scan(start, |now, gap| {
            *now = now.saturating_add(*gap);
            Some(*now)
        })
        .collect()
}

fn run_gaps(engine: &mut ColonyEngine, start: u64, gaps: &[u64]) {
    for now in tick_times(start, gaps) {
        engine.tick(now);
    }
}

/// Run an engine twice through the same tick schedule and compare the
/// final colony hashes.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates and configures an engine
/// * `start` - Time the schedule starts from
/// * `gaps` - Milliseconds between consecutive ticks
pub fn verify_engine_determinism<F>(setup_fn: F, start: u64, gaps: &[u64]) -> bool
where
    F: Fn() -> ColonyEngine,
{
    let result = verify_determinism(
        2,
        1,
        &setup_fn,
        |engine, _| run_gaps(engine, start, gaps),
        |engine| engine.colony().state_hash(),
    );
    result.is_deterministic
}

/// Run N engines on scoped threads through the same schedule and collect
/// the final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
pub fn run_parallel_engines_scoped<F>(
    setup_fn: F,
    num_sims: usize,
    start: u64,
    gaps: &[u64],
) -> ParallelSimResult
where
    F: Fn() -> ColonyEngine + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut engine = setup_fn();
                    run_gaps(&mut engine, start, gaps);
                    engine.colony().state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("engine thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: gaps.len() as u64,
        num_sims,
    }
}

/// Compare two runs tick by tick and report the first tick whose colony
/// hashes differ.
///
/// # Returns
///
/// `None` if the runs agree, `Some(tick)` (1-based, 0 for the initial
/// state) where they first diverge.
pub fn find_first_divergence<F>(setup_fn: F, start: u64, gaps: &[u64]) -> Option<u64>
where
    F: Fn() -> ColonyEngine,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.colony().state_hash() != second.colony().state_hash() {
        return Some(0);
    }

    for (tick, now) in (1..).zip(tick_times(start, gaps)) {
        first.tick(now);
        second.tick(now);

        if first.colony().state_hash() != second.colony().state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Check that saving a colony mid-run and reloading it changes nothing:
/// the reloaded colony hashes the same and keeps agreeing with the
/// original through the rest of the schedule.
pub fn verify_serialization_determinism<F>(setup_fn: F, start: u64, gaps: &[u64]) -> bool
where
    F: Fn() -> ColonyEngine,
{
    let mut original = setup_fn();
    let (before, after) = gaps.split_at(gaps.len() / 2);
    run_gaps(&mut original, start, before);
    let resume_at = tick_times(start, before).last().copied().unwrap_or(start);

    let bytes = match original.colony().serialize() {
        Ok(b) => b,
        Err(_) => return false,
    };
    let restored = match Colony::deserialize(&bytes) {
        Ok(c) => c,
        Err(_) => return false,
    };
    if restored.state_hash() != original.colony().state_hash() {
        return false;
    }

    let mut reloaded = ColonyEngine::new(
        std::sync::Arc::new(original.map_data().clone()),
        std::sync::Arc::new(original.static_data().clone()),
        original.config().clone(),
        restored,
    );
    run_gaps(&mut original, resume_at, after);
    run_gaps(&mut reloaded, resume_at, after);

    original.colony().state_hash() == reloaded.colony().state_hash()
}

/// Proptest strategies for colony testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the engine.
pub mod strategies {
    use std::collections::BTreeMap;

    use colony_core::combat::Forces;
    use colony_core::coords::Coord;
    use colony_core::kinds::{BuildingKind, ConstructionTarget, DefenseKind, UnitKind};
    use colony_core::resources::ResourceBundle;
    use proptest::prelude::*;

    /// Milliseconds between two ticks: mostly scheduler-sized, sometimes
    /// a long offline gap.
    pub fn arb_tick_gap() -> impl Strategy<Value = u64> {
        prop_oneof![
            4 => 0u64..10_000,
            2 => 10_000u64..3_600_000,
            1 => 3_600_000u64..172_800_000,
        ]
    }

    /// A tick schedule of up to `max_len` gaps.
    pub fn arb_tick_gaps(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(arb_tick_gap(), 1..=max_len)
    }

    /// Any ship kind.
    pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
        prop::sample::select(UnitKind::ALL.to_vec())
    }

    /// Any defense kind.
    pub fn arb_defense_kind() -> impl Strategy<Value = DefenseKind> {
        prop::sample::select(DefenseKind::ALL.to_vec())
    }

    /// Any building kind.
    pub fn arb_building_kind() -> impl Strategy<Value = BuildingKind> {
        prop::sample::select(BuildingKind::ALL.to_vec())
    }

    /// Ship counts, possibly with zero entries.
    pub fn arb_unit_counts(max_count: u32) -> impl Strategy<Value = BTreeMap<UnitKind, u32>> {
        prop::collection::btree_map(arb_unit_kind(), 0..=max_count, 0..4)
    }

    /// A fleet request that only draws on ships in `available`.
    pub fn arb_fleet_from(
        available: BTreeMap<UnitKind, u32>,
    ) -> impl Strategy<Value = BTreeMap<UnitKind, u32>> {
        let picks: Vec<_> = available
            .into_iter()
            .map(|(kind, count)| (0..=count).prop_map(move |n| (kind, n)))
            .collect();
        picks.prop_map(|entries| entries.into_iter().collect())
    }

    /// A battle side of ships and defenses.
    pub fn arb_forces(max_count: u32) -> impl Strategy<Value = Forces> {
        (
            arb_unit_counts(max_count),
            prop::collection::btree_map(arb_defense_kind(), 0..=max_count, 0..3),
        )
            .prop_map(|(units, defenses)| Forces { units, defenses })
    }

    /// An order for any queue.
    pub fn arb_construction_target() -> impl Strategy<Value = ConstructionTarget> {
        prop_oneof![
            arb_building_kind().prop_map(ConstructionTarget::Building),
            prop::sample::select(colony_core::kinds::ResearchKind::ALL.to_vec())
                .prop_map(ConstructionTarget::Research),
            arb_unit_kind().prop_map(ConstructionTarget::Unit),
            arb_defense_kind().prop_map(ConstructionTarget::Defense),
        ]
    }

    /// A storable stock up to `max` of each resource.
    pub fn arb_resources(max: i32) -> impl Strategy<Value = ResourceBundle> {
        (0..=max, 0..=max, 0..=max).prop_map(|(m, k, p)| ResourceBundle::new(m, k, p))
    }

    /// A coordinate on a `size` x `size` map.
    pub fn arb_coord(size: u32) -> impl Strategy<Value = Coord> {
        let max = i32::try_from(size).unwrap_or(i32::MAX).max(1);
        (0..max, 0..max).prop_map(|(x, y)| Coord::new(x, y))
    }
}
