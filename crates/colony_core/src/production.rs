//! Construction queues for buildings, research, ships and defenses.
//!
//! Handles cost and build-time formulas, order acceptance, cancellation, and
//! the completion step that promotes finished items into colony state each
//! tick.
//!
//! Building and research queues run one job at a time: a new item starts
//! when the previous one in the same queue ends. Shipyard items start on
//! acceptance and build in parallel.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colony::{Colony, EntityId};
use crate::data::{Requirement, ResourceCost, StaticData, TuningData};
use crate::economy;
use crate::kinds::{BuildingKind, ConstructionTarget, QueueKind};
use crate::math::{floor_u64, pow, Fixed};
use crate::resources::{ResourceBundle, ResourceKind};

/// Milliseconds per second.
const MS_PER_SECOND: u64 = 1_000;

/// No job finishes faster than this.
pub const MIN_BUILD_TIME_MS: u64 = MS_PER_SECOND;

/// A pending order with a fixed completion time.
///
/// Immutable once created; removed on completion or cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItem {
    /// Unique id within the colony.
    pub id: EntityId,
    /// What is being built.
    pub target: ConstructionTarget,
    /// Target level for buildings and research, batch size for the shipyard.
    pub level_or_amount: u32,
    /// Resources debited on acceptance, refunded on cancellation.
    pub cost: ResourceBundle,
    /// Unix milliseconds the job starts.
    pub start_time: u64,
    /// Unix milliseconds the job completes.
    pub end_time: u64,
}

impl QueueItem {
    /// Check if the item is finished at `now`.
    #[must_use]
    pub const fn is_complete(&self, now: u64) -> bool {
        now >= self.end_time
    }

    /// Check if work on the item has begun at `now`.
    #[must_use]
    pub const fn has_started(&self, now: u64) -> bool {
        now >= self.start_time
    }
}

/// Reasons an order is rejected. A rejected order changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// No static data for the target.
    #[error("no static data for '{0}'")]
    UnknownType(ConstructionTarget),

    /// Batch size of zero, or more than one level at once.
    #[error("invalid amount {amount} for '{target}'")]
    InvalidAmount {
        /// Ordered target.
        target: ConstructionTarget,
        /// Requested amount.
        amount: u32,
    },

    /// A prerequisite is missing.
    #[error("'{target}' requires {requirement}")]
    RequirementNotMet {
        /// Ordered target.
        target: ConstructionTarget,
        /// First unmet prerequisite.
        requirement: Requirement,
    },

    /// Stock does not cover the cost.
    #[error("not enough {resource}: need {required}, have {available}")]
    InsufficientResources {
        /// First resource short.
        resource: ResourceKind,
        /// Amount needed.
        required: Fixed,
        /// Amount in stock.
        available: Fixed,
    },

    /// The item is already being worked on.
    #[error("queue item {0} is already in progress")]
    NotCancellable(EntityId),

    /// No such item in the queue.
    #[error("no queue item {0}")]
    NotFound(EntityId),
}

/// Level the next order for a levelled target would reach: current level,
/// plus one, plus every upgrade of the same target already queued.
#[must_use]
pub fn target_level(colony: &Colony, target: ConstructionTarget) -> u32 {
    let current = match target {
        ConstructionTarget::Building(kind) => colony.building_level(kind),
        ConstructionTarget::Research(kind) => colony.research_level(kind),
        ConstructionTarget::Unit(_) | ConstructionTarget::Defense(_) => return 0,
    };
    let queued = colony
        .queue(target.queue())
        .iter()
        .filter(|item| item.target == target)
        .count();
    current
        .saturating_add(1)
        .saturating_add(u32::try_from(queued).unwrap_or(u32::MAX))
}

/// Exponential cost `floor(base * factor^(level - 1))` of reaching `level`.
///
/// # Example
///
/// ```
/// use colony_core::data::ResourceCost;
/// use colony_core::math::Fixed;
/// use colony_core::production::levelled_cost;
/// use colony_core::resources::ResourceBundle;
///
/// let base = ResourceCost::new(60, 15, 0);
/// let cost = levelled_cost(base, Fixed::from_num(1.5), 3);
/// assert_eq!(cost, ResourceBundle::new(135, 33, 0));
/// ```
#[must_use]
pub fn levelled_cost(base: ResourceCost, factor: Fixed, level: u32) -> ResourceBundle {
    let growth = pow(factor, level.saturating_sub(1));
    base.to_bundle().scaled(growth).floored()
}

/// Linear cost `base * amount` of a shipyard batch.
#[must_use]
pub fn batch_cost(base: ResourceCost, amount: u32) -> ResourceBundle {
    base.to_bundle().times(u64::from(amount))
}

/// Build time of a levelled order:
/// `(metallum + kristallin) / build_cost_per_hour / (speedup_level + 1)` hours.
#[must_use]
pub fn levelled_build_time_ms(cost: &ResourceBundle, speedup_level: u32, tuning: &TuningData) -> u64 {
    let weight = floor_u64(cost.metallum).saturating_add(floor_u64(cost.kristallin));
    let divisor = u64::from(tuning.build_cost_per_hour.max(1))
        .saturating_mul(u64::from(speedup_level).saturating_add(1));
    let seconds = weight.saturating_mul(3_600) / divisor;
    seconds.saturating_mul(MS_PER_SECOND).max(MIN_BUILD_TIME_MS)
}

/// Build time of a shipyard batch:
/// `base_secs * amount / (1 + shipyard_level)`.
#[must_use]
pub fn batch_build_time_ms(base_secs: u32, amount: u32, shipyard_level: u32) -> u64 {
    let total = u64::from(base_secs)
        .saturating_mul(u64::from(amount))
        .saturating_mul(MS_PER_SECOND);
    (total / u64::from(shipyard_level).saturating_add(1)).max(MIN_BUILD_TIME_MS)
}

/// Price and duration of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Resources the order costs.
    pub cost: ResourceBundle,
    /// Target level or batch size.
    pub level_or_amount: u32,
    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Cost, level-or-amount and duration of an order, without checking stock.
///
/// # Errors
///
/// Returns [`ConstructionError::UnknownType`] when the target has no static
/// data and [`ConstructionError::InvalidAmount`] for a zero batch or a
/// multi-level order.
pub fn quote(
    colony: &Colony,
    data: &StaticData,
    target: ConstructionTarget,
    amount: u32,
) -> Result<Quote, ConstructionError> {
    let invalid = ConstructionError::InvalidAmount { target, amount };
    match target {
        ConstructionTarget::Building(kind) => {
            let info = data.building(kind).ok_or(ConstructionError::UnknownType(target))?;
            if amount != 1 {
                return Err(invalid);
            }
            let level = target_level(colony, target);
            let cost = levelled_cost(info.cost, info.cost_factor, level);
            let speedup = colony.building_level(BuildingKind::RoboticsFactory);
            Ok(Quote {
                cost,
                level_or_amount: level,
                duration_ms: levelled_build_time_ms(&cost, speedup, &data.tuning),
            })
        }
        ConstructionTarget::Research(kind) => {
            let info = data.research(kind).ok_or(ConstructionError::UnknownType(target))?;
            if amount != 1 {
                return Err(invalid);
            }
            let level = target_level(colony, target);
            let cost = levelled_cost(info.cost, info.cost_factor, level);
            let speedup = colony.building_level(BuildingKind::ResearchArchive);
            Ok(Quote {
                cost,
                level_or_amount: level,
                duration_ms: levelled_build_time_ms(&cost, speedup, &data.tuning),
            })
        }
        ConstructionTarget::Unit(kind) => {
            let info = data.unit(kind).ok_or(ConstructionError::UnknownType(target))?;
            if amount == 0 {
                return Err(invalid);
            }
            let shipyard = colony.building_level(BuildingKind::Shipyard);
            Ok(Quote {
                cost: batch_cost(info.cost, amount),
                level_or_amount: amount,
                duration_ms: batch_build_time_ms(info.build_time_secs, amount, shipyard),
            })
        }
        ConstructionTarget::Defense(kind) => {
            let info = data.defense(kind).ok_or(ConstructionError::UnknownType(target))?;
            if amount == 0 {
                return Err(invalid);
            }
            let shipyard = colony.building_level(BuildingKind::Shipyard);
            Ok(Quote {
                cost: batch_cost(info.cost, amount),
                level_or_amount: amount,
                duration_ms: batch_build_time_ms(info.build_time_secs, amount, shipyard),
            })
        }
    }
}

/// Validate, debit and enqueue an order.
///
/// Buildings and research take `amount = 1` and advance one level; ships
/// and defenses accept any positive batch size. The cost is debited
/// immediately.
///
/// # Errors
///
/// Returns a [`ConstructionError`] and leaves the colony untouched when the
/// target is unknown, the amount is invalid, a requirement is unmet or the
/// stock does not cover the cost.
pub fn start_construction(
    colony: &mut Colony,
    data: &StaticData,
    target: ConstructionTarget,
    amount: u32,
    now: u64,
) -> Result<EntityId, ConstructionError> {
    let Quote {
        cost,
        level_or_amount,
        duration_ms,
    } = quote(colony, data, target, amount)?;

    if let Some(requirements) = data.requirements(target) {
        if let Some(&requirement) = requirements
            .iter()
            .find(|r| !r.is_met(&colony.buildings, &colony.research))
        {
            return Err(ConstructionError::RequirementNotMet {
                target,
                requirement,
            });
        }
    }

    if let Some(resource) = colony.resources.first_shortfall(&cost) {
        return Err(ConstructionError::InsufficientResources {
            resource,
            required: cost.get(resource),
            available: colony.resources.get(resource),
        });
    }

    let queue = target.queue();
    let start_time = match queue {
        QueueKind::Shipyard => now,
        QueueKind::Building | QueueKind::Research => colony
            .queue(queue)
            .back()
            .map_or(now, |back| back.end_time.max(now)),
    };

    colony.resources -= cost;
    let id = colony.allocate_id();
    colony.queue_mut(queue).push_back(QueueItem {
        id,
        target,
        level_or_amount,
        cost,
        start_time,
        end_time: start_time.saturating_add(duration_ms),
    });

    tracing::debug!(
        colony = %colony.id,
        %target,
        level_or_amount,
        id,
        end_time = start_time.saturating_add(duration_ms),
        "construction accepted"
    );
    Ok(id)
}

/// Remove a queued item that has not started and refund its cost.
///
/// Other queued items keep their stamped times; a gap left in a sequential
/// queue is not closed. The refund is capped at storage like any other
/// income.
///
/// # Errors
///
/// Returns [`ConstructionError::NotFound`] for an unknown id and
/// [`ConstructionError::NotCancellable`] for an item already in progress.
pub fn cancel_construction(
    colony: &mut Colony,
    queue: QueueKind,
    id: EntityId,
    now: u64,
) -> Result<QueueItem, ConstructionError> {
    let items = colony.queue_mut(queue);
    let index = items
        .iter()
        .position(|item| item.id == id)
        .ok_or(ConstructionError::NotFound(id))?;
    if items[index].has_started(now) {
        return Err(ConstructionError::NotCancellable(id));
    }

    let Some(removed) = items.remove(index) else {
        return Err(ConstructionError::NotFound(id));
    };
    colony.resources += removed.cost;
    economy::clamp_to_storage(colony);

    tracing::debug!(colony = %colony.id, %queue, id, "construction cancelled");
    Ok(removed)
}

/// Promote finished items into colony state.
///
/// Building and research queues complete at most their front item; the
/// shipyard completes every finished batch and keeps the rest in order.
/// Returns the completed items.
pub fn complete_queues(colony: &mut Colony, now: u64) -> Vec<QueueItem> {
    let mut completed = Vec::new();

    for queue in [QueueKind::Building, QueueKind::Research] {
        let front_done = colony
            .queue(queue)
            .front()
            .is_some_and(|item| item.is_complete(now));
        if front_done {
            if let Some(item) = colony.queue_mut(queue).pop_front() {
                apply_completion(colony, &item);
                completed.push(item);
            }
        }
    }

    let (done, pending): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut colony.shipyard_queue)
        .into_iter()
        .partition(|item| item.is_complete(now));
    colony.shipyard_queue = pending;
    for item in done {
        apply_completion(colony, &item);
        completed.push(item);
    }

    completed
}

fn apply_completion(colony: &mut Colony, item: &QueueItem) {
    let amount = item.level_or_amount;
    match item.target {
        ConstructionTarget::Building(kind) => {
            raise_level(colony.buildings.entry(kind).or_insert(0), amount);
        }
        ConstructionTarget::Research(kind) => {
            raise_level(colony.research.entry(kind).or_insert(0), amount);
        }
        ConstructionTarget::Unit(kind) => {
            let count = colony.units.entry(kind).or_insert(0);
            *count = count.saturating_add(amount);
        }
        ConstructionTarget::Defense(kind) => {
            let count = colony.defenses.entry(kind).or_insert(0);
            *count = count.saturating_add(amount);
        }
    }
    tracing::info!(
        colony = %colony.id,
        target = %item.target,
        level_or_amount = amount,
        id = item.id,
        "construction complete"
    );
}

fn raise_level(level: &mut u32, target: u32) {
    *level = (*level).max(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Coord;
    use crate::kinds::{DefenseKind, UnitKind};

    const NOW: u64 = 1_000_000;

    fn rich_colony() -> Colony {
        let mut colony = Colony::new(
            "p",
            "Test",
            Coord::new(5, 5),
            ResourceBundle::new(100_000, 100_000, 100_000),
            NOW,
        );
        colony.storage = ResourceBundle::new(1_000_000, 1_000_000, 1_000_000);
        colony
    }

    #[test]
    fn test_levelled_cost_growth() {
        let base = ResourceCost::new(100, 50, 0);
        assert_eq!(levelled_cost(base, Fixed::from_num(2), 1), ResourceBundle::new(100, 50, 0));
        assert_eq!(levelled_cost(base, Fixed::from_num(2), 4), ResourceBundle::new(800, 400, 0));
    }

    #[test]
    fn test_build_time_formulas() {
        let tuning = TuningData::default();
        // 2500 M+K is one hour at level 0, half that with one robotics level
        let cost = ResourceBundle::new(2000, 500, 0);
        assert_eq!(levelled_build_time_ms(&cost, 0, &tuning), 3_600_000);
        assert_eq!(levelled_build_time_ms(&cost, 1, &tuning), 1_800_000);
        assert_eq!(levelled_build_time_ms(&ResourceBundle::ZERO, 0, &tuning), MIN_BUILD_TIME_MS);

        assert_eq!(batch_build_time_ms(120, 10, 0), 1_200_000);
        assert_eq!(batch_build_time_ms(120, 10, 3), 300_000);
        assert_eq!(batch_build_time_ms(0, 10, 3), MIN_BUILD_TIME_MS);
    }

    #[test]
    fn test_start_debits_and_enqueues() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        let before = colony.resources;

        let id = start_construction(&mut colony, &data, BuildingKind::MetallumMine.into(), 1, NOW).unwrap();

        let item = &colony.building_queue[0];
        assert_eq!(item.id, id);
        assert_eq!(item.level_or_amount, 1);
        assert_eq!(item.start_time, NOW);
        assert!(item.end_time > NOW);
        assert_eq!(colony.resources, before - ResourceBundle::new(60, 15, 0));
    }

    #[test]
    fn test_queued_upgrades_raise_target_level() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        colony.buildings.insert(BuildingKind::SolarPlant, 2);

        start_construction(&mut colony, &data, BuildingKind::SolarPlant.into(), 1, NOW).unwrap();
        start_construction(&mut colony, &data, BuildingKind::SolarPlant.into(), 1, NOW).unwrap();

        let levels: Vec<u32> = colony.building_queue.iter().map(|i| i.level_or_amount).collect();
        assert_eq!(levels, vec![3, 4]);
        // sequential: the second starts when the first ends
        assert_eq!(colony.building_queue[1].start_time, colony.building_queue[0].end_time);
    }

    #[test]
    fn test_insufficient_resources_changes_nothing() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        colony.resources = ResourceBundle::new(10, 10, 10);
        let snapshot = colony.clone();

        let err = start_construction(&mut colony, &data, BuildingKind::MetallumMine.into(), 1, NOW)
            .unwrap_err();

        assert!(matches!(
            err,
            ConstructionError::InsufficientResources {
                resource: ResourceKind::Metallum,
                ..
            }
        ));
        assert_eq!(colony, snapshot);
    }

    #[test]
    fn test_requirements_enforced() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();

        let err = start_construction(&mut colony, &data, UnitKind::LightFighter.into(), 5, NOW).unwrap_err();
        assert!(matches!(err, ConstructionError::RequirementNotMet { .. }));

        colony.buildings.insert(BuildingKind::Shipyard, 1);
        assert!(start_construction(&mut colony, &data, UnitKind::LightFighter.into(), 5, NOW).is_ok());
    }

    #[test]
    fn test_invalid_amounts() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        colony.buildings.insert(BuildingKind::Shipyard, 1);

        assert!(matches!(
            start_construction(&mut colony, &data, DefenseKind::RocketLauncher.into(), 0, NOW),
            Err(ConstructionError::InvalidAmount { amount: 0, .. })
        ));
        assert!(matches!(
            start_construction(&mut colony, &data, BuildingKind::Shipyard.into(), 2, NOW),
            Err(ConstructionError::InvalidAmount { amount: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_type() {
        use crate::kinds::ResearchKind;

        let mut data = StaticData::builtin();
        data.research.remove(&ResearchKind::WarpDrive);
        let mut colony = rich_colony();

        assert_eq!(
            start_construction(&mut colony, &data, ResearchKind::WarpDrive.into(), 1, NOW),
            Err(ConstructionError::UnknownType(ResearchKind::WarpDrive.into()))
        );
    }

    #[test]
    fn test_building_queue_completes_front_only() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        start_construction(&mut colony, &data, BuildingKind::MetallumMine.into(), 1, NOW).unwrap();
        start_construction(&mut colony, &data, BuildingKind::KristallinMine.into(), 1, NOW).unwrap();

        let far_future = NOW + 1_000_000_000;
        let done = complete_queues(&mut colony, far_future);
        assert_eq!(done.len(), 1);
        assert_eq!(colony.building_level(BuildingKind::MetallumMine), 1);
        assert_eq!(colony.building_queue.len(), 1);

        let done = complete_queues(&mut colony, far_future);
        assert_eq!(done.len(), 1);
        assert_eq!(colony.building_level(BuildingKind::KristallinMine), 1);
        assert!(complete_queues(&mut colony, far_future).is_empty());
    }

    #[test]
    fn test_shipyard_completes_every_finished_batch() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        colony.buildings.insert(BuildingKind::Shipyard, 1);

        // probes: 30 s base, halved by shipyard level 1
        start_construction(&mut colony, &data, UnitKind::ExplorationProbe.into(), 2, NOW).unwrap();
        start_construction(&mut colony, &data, DefenseKind::RocketLauncher.into(), 10, NOW).unwrap();
        start_construction(&mut colony, &data, UnitKind::ExplorationProbe.into(), 1, NOW).unwrap();

        let done = complete_queues(&mut colony, NOW + 30_000);
        assert_eq!(done.len(), 2);
        assert_eq!(colony.unit_count(UnitKind::ExplorationProbe), 3);
        assert_eq!(colony.shipyard_queue.len(), 1);
        assert_eq!(colony.shipyard_queue[0].target, DefenseKind::RocketLauncher.into());
    }

    #[test]
    fn test_cancel_keeps_later_items_stamped() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        start_construction(&mut colony, &data, BuildingKind::MetallumMine.into(), 1, NOW).unwrap();
        let second = start_construction(&mut colony, &data, BuildingKind::SolarPlant.into(), 1, NOW).unwrap();
        let third = start_construction(&mut colony, &data, BuildingKind::KristallinMine.into(), 1, NOW).unwrap();
        let before = colony.resources;
        let third_before = colony.building_queue[2].clone();

        let removed = cancel_construction(&mut colony, QueueKind::Building, second, NOW).unwrap();

        assert_eq!(colony.resources, before + removed.cost);
        assert_eq!(colony.building_queue.len(), 2);
        assert_eq!(colony.building_queue[1].id, third);
        assert_eq!(colony.building_queue[1], third_before);
    }

    #[test]
    fn test_cancel_refund_capped_at_storage() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        start_construction(&mut colony, &data, BuildingKind::MetallumMine.into(), 1, NOW).unwrap();
        let second = start_construction(&mut colony, &data, BuildingKind::SolarPlant.into(), 1, NOW).unwrap();
        colony.storage = colony.resources;

        cancel_construction(&mut colony, QueueKind::Building, second, NOW).unwrap();

        assert_eq!(colony.resources.metallum, colony.storage.metallum);
        assert_eq!(colony.resources.kristallin, colony.storage.kristallin);
        assert!(colony.invariant_violations().is_empty());
    }

    #[test]
    fn test_cancel_rejects_started_and_unknown() {
        let data = StaticData::builtin();
        let mut colony = rich_colony();
        let first = start_construction(&mut colony, &data, BuildingKind::MetallumMine.into(), 1, NOW).unwrap();

        assert_eq!(
            cancel_construction(&mut colony, QueueKind::Building, first, NOW),
            Err(ConstructionError::NotCancellable(first))
        );
        assert_eq!(
            cancel_construction(&mut colony, QueueKind::Research, first, NOW),
            Err(ConstructionError::NotFound(first))
        );
    }
}
