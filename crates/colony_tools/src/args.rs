//! Parsing helpers for command-line values.

use std::collections::BTreeMap;

use colony_core::kinds::UnitKind;

use crate::error::{Result, ToolError};

/// Parse `kind=count` pairs into a fleet composition.
///
/// Repeated kinds are summed. A bare kind means one ship.
///
/// ```
/// use colony_core::kinds::UnitKind;
/// use colony_tools::args::parse_fleet;
///
/// let fleet = parse_fleet(&["light_fighter=5", "small_cargo"]).unwrap();
/// assert_eq!(fleet[&UnitKind::LightFighter], 5);
/// assert_eq!(fleet[&UnitKind::SmallCargo], 1);
/// ```
pub fn parse_fleet<S: AsRef<str>>(specs: &[S]) -> Result<BTreeMap<UnitKind, u32>> {
    let mut fleet = BTreeMap::new();
    for spec in specs {
        let spec = spec.as_ref();
        let (name, count) = match spec.split_once('=') {
            Some((name, count)) => {
                let count: u32 = count
                    .trim()
                    .parse()
                    .map_err(|_| ToolError::InvalidArgument(format!("bad ship count in '{spec}'")))?;
                (name.trim(), count)
            }
            None => (spec.trim(), 1),
        };
        let kind: UnitKind = name
            .parse()
            .map_err(|e| ToolError::InvalidArgument(format!("{e}")))?;
        let entry = fleet.entry(kind).or_insert(0u32);
        *entry = entry.saturating_add(count);
    }
    fleet.retain(|_, count| *count > 0);
    if fleet.is_empty() {
        return Err(ToolError::InvalidArgument("fleet has no ships".to_string()));
    }
    Ok(fleet)
}
