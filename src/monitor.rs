//! Occupancy monitor.
//!
//! Scans the slots in physical order, drives each slot's indicator from
//! its derived state, and folds the states into an [`OccupancyReport`].
//! Indicators are lit for **available** slots.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::model::{OccupancyReport, SLOT_COUNT, SlotId, SlotState};

/// Indicator level for a slot state: lit means free.
pub const fn indicator_lit(state: SlotState) -> bool {
    matches!(state, SlotState::Empty)
}

/// Fold per-slot states into the tick's report.
pub fn aggregate(states: [SlotState; SLOT_COUNT]) -> OccupancyReport {
    OccupancyReport::from_states(states)
}

/// Read every slot once, update its indicator, and return the aggregate.
///
/// Each slot read carries its own settle wait, so a full scan blocks for
/// up to `SLOT_COUNT` settle intervals.
pub fn scan(hw: &mut (impl SensorPort + ActuatorPort)) -> OccupancyReport {
    let mut states = [SlotState::Empty; SLOT_COUNT];
    for slot in SlotId::ALL {
        let state = hw.read_slot(slot);
        hw.set_indicator(slot, indicator_lit(state));
        states[slot.index()] = state;
    }
    aggregate(states)
}
