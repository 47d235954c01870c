//! Per-tick data model for the parking bay.
//!
//! Every value here is built fresh by the control loop each tick and
//! dropped at the end of it.  Nothing in this module carries history.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of physical parking positions wired to the board.
pub const SLOT_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Zero-based index of a physical parking position.
///
/// Order matches the physical slot order and the order of
/// [`BayConfig::slots`](crate::config::BayConfig::slots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u8);

impl SlotId {
    /// Every slot, in physical order.
    pub const ALL: [SlotId; SLOT_COUNT] = [SlotId(0), SlotId(1), SlotId(2)];

    /// Build a slot id from a zero-based index.  `None` if out of range.
    pub const fn new(index: usize) -> Option<Self> {
        if index < SLOT_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// One-based label used on the display and in the upload query (`ir1`..).
    pub const fn number(self) -> u8 {
        self.0 + 1
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.number())
    }
}

/// Derived presence state of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotState {
    Occupied,
    Empty,
}

impl SlotState {
    /// Text form used at the external boundary (upload query, display).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Occupied => "Occupied",
            Self::Empty => "Empty",
        }
    }

    pub const fn is_occupied(self) -> bool {
        matches!(self, Self::Occupied)
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot's derived state for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReading {
    pub slot: SlotId,
    pub state: SlotState,
}

/// Aggregate occupancy for one tick.
///
/// `available` is always `SLOT_COUNT - occupied`; the only constructor
/// computes it from the states so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyReport {
    states: [SlotState; SLOT_COUNT],
    available: usize,
}

impl OccupancyReport {
    pub fn from_states(states: [SlotState; SLOT_COUNT]) -> Self {
        let occupied = states.iter().filter(|s| s.is_occupied()).count();
        Self {
            states,
            available: SLOT_COUNT - occupied,
        }
    }

    pub fn states(&self) -> &[SlotState; SLOT_COUNT] {
        &self.states
    }

    pub fn state(&self, slot: SlotId) -> SlotState {
        self.states[slot.index()]
    }

    /// Slots currently free.
    pub fn available_count(&self) -> usize {
        self.available
    }

    pub fn occupied_count(&self) -> usize {
        SLOT_COUNT - self.available
    }

    pub const fn total(&self) -> usize {
        SLOT_COUNT
    }

    /// Per-slot records in physical order.
    pub fn readings(&self) -> impl Iterator<Item = SlotReading> + '_ {
        SlotId::ALL
            .into_iter()
            .map(|slot| SlotReading { slot, state: self.state(slot) })
    }
}

// ---------------------------------------------------------------------------
// Gas / relay
// ---------------------------------------------------------------------------

/// Raw analog gas sample (ADC counts, 0 – 4095 on a 12-bit converter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct GasReading(pub u16);

impl GasReading {
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for GasReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exhaust-fan relay command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayState {
    On,
    Off,
}

impl RelayState {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for RelayState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Temperature / humidity pair from the climate sensor.
///
/// A field the sensor failed to produce this tick is `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvironmentSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl EnvironmentSample {
    pub const INVALID: Self = Self {
        temperature_c: f32::NAN,
        humidity_pct: f32::NAN,
    };

    pub const fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self { temperature_c, humidity_pct }
    }

    /// Both fields are numbers.  A half-valid sample is invalid.
    pub fn is_valid(&self) -> bool {
        !self.temperature_c.is_nan() && !self.humidity_pct.is_nan()
    }
}

/// Everything eligible for publish/upload on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPayload {
    pub environment: EnvironmentSample,
    pub gas: GasReading,
    pub occupancy: OccupancyReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ids_are_one_based_on_the_wire() {
        let numbers: Vec<u8> = SlotId::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(SlotId::new(SLOT_COUNT).is_none());
    }

    #[test]
    fn report_counts_available_slots() {
        let r = OccupancyReport::from_states([
            SlotState::Occupied,
            SlotState::Empty,
            SlotState::Occupied,
        ]);
        assert_eq!(r.available_count(), 1);
        assert_eq!(r.occupied_count(), 2);
        assert_eq!(r.state(SlotId::ALL[1]), SlotState::Empty);
    }

    #[test]
    fn all_empty_and_all_full_bounds() {
        let empty = OccupancyReport::from_states([SlotState::Empty; SLOT_COUNT]);
        assert_eq!(empty.available_count(), SLOT_COUNT);
        let full = OccupancyReport::from_states([SlotState::Occupied; SLOT_COUNT]);
        assert_eq!(full.available_count(), 0);
    }

    #[test]
    fn half_valid_sample_is_invalid() {
        assert!(EnvironmentSample::new(25.0, 60.0).is_valid());
        assert!(!EnvironmentSample::new(f32::NAN, 60.0).is_valid());
        assert!(!EnvironmentSample::new(25.0, f32::NAN).is_valid());
        assert!(!EnvironmentSample::INVALID.is_valid());
    }

    #[test]
    fn slot_state_text_form() {
        assert_eq!(SlotState::Occupied.to_string(), "Occupied");
        assert_eq!(SlotState::Empty.as_str(), "Empty");
    }
}
