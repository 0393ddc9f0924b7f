//! Progress-event sink for annealer listeners.
//!
//! The annealer reports progress through an injected [`PlacementMonitor`]
//! rather than owning any visualization machinery. Callbacks are invoked
//! synchronously on the annealing thread; they must be non-blocking and
//! must not re-enter the annealer.

use settle_spatial::Chip;

/// Listener interface for placement progress.
pub trait PlacementMonitor {
    /// Called with the current chip state; frequency is governed by
    /// [`GuiUpdate`](crate::GuiUpdate).
    fn on_chip_update(&mut self, _chip: &Chip) {}

    /// Called once per cycle with the telemetry tuple: cached cost,
    /// temperature, mean uphill acceptance probability, and range-window
    /// side length.
    fn on_telemetry(&mut self, _cost: i64, _t: f64, _p_accept: f64, _rw_dim: u32) {}
}

/// A monitor that ignores every event; used in headless and benchmark runs.
pub struct NullMonitor;

impl PlacementMonitor for NullMonitor {}
