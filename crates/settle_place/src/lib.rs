//! Simulated-annealing placement core for the settle placement tool.
//!
//! Takes a [`Chip`](settle_spatial::Chip) with an empty placement and
//! searches for a block-to-slot assignment minimizing the row-biased
//! half-perimeter wirelength. The search is classic simulated annealing
//! with two interchangeable temperature schedules and an adaptive range
//! window that narrows partner-slot selection as the acceptance rate
//! drops.
//!
//! # Usage
//!
//! ```ignore
//! use settle_place::{Annealer, NullMonitor, SaSettings};
//!
//! let mut annealer = Annealer::new(&mut chip);
//! let results = annealer.run(&SaSettings::default(), &mut NullMonitor, &sink);
//! println!("final cost {} after {} cycles", results.cost, results.iterations);
//! ```

#![warn(missing_docs)]

pub mod anneal;
pub mod monitor;
pub mod moves;
pub mod settings;

pub use anneal::Annealer;
pub use monitor::{NullMonitor, PlacementMonitor};
pub use settings::{GuiUpdate, SaResults, SaSettings, TempSchedule};
