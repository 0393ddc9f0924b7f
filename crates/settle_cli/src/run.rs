//! Single-problem placement runs.

use settle_diagnostics::DiagnosticSink;
use settle_place::{Annealer, NullMonitor, SaSettings};
use settle_spatial::Chip;
use std::path::Path;

/// Loads one problem, anneals it with the default presets, and prints the
/// outcome.
///
/// Returns the process exit code.
pub fn run(path: &Path, sink: &DiagnosticSink) -> Result<i32, Box<dyn std::error::Error>> {
    let mut chip = Chip::load(path, sink)?;

    let settings = SaSettings {
        show_stdout: true,
        ..SaSettings::default()
    };
    let results = Annealer::new(&mut chip).run(&settings, &mut NullMonitor, sink);

    println!("final cost: {}", results.cost);
    println!("iterations: {}", results.iterations);
    Ok(0)
}
