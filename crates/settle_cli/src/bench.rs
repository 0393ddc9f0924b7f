//! Parallel benchmark execution and JSON reporting.
//!
//! Runs a fixed list of placement problems `repeat` times each, one worker
//! thread per `(name, repeat)` pair. Workers share nothing but the result
//! map, which is locked only for single-entry inserts; arrival order is
//! irrelevant because the report indexes results by `(name, repeat)`.

use serde::Serialize;
use settle_diagnostics::DiagnosticSink;
use settle_place::{Annealer, NullMonitor, SaResults, SaSettings, TempSchedule};
use settle_spatial::Chip;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

/// The benchmark problem set.
pub const BENCH_NAMES: [&str; 12] = [
    "alu2", "apex1", "apex4", "C880", "cm138a", "cm150a", "cm151a", "cm162a", "cps", "e64",
    "paira", "pairb",
];

/// Errors that abort a benchmark session.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The output file could not be created.
    #[error("failed to open {path} for writing: {source}")]
    OutputOpen {
        /// The requested output path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file could not be read.
    #[error("failed to read benchmark settings: {0}")]
    SettingsIo(std::io::Error),

    /// The settings file is not a JSON object.
    #[error("benchmark settings must be a JSON object")]
    SettingsNotObject,

    /// The settings file is not valid JSON.
    #[error("benchmark settings are not valid JSON: {0}")]
    SettingsParse(serde_json::Error),

    /// Serializing or writing the report failed.
    #[error("failed to write benchmark results: {0}")]
    ReportWrite(serde_json::Error),
}

/// Per-benchmark slice of the JSON report, arrays indexed by repeat.
#[derive(Debug, Serialize)]
struct BenchRecord {
    costs: Vec<i64>,
    iterations: Vec<i64>,
}

/// Runs benchmarks in worker threads and aggregates their results.
pub struct Benchmarker {
    json_out: PathBuf,
    repeat: usize,
    bench_dir: PathBuf,
    names: Vec<String>,
    settings: SaSettings,
}

impl Benchmarker {
    /// Creates a benchmarker over the standard problem set.
    pub fn new(json_out: PathBuf, repeat: usize, bench_dir: PathBuf) -> Self {
        Self {
            json_out,
            repeat,
            bench_dir,
            names: BENCH_NAMES.iter().map(|s| s.to_string()).collect(),
            settings: SaSettings::default(),
        }
    }

    /// Replaces the problem set; used by tests with generated problems.
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Reads annealer settings from a JSON file.
    ///
    /// Recognized keys override the defaults; unknown keys and wrongly
    /// typed values produce warnings and are ignored. The GUI-update tag
    /// is never read from the file.
    pub fn read_settings(&mut self, path: &Path, sink: &DiagnosticSink) -> Result<(), BenchError> {
        let text = std::fs::read_to_string(path).map_err(BenchError::SettingsIo)?;
        self.settings = parse_settings(&text, sink)?;
        Ok(())
    }

    /// Runs every `(name, repeat)` pair and writes the JSON report.
    ///
    /// The output file is created before any worker starts, so a bad path
    /// fails fast instead of discarding finished runs.
    pub fn run(&self, sink: &DiagnosticSink) -> Result<(), BenchError> {
        let file = File::create(&self.json_out).map_err(|source| BenchError::OutputOpen {
            path: self.json_out.clone(),
            source,
        })?;

        let results: Mutex<HashMap<(String, usize), SaResults>> = Mutex::new(HashMap::new());
        thread::scope(|scope| {
            for name in &self.names {
                for repeat in 0..self.repeat {
                    let path = self.bench_dir.join(format!("{name}.txt"));
                    let results = &results;
                    let settings = &self.settings;
                    scope.spawn(move || {
                        let outcome = run_single(&path, settings, sink);
                        results
                            .lock()
                            .unwrap()
                            .insert((name.clone(), repeat), outcome);
                    });
                }
            }
        });

        let results = results.into_inner().unwrap();
        let mut report = BTreeMap::new();
        for name in &self.names {
            let mut costs = Vec::with_capacity(self.repeat);
            let mut iterations = Vec::with_capacity(self.repeat);
            for repeat in 0..self.repeat {
                let outcome = results
                    .get(&(name.clone(), repeat))
                    .copied()
                    .unwrap_or_default();
                costs.push(outcome.cost);
                iterations.push(outcome.iterations);
            }
            report.insert(name.clone(), BenchRecord { costs, iterations });
        }

        serde_json::to_writer_pretty(&file, &report).map_err(BenchError::ReportWrite)?;
        Ok(())
    }
}

/// Loads one problem and runs one annealing pass over it.
///
/// A chip that fails to load still yields a result: the degenerate
/// `{-1, -1}` pair, with a warning explaining why.
fn run_single(path: &Path, settings: &SaSettings, sink: &DiagnosticSink) -> SaResults {
    match Chip::load(path, sink) {
        Ok(mut chip) => Annealer::new(&mut chip).run(settings, &mut NullMonitor, sink),
        Err(e) => {
            sink.warn(format!("skipping benchmark {}: {e}", path.display()));
            SaResults::default()
        }
    }
}

/// Parses the flat settings object, warning about anything unrecognized.
fn parse_settings(text: &str, sink: &DiagnosticSink) -> Result<SaSettings, BenchError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(BenchError::SettingsParse)?;
    let Some(object) = value.as_object() else {
        return Err(BenchError::SettingsNotObject);
    };

    let mut settings = SaSettings::default();
    for (key, value) in object {
        match key.as_str() {
            "t_schd" => match value.as_i64() {
                Some(0) => settings.t_schd = TempSchedule::ExpDecay,
                Some(1) => settings.t_schd = TempSchedule::StdDev,
                _ => sink.warn(format!(
                    "t_schd expects 0 (exponential decay) or 1 (standard deviation), got {value}"
                )),
            },
            "decay_b" => read_f64(key, value, &mut settings.decay_b, sink),
            "swap_fact" => read_f64(key, value, &mut settings.swap_fact, sink),
            "max_its" => read_u32(key, value, &mut settings.max_its, sink),
            "max_its_cost_unchanged" => {
                read_u32(key, value, &mut settings.max_its_cost_unchanged, sink)
            }
            "use_rw" => read_bool(key, value, &mut settings.use_rw, sink),
            "p_upper" => read_f64(key, value, &mut settings.p_upper, sink),
            "p_lower" => read_f64(key, value, &mut settings.p_lower, sink),
            "min_rw_dim" => read_u32(key, value, &mut settings.min_rw_dim, sink),
            "rw_dim_delta" => read_u32(key, value, &mut settings.rw_dim_delta, sink),
            "sanity_check" => read_bool(key, value, &mut settings.sanity_check, sink),
            "show_stdout" => read_bool(key, value, &mut settings.show_stdout, sink),
            other => sink.warn(format!("unidentified setting '{other}' was ignored")),
        }
    }
    Ok(settings)
}

fn read_f64(key: &str, value: &serde_json::Value, slot: &mut f64, sink: &DiagnosticSink) {
    match value.as_f64() {
        Some(v) => *slot = v,
        None => sink.warn(format!("setting '{key}' expects a number, got {value}")),
    }
}

fn read_u32(key: &str, value: &serde_json::Value, slot: &mut u32, sink: &DiagnosticSink) {
    match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
        Some(v) => *slot = v,
        None => sink.warn(format!(
            "setting '{key}' expects a non-negative integer, got {value}"
        )),
    }
}

fn read_bool(key: &str, value: &serde_json::Value, slot: &mut bool, sink: &DiagnosticSink) {
    match value.as_bool() {
        Some(v) => *slot = v,
        None => sink.warn(format!("setting '{key}' expects a boolean, got {value}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI: &str = "2 1 2 3\n2 0 1\n";
    const MINI_2: &str = "5 2 4 4\n4 0 1 2 3\n2 0 4\n";

    fn quick_settings_json() -> &'static str {
        r#"{
            "t_schd": 0,
            "decay_b": 0.9,
            "swap_fact": 2.0,
            "max_its": 40,
            "use_rw": false,
            "p_upper": 0.6,
            "p_lower": 0.3,
            "min_rw_dim": 3,
            "rw_dim_delta": 4,
            "sanity_check": true,
            "show_stdout": false
        }"#
    }

    #[test]
    fn standard_problem_set_has_twelve_names() {
        assert_eq!(BENCH_NAMES.len(), 12);
        assert_eq!(BENCH_NAMES[0], "alu2");
        assert_eq!(BENCH_NAMES[11], "pairb");
    }

    #[test]
    fn parse_settings_applies_known_keys() {
        let sink = DiagnosticSink::new();
        let settings = parse_settings(quick_settings_json(), &sink).unwrap();
        assert_eq!(settings.t_schd, TempSchedule::ExpDecay);
        assert_eq!(settings.decay_b, 0.9);
        assert_eq!(settings.swap_fact, 2.0);
        assert_eq!(settings.max_its, 40);
        assert!(!settings.use_rw);
        assert_eq!(settings.p_upper, 0.6);
        assert_eq!(settings.p_lower, 0.3);
        assert_eq!(settings.min_rw_dim, 3);
        assert_eq!(settings.rw_dim_delta, 4);
        assert!(settings.sanity_check);
        assert!(!settings.show_stdout);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn parse_settings_t_schd_one_is_std_dev() {
        let sink = DiagnosticSink::new();
        let settings = parse_settings(r#"{"t_schd": 1}"#, &sink).unwrap();
        assert_eq!(settings.t_schd, TempSchedule::StdDev);
    }

    #[test]
    fn parse_settings_warns_on_unknown_key() {
        let sink = DiagnosticSink::new();
        let settings = parse_settings(r#"{"t_schedule": 1, "max_its": 7}"#, &sink).unwrap();
        assert_eq!(settings.max_its, 7);
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("unidentified setting 't_schedule'")));
    }

    #[test]
    fn parse_settings_warns_on_wrong_type() {
        let sink = DiagnosticSink::new();
        let settings = parse_settings(r#"{"max_its": "lots", "t_schd": 9}"#, &sink).unwrap();
        assert_eq!(settings.max_its, SaSettings::default().max_its);
        assert_eq!(settings.t_schd, SaSettings::default().t_schd);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn parse_settings_accepts_early_exit_key() {
        let sink = DiagnosticSink::new();
        let settings = parse_settings(r#"{"max_its_cost_unchanged": 50}"#, &sink).unwrap();
        assert_eq!(settings.max_its_cost_unchanged, 50);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn parse_settings_rejects_non_object() {
        let sink = DiagnosticSink::new();
        assert!(matches!(
            parse_settings("[1, 2, 3]", &sink),
            Err(BenchError::SettingsNotObject)
        ));
        assert!(matches!(
            parse_settings("not json at all {{{", &sink),
            Err(BenchError::SettingsParse(_))
        ));
    }

    #[test]
    fn benchmark_run_writes_indexed_report() {
        let sink = DiagnosticSink::new();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mini.txt"), MINI).unwrap();
        std::fs::write(dir.path().join("mini_2.txt"), MINI_2).unwrap();
        let out = dir.path().join("out.json");

        let mut bm = Benchmarker::new(out.clone(), 3, dir.path().to_path_buf())
            .with_names(&["mini", "mini_2"]);
        bm.settings.max_its = 40;
        bm.run(&sink).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let object = report.as_object().unwrap();
        assert_eq!(object.len(), 2);
        for name in ["mini", "mini_2"] {
            let entry = &object[name];
            let costs = entry["costs"].as_array().unwrap();
            let iterations = entry["iterations"].as_array().unwrap();
            assert_eq!(costs.len(), 3);
            assert_eq!(iterations.len(), 3);
            for (c, i) in costs.iter().zip(iterations) {
                assert!(c.as_i64().unwrap() > 0);
                assert!(i.as_i64().unwrap() > 0);
            }
        }
    }

    #[test]
    fn missing_problem_stores_degenerate_result() {
        let sink = DiagnosticSink::new();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");

        let bm = Benchmarker::new(out.clone(), 2, dir.path().to_path_buf())
            .with_names(&["ghost"]);
        bm.run(&sink).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["ghost"]["costs"], serde_json::json!([-1, -1]));
        assert_eq!(report["ghost"]["iterations"], serde_json::json!([-1, -1]));
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("skipping benchmark")));
    }

    #[test]
    fn unwritable_output_fails_before_any_worker() {
        let sink = DiagnosticSink::new();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no_such_dir").join("out.json");

        let bm = Benchmarker::new(out, 1, dir.path().to_path_buf()).with_names(&["mini"]);
        assert!(matches!(
            bm.run(&sink),
            Err(BenchError::OutputOpen { .. })
        ));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn read_settings_missing_file_is_fatal() {
        let sink = DiagnosticSink::new();
        let dir = tempfile::tempdir().unwrap();
        let mut bm = Benchmarker::new(dir.path().join("o.json"), 1, dir.path().to_path_buf());
        let err = bm
            .read_settings(Path::new("/nonexistent/settings.json"), &sink)
            .unwrap_err();
        assert!(matches!(err, BenchError::SettingsIo(_)));
    }
}
