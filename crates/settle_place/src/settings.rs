//! Annealer settings and results.

/// The annealing temperature schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TempSchedule {
    /// Exponential decay: `T ← T · decay_b` after every cycle.
    ExpDecay,
    /// Variance-driven update: `T ← T · exp(−0.7 · T / σ)` where `σ` is the
    /// standard deviation of the costs accepted during the run so far.
    StdDev,
}

/// How often the annealer emits progress events to its monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuiUpdate {
    /// After every swap attempt, accepted or not.
    EachSwap,
    /// Once per temperature cycle.
    EachAnnealUpdate,
    /// Once, at termination.
    FinalOnly,
}

impl GuiUpdate {
    /// Whether a chip snapshot is emitted after every swap attempt.
    pub fn each_swap(self) -> bool {
        self == GuiUpdate::EachSwap
    }

    /// Whether snapshot and telemetry are emitted after every cycle.
    pub fn each_cycle(self) -> bool {
        matches!(self, GuiUpdate::EachSwap | GuiUpdate::EachAnnealUpdate)
    }
}

/// Simulated annealer settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaSettings {
    /// Progress-event frequency.
    pub gui_up: GuiUpdate,

    /// Temperature schedule.
    pub t_schd: TempSchedule,
    /// Base factor for the exponential-decay schedule, in `(0, 1)`.
    pub decay_b: f64,
    /// `swap_fact · B^(4/3)` swap attempts are made per cycle.
    pub swap_fact: f64,
    /// Maximum number of temperature cycles.
    pub max_its: u32,
    /// Exit the outer loop early when the cycle-end cost has not changed
    /// for this many consecutive cycles. 0 disables the check.
    pub max_its_cost_unchanged: u32,

    /// Whether the range window restricts partner-slot selection.
    pub use_rw: bool,
    /// Upper acceptance bound that triggers range-window enlargement.
    pub p_upper: f64,
    /// Lower acceptance bound that triggers range-window shrinkage.
    pub p_lower: f64,
    /// Never reduce the range-window side below this.
    pub min_rw_dim: u32,
    /// Grow or shrink the range-window side by this much.
    pub rw_dim_delta: u32,

    /// Recompute the cost each cycle and warn when the cache disagrees.
    pub sanity_check: bool,
    /// Print per-cycle progress lines on stdout.
    pub show_stdout: bool,
}

impl Default for SaSettings {
    fn default() -> Self {
        Self {
            gui_up: GuiUpdate::EachAnnealUpdate,
            t_schd: TempSchedule::StdDev,
            decay_b: 0.995,
            swap_fact: 25.0,
            max_its: 3000,
            max_its_cost_unchanged: 200,
            use_rw: true,
            p_upper: 0.55,
            p_lower: 0.35,
            min_rw_dim: 5,
            rw_dim_delta: 10,
            sanity_check: false,
            show_stdout: false,
        }
    }
}

/// Results of one annealing run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaResults {
    /// Final cost of the layout, −1 if the run never produced one.
    pub cost: i64,
    /// Total temperature cycles used, −1 if the run never started.
    pub iterations: i64,
}

impl Default for SaResults {
    fn default() -> Self {
        Self {
            cost: -1,
            iterations: -1,
        }
    }
}
