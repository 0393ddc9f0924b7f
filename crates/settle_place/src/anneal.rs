//! The simulated-annealing placement loop.
//!
//! Starting from a random placement, the annealer repeatedly proposes slot
//! swaps and accepts or rejects each with the Metropolis criterion. The
//! temperature follows one of two schedules (exponential decay or the
//! variance-driven update), and the partner-slot selection adapts a square
//! range window to keep the uphill acceptance rate inside a target band.

use crate::monitor::PlacementMonitor;
use crate::moves;
use crate::settings::{SaResults, SaSettings, TempSchedule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use settle_diagnostics::DiagnosticSink;
use settle_spatial::{BlockId, Chip};

/// Number of performed random swaps used for the initial temperature estimate.
const RAND_MOVES: usize = 50;

/// Scale factor applied to the delta standard deviation for the initial
/// temperature (Sangiovanni-Vincentelli estimate).
const T_FACT: f64 = 20.0;

/// Simulated-annealing block placer over a borrowed chip.
///
/// Holds exclusive mutable access to the chip for the duration of one run;
/// every committed swap is observable through the chip afterwards.
pub struct Annealer<'c> {
    chip: &'c mut Chip,
    rng: StdRng,
}

impl<'c> Annealer<'c> {
    /// Creates an annealer seeded from the system entropy source.
    pub fn new(chip: &'c mut Chip) -> Self {
        Self {
            chip,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates an annealer with an explicit seed, for deterministic runs.
    pub fn with_seed(chip: &'c mut Chip, seed: u64) -> Self {
        Self {
            chip,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Places every block onto a distinct random empty slot.
    ///
    /// Clears any existing placement first, then draws slots
    /// pick-and-remove from the free list so no slot is used twice.
    pub fn init_block_pos(&mut self) {
        self.chip.init_empty_placements();
        let nx = self.chip.dim_x();
        let ny = self.chip.dim_y();
        let mut free: Vec<usize> = (0..nx * ny).collect();
        for b in 0..self.chip.num_blocks() {
            if free.is_empty() {
                break;
            }
            let pick = self.rng.gen_range(0..free.len());
            let slot = free.swap_remove(pick);
            self.chip
                .set_loc_block((slot % nx, slot / nx), Some(BlockId::from_raw(b as u32)));
        }
    }

    /// Runs the annealer to completion and returns the final cost and
    /// cycle count.
    ///
    /// Refuses to run on an uninitialized or oversubscribed chip and on
    /// single-block problems, returning the default results.
    pub fn run(
        &mut self,
        settings: &SaSettings,
        monitor: &mut dyn PlacementMonitor,
        sink: &DiagnosticSink,
    ) -> SaResults {
        let n_blocks = self.chip.num_blocks();
        let nx = self.chip.dim_x();
        let ny = self.chip.dim_y();

        if !self.chip.is_initialized() || n_blocks == 0 {
            sink.warn("annealer invoked on an uninitialized chip");
            return SaResults::default();
        }
        if n_blocks > nx * ny {
            sink.warn(format!(
                "cannot place {n_blocks} blocks on a grid of {} slots",
                nx * ny
            ));
            return SaResults::default();
        }

        self.init_block_pos();
        if n_blocks == 1 {
            return SaResults::default();
        }

        let max_dim = nx.max(ny) as u32;
        let min_rw_dim = settings.min_rw_dim.max(1).min(nx.min(ny) as u32);
        let mut rw_dim = max_dim;

        let mut t = self.init_temp_sv(RAND_MOVES, T_FACT, sink);
        let cost = self.chip.calc_cost(sink);
        self.chip.set_cost(cost);

        let cycle_attempts = (settings.swap_fact * (n_blocks as f64).powf(4.0 / 3.0)) as u64;
        let cycle_attempts = cycle_attempts.max(1);
        let max_its = i64::from(settings.max_its.max(1));

        monitor.on_chip_update(self.chip);

        let mut iterations: i64 = 0;
        let mut n_swaps: u64 = 0;
        let mut cost_sum = 0.0f64;
        let mut cost_sq_sum = 0.0f64;
        let mut last_cycle_cost = self.chip.cost();
        let mut unchanged_cycles: u32 = 0;

        loop {
            let mut p_accept_accum = 0.0f64;
            for _ in 0..cycle_attempts {
                let effective_rw = if settings.use_rw { rw_dim } else { max_dim };
                let (coord_a, coord_b) =
                    moves::pick_locs_to_swap(&mut self.rng, self.chip, effective_rw);
                let delta = self.chip.calc_swap_cost_delta(coord_a, coord_b, sink);

                if self.accept_cost_delta(delta, t, &mut p_accept_accum) {
                    self.chip.swap_locs(coord_a, coord_b);
                    self.chip.add_cost_delta(delta, sink);
                    n_swaps += 1;
                    let c = self.chip.cost() as f64;
                    cost_sum += c;
                    cost_sq_sum += c * c;
                }
                if settings.gui_up.each_swap() {
                    monitor.on_chip_update(self.chip);
                }
            }
            iterations += 1;

            let p_accept = p_accept_accum / cycle_attempts as f64;
            if settings.use_rw {
                rw_dim = update_range_window(rw_dim, p_accept, settings, min_rw_dim, max_dim);
            }

            // The cycle after this one is the last; run it greedily.
            let last_reached = iterations >= max_its - 1;
            if last_reached {
                t = 0.0;
            } else {
                t = self.next_temperature(t, settings, n_swaps, cost_sum, cost_sq_sum);
            }

            if settings.sanity_check {
                let recomputed = self.chip.calc_cost(sink);
                if recomputed != self.chip.cost() {
                    sink.warn(format!(
                        "cost cache {} disagrees with recomputed cost {recomputed}",
                        self.chip.cost()
                    ));
                }
            }

            if settings.show_stdout {
                println!(
                    "cycle {iterations}: cost={} T={t:.4} p_accept={p_accept:.3} rw_dim={rw_dim}",
                    self.chip.cost()
                );
            }
            if settings.gui_up.each_cycle() {
                monitor.on_chip_update(self.chip);
                monitor.on_telemetry(self.chip.cost(), t, p_accept, rw_dim);
            }

            if iterations >= max_its || !t.is_finite() {
                break;
            }
            if settings.max_its_cost_unchanged > 0 {
                if self.chip.cost() == last_cycle_cost {
                    unchanged_cycles += 1;
                    if unchanged_cycles >= settings.max_its_cost_unchanged {
                        break;
                    }
                } else {
                    unchanged_cycles = 0;
                    last_cycle_cost = self.chip.cost();
                }
            }
        }

        monitor.on_chip_update(self.chip);

        SaResults {
            cost: self.chip.cost(),
            iterations,
        }
    }

    /// Estimates the initial temperature from a short random walk.
    ///
    /// Performs `rand_moves` full-grid swaps (committing each one) and
    /// returns `t_fact` times the population standard deviation of their
    /// cost deltas.
    fn init_temp_sv(&mut self, rand_moves: usize, t_fact: f64, sink: &DiagnosticSink) -> f64 {
        let max_dim = self.chip.dim_x().max(self.chip.dim_y()) as u32;
        let mut deltas = Vec::with_capacity(rand_moves);
        for _ in 0..rand_moves {
            let (coord_a, coord_b) = moves::pick_locs_to_swap(&mut self.rng, self.chip, max_dim);
            let delta = self.chip.calc_swap_cost_delta(coord_a, coord_b, sink);
            self.chip.swap_locs(coord_a, coord_b);
            deltas.push(delta as f64);
        }
        let n = deltas.len() as f64;
        let mean = deltas.iter().sum::<f64>() / n;
        let variance = deltas.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
        t_fact * variance.sqrt()
    }

    /// Decides whether to accept a cost delta at temperature `t`.
    ///
    /// Downhill and flat moves are always accepted and contribute nothing
    /// to `p_accept_accum`; the accumulator tracks the uphill acceptance
    /// probabilities only, which is what the range-window controller wants.
    /// `t = 0` accepts improvements only, without evaluating `exp`.
    fn accept_cost_delta(&mut self, delta: i64, t: f64, p_accept_accum: &mut f64) -> bool {
        if delta <= 0 {
            return true;
        }
        if t <= 0.0 {
            return false;
        }
        let p = (-(delta as f64) / t).exp();
        *p_accept_accum += p;
        self.rng.gen::<f64>() < p
    }

    /// Applies the configured temperature schedule.
    fn next_temperature(
        &self,
        t: f64,
        settings: &SaSettings,
        n_swaps: u64,
        cost_sum: f64,
        cost_sq_sum: f64,
    ) -> f64 {
        match settings.t_schd {
            TempSchedule::ExpDecay => t * settings.decay_b,
            TempSchedule::StdDev => {
                if n_swaps == 0 {
                    return t;
                }
                let mean = cost_sum / n_swaps as f64;
                let variance = (cost_sq_sum / n_swaps as f64 - mean * mean).max(0.0);
                let sigma = variance.sqrt();
                if sigma == 0.0 {
                    return t;
                }
                t * (-0.7 * t / sigma).exp()
            }
        }
    }
}

/// Adapts the range-window side to the measured uphill acceptance rate.
///
/// Grows when acceptance exceeds `p_upper`, shrinks when it falls below
/// `p_lower`, staying within `[min_rw_dim, max_dim]`. A changed even side
/// is decremented to the next odd value unless that would violate the
/// lower bound.
fn update_range_window(
    rw_dim: u32,
    p_accept: f64,
    settings: &SaSettings,
    min_rw_dim: u32,
    max_dim: u32,
) -> u32 {
    let mut updated = if p_accept > settings.p_upper {
        (rw_dim + settings.rw_dim_delta).min(max_dim)
    } else if p_accept < settings.p_lower {
        rw_dim.saturating_sub(settings.rw_dim_delta).max(min_rw_dim)
    } else {
        rw_dim
    };
    if updated != rw_dim && updated % 2 == 0 && updated > min_rw_dim {
        updated -= 1;
    }
    updated
}
