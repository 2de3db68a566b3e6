//! The [`Driver`]: owns the field, history, and every satellite subsystem,
//! and exposes the engine's single embedding API.

use std::time::Instant;

use tracing::{debug, warn};

use driftfield_core::{CoreError, Field, Mode, Mulberry32, Parameters, ParametersPatch};
use driftfield_events::{EventDetector, EventExportFormat, EventLog, PendingEvent, StructuralEventKind};
use driftfield_history::{FrameSnapshot, History};
use driftfield_metrics::{compute_signature, Signature, TrendMetrics, TrendSample, TrendTracker};
use driftfield_ops::basin::basin_labels;
use driftfield_ops::{step, BasinMap, DerivedField, DerivedFieldEngine, DerivedFieldType};
use driftfield_perturb::{
    apply_impulse, apply_vortex, PendingResidual, PerturbationParams, ResidualQueue,
};
use driftfield_space::gradient_magnitude;

use crate::determinism::{run_determinism_check, DeterminismReport};
use crate::diagnostics::StepDiagnostics;
use crate::export::{classify_regime, BatchSpec, ConfigExport};
use crate::init::init_field;
use crate::probe::{probe, ProbeData};

/// Crate version stamped onto [`ConfigExport`]s.
const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Default colour map name, a rendering hint the core otherwise ignores.
const DEFAULT_COLORMAP: &str = "viridis";

/// Owns the field, history, and satellite subsystems; the single entry
/// point a host embeds.
///
/// `Driver` is `Send` but not `Sync`: every mutating method takes `&mut
/// self`, and a process may host multiple independent instances.
pub struct Driver {
    params: Parameters,
    seed: u32,
    step: u64,
    running: bool,
    field: Field,
    rng: Mulberry32,
    residuals: ResidualQueue,
    derived_engine: DerivedFieldEngine,
    basin_map: BasinMap,
    signature: Signature,
    trend_tracker: TrendTracker,
    trend_metrics: TrendMetrics,
    event_detector: EventDetector,
    event_log: EventLog,
    history: History,
    last_diagnostics: Option<StepDiagnostics>,
    colormap: String,
    observers: Vec<Box<dyn Fn(&driftfield_ops::StepOutcome) + Send>>,
    /// Set once a `variance_instability` event has been emitted for the
    /// current run of unstable steps, cleared as soon as a step is stable
    /// again; guards against re-emitting the event every tick (`SPEC_FULL.md` §7).
    instability_emitted: bool,
}

const _: () = {
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Driver>();
    }
};

impl Driver {
    /// Build a fresh driver from `params` and `seed`. Clamps `params` and
    /// allocates the initial field from seeded noise (`SPEC_FULL.md` §4.8).
    pub fn new(mut params: Parameters, seed: u32) -> Self {
        params.clamp();
        let field = init_field(&params, seed);
        let basin_map = basin_labels(&field);
        let signature = compute_signature(&field, &basin_map);
        Driver {
            params,
            seed,
            step: 0,
            running: false,
            field,
            rng: Mulberry32::new(seed),
            residuals: ResidualQueue::new(),
            derived_engine: DerivedFieldEngine::new(),
            basin_map,
            signature,
            trend_tracker: TrendTracker::new(),
            trend_metrics: TrendMetrics::default(),
            event_detector: EventDetector::new(),
            event_log: EventLog::new(),
            history: History::new(),
            last_diagnostics: None,
            colormap: DEFAULT_COLORMAP.to_string(),
            observers: Vec::new(),
            instability_emitted: false,
        }
    }

    /// Allow the host's tick loop to drive [`Driver::step_once`].
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop the host's tick loop from driving further steps. In-flight
    /// calls to [`Driver::step_once`] still run to completion; `stop` only
    /// affects whether a host *should* call it again.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether [`Driver::start`] has been called without a matching
    /// [`Driver::stop`].
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Re-initialise the field from `seed`, clearing history, trend/event
    /// state, and pending residuals. Parameters are left as they stood
    /// (only an explicit reset clears simulation state; `SPEC_FULL.md` §4.6).
    pub fn reset(&mut self, seed: u32) {
        self.seed = seed;
        self.step = 0;
        self.field = init_field(&self.params, seed);
        self.rng = Mulberry32::new(seed);
        self.residuals.clear();
        self.derived_engine = DerivedFieldEngine::new();
        self.basin_map = basin_labels(&self.field);
        self.signature = compute_signature(&self.field, &self.basin_map);
        self.trend_tracker = TrendTracker::new();
        self.trend_metrics = TrendMetrics::default();
        self.event_detector = EventDetector::new();
        self.event_log = EventLog::new();
        self.history.reset();
        self.last_diagnostics = None;
        self.instability_emitted = false;
    }

    /// Advance the simulation by one step.
    ///
    /// A no-op while in playback (`SPEC_FULL.md` §4.6): the engine does not
    /// step forward under a pinned cursor, and the previous diagnostics are
    /// returned unchanged. Call [`Driver::exit_playback`] first.
    pub fn step_once(&mut self) -> &StepDiagnostics {
        if self.is_in_playback() {
            return self.last_diagnostics.as_ref().expect(
                "history is non-empty whenever playback is active, so a prior step exists",
            );
        }

        let started = Instant::now();

        self.residuals.drain_into(&mut self.field);
        let (next_field, outcome) = step(&self.field, &self.params);
        self.field = next_field;
        self.step += 1;

        self.derived_engine.advance(&self.field);
        self.basin_map = basin_labels(&self.field);
        self.signature = compute_signature(&self.field, &self.basin_map);

        let peak_gradient = peak_gradient_magnitude(&self.field);
        let energy = mean_square(&self.field);
        self.trend_metrics = self.trend_tracker.push(TrendSample {
            energy,
            variance: self.signature.tension_variance,
            curvature: self.signature.global_curvature,
            basin_count: self.signature.basin_count,
            stability_metric: self.signature.stability_metric,
            peak_gradient,
        });

        let pending_events = self.event_detector.observe(self.signature);
        let mut event_marker = None;
        for pending in pending_events {
            if event_marker.is_none() {
                event_marker = Some(pending.kind);
            }
            self.event_log.push(self.step, pending);
        }

        if outcome.unstable {
            warn!(step = self.step, "step produced non-finite cells; reset to zero");
            if !self.instability_emitted {
                self.instability_emitted = true;
                let pending = PendingEvent::new(
                    StructuralEventKind::VarianceInstability,
                    "non-finite cells reset to zero",
                );
                if event_marker.is_none() {
                    event_marker = Some(pending.kind);
                }
                self.event_log.push(self.step, pending);
            }
        } else {
            self.instability_emitted = false;
        }

        self.history.push(FrameSnapshot {
            step: self.step,
            grid: self.field.clone(),
            params: self.params,
            signature: self.signature,
            event_marker,
            unstable: outcome.unstable,
        });

        let diagnostics = StepDiagnostics {
            step_us: started.elapsed().as_micros() as u64,
            unstable: outcome.unstable,
            clamped_params: Vec::new(),
            operator_contribution_means: outcome.operator_contribution_means,
        };
        debug!(step = self.step, step_us = diagnostics.step_us, unstable = diagnostics.unstable, "step complete");

        for observer in &self.observers {
            observer(&outcome);
        }

        self.last_diagnostics = Some(diagnostics);
        self.last_diagnostics.as_ref().unwrap()
    }

    /// Apply a sparse set of parameter overrides, clamping every touched
    /// field and logging the names of any that were out of range.
    pub fn set_params(&mut self, patch: ParametersPatch) {
        let clamped = clamped_field_names(&patch);
        self.params.apply_patch(&patch);
        if !clamped.is_empty() {
            debug!(?clamped, "parameter override clamped into range");
            if let Some(diag) = &mut self.last_diagnostics {
                diag.clamped_params = clamped;
            }
        }
    }

    /// Resize the grid, rejecting and leaving the prior grid in place if
    /// `grid_size` is outside `[MIN_GRID_SIZE, MAX_GRID_SIZE]`.
    pub fn set_grid_size(&mut self, grid_size: u32) -> Result<(), CoreError> {
        if grid_size == self.params.grid_size {
            return Ok(());
        }
        Field::zeros(grid_size)?;
        self.params.grid_size = grid_size;
        self.reset(self.seed);
        Ok(())
    }

    /// Apply a perturbation centred on `(x, y)`. One-shot kernels
    /// (impulse, vortex) write directly into the live field; the rest
    /// enqueue a residual the stepper re-applies with decay
    /// (`SPEC_FULL.md` §4.7).
    pub fn perturb(&mut self, x: i32, y: i32, params: PerturbationParams) {
        match params {
            PerturbationParams::Impulse(p) => apply_impulse(&mut self.field, x, y, &p),
            PerturbationParams::Vortex(p) => apply_vortex(&mut self.field, x, y, &p),
            PerturbationParams::Shear(p) => self.residuals.push(PendingResidual::shear(x, y, p)),
            PerturbationParams::Wave(p) => self.residuals.push(PendingResidual::wave(x, y, p)),
            PerturbationParams::Fracture(p) => {
                let residual = PendingResidual::fracture(x, y, p, &mut self.rng);
                self.residuals.push(residual);
            }
            PerturbationParams::Drift(p) => self.residuals.push(PendingResidual::drift(p)),
        }
    }

    /// The field as currently observed: the pinned playback snapshot's grid
    /// while in playback, otherwise the live field.
    pub fn field(&self) -> &Field {
        match self.history.current() {
            Some(frame) if self.history.is_in_playback() => &frame.grid,
            _ => &self.field,
        }
    }

    /// The parameter set in force for the currently observed frame.
    pub fn params(&self) -> &Parameters {
        match self.history.current() {
            Some(frame) if self.history.is_in_playback() => &frame.params,
            _ => &self.params,
        }
    }

    /// The update flavour in force for the currently observed frame.
    pub fn mode(&self) -> Mode {
        self.params().mode
    }

    /// The seed the live field was initialised from (unaffected by
    /// playback).
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The current step count (unaffected by playback).
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// The signature of the currently observed frame.
    pub fn signature(&self) -> Signature {
        match self.history.current() {
            Some(frame) if self.history.is_in_playback() => frame.signature,
            _ => self.signature,
        }
    }

    /// The basin map of the currently observed frame, recomputed fresh
    /// while in playback (`SPEC_FULL.md` §4.6).
    pub fn basin_map(&self) -> BasinMap {
        match self.history.current() {
            Some(frame) if self.history.is_in_playback() => basin_labels(&frame.grid),
            _ => self.basin_map.clone(),
        }
    }

    /// A derived field of `kind` for the currently observed frame. While in
    /// playback this is recomputed from the pinned snapshot rather than
    /// read from the live cache.
    pub fn derived_field(&mut self, kind: DerivedFieldType) -> DerivedField {
        if self.history.is_in_playback() {
            let grid = self.history.current().unwrap().grid.clone();
            let mut scratch = DerivedFieldEngine::new();
            scratch.advance(&grid);
            scratch.get(&grid, kind).clone()
        } else {
            self.derived_engine.get(&self.field, kind).clone()
        }
    }

    /// Probe a single cell of the currently observed frame.
    pub fn probe(&self, x: i32, y: i32) -> ProbeData {
        let field = self.field();
        let basins = self.basin_map();
        probe(field, &basins, self.params().coupling_radius, x, y)
    }

    /// The detected-event log.
    pub fn events(&self) -> &EventLog {
        &self.event_log
    }

    /// Rolling-window trend aggregates as of the most recently computed
    /// step (not affected by playback: trends describe the live run).
    pub fn trend_metrics(&self) -> &TrendMetrics {
        &self.trend_metrics
    }

    /// Whether the playback cursor is pinned to a recorded frame.
    pub fn is_in_playback(&self) -> bool {
        self.history.is_in_playback()
    }

    /// Move the playback cursor one frame toward the start of history.
    pub fn step_backward(&mut self) {
        self.history.step_backward();
    }

    /// Move the playback cursor one frame toward the live head.
    pub fn step_forward(&mut self) {
        self.history.step_forward();
    }

    /// Pin the playback cursor to history index `i`, clamped into range.
    pub fn seek_to_frame(&mut self, i: usize) {
        self.history.seek_to_frame(i);
    }

    /// Return the playback cursor to the live head.
    pub fn exit_playback(&mut self) {
        self.history.exit_playback();
    }

    /// Run two fresh simulations from this driver's `(params, seed)` for
    /// `steps` ticks and compare them (`SPEC_FULL.md` §4.8).
    pub fn run_determinism_check(&self, steps: u64) -> DeterminismReport {
        run_determinism_check(&self.params, self.seed, steps)
    }

    /// Export the current configuration, regime, and colour map as a JSON
    /// object (`SPEC_FULL.md` §6).
    pub fn export_config(&self, timestamp: u64) -> ConfigExport {
        ConfigExport {
            parameters: self.params,
            regime: classify_regime(&self.signature, &self.trend_metrics),
            colormap: self.colormap.clone(),
            mode: self.params.mode,
            version: VERSION.to_string(),
            timestamp,
        }
    }

    /// Export the event log in the requested format.
    pub fn export_events(&self, format: EventExportFormat) -> String {
        self.event_log.export(format)
    }

    /// Export a spec sufficient to reproduce this run bit-identically.
    pub fn export_batch_spec(&self, steps: u64, timestamp: u64) -> BatchSpec {
        BatchSpec {
            params: self.params,
            steps,
            seed: self.seed,
            grid_size: self.params.grid_size,
            timestamp,
        }
    }

    /// Register an observer invoked with this step's outcome at the end of
    /// every successful [`Driver::step_once`] call.
    pub fn add_observer(&mut self, observer: Box<dyn Fn(&driftfield_ops::StepOutcome) + Send>) {
        self.observers.push(observer);
    }

    /// Diagnostics from the most recently completed step, if any.
    pub fn last_diagnostics(&self) -> Option<&StepDiagnostics> {
        self.last_diagnostics.as_ref()
    }

    /// Set the active colour map name (a rendering hint; opaque to the core).
    pub fn set_colormap(&mut self, name: impl Into<String>) {
        self.colormap = name.into();
    }

    /// The active colour map name.
    pub fn colormap(&self) -> &str {
        &self.colormap
    }
}

fn mean_square(field: &Field) -> f32 {
    field.as_slice().iter().map(|v| v * v).sum::<f32>() / field.len() as f32
}

fn peak_gradient_magnitude(field: &Field) -> f32 {
    let size = field.size() as i32;
    let mut peak = 0.0f32;
    for y in 0..size {
        for x in 0..size {
            peak = peak.max(gradient_magnitude(field, x, y));
        }
    }
    peak
}

/// Names of every `patch` field that would land outside its valid range,
/// for diagnostics (`SPEC_FULL.md` §7).
fn clamped_field_names(patch: &ParametersPatch) -> Vec<String> {
    use driftfield_core::ranges;
    let mut out = Vec::new();
    let mut check = |name: &str, value: Option<f32>, range: driftfield_core::Range| {
        if let Some(v) = value {
            if range.clamp(v) != v {
                out.push(name.to_string());
            }
        }
    };
    check("dt", patch.dt, ranges::DT);
    check("curvatureGain", patch.curvature_gain, ranges::CURVATURE_GAIN);
    check("couplingRadius", patch.coupling_radius, ranges::COUPLING_RADIUS);
    check("couplingWeight", patch.coupling_weight, ranges::COUPLING_WEIGHT);
    check(
        "attractorStrength",
        patch.attractor_strength,
        ranges::ATTRACTOR_STRENGTH,
    );
    check(
        "redistributionRate",
        patch.redistribution_rate,
        ranges::REDISTRIBUTION_RATE,
    );
    check("wK", patch.w_k, ranges::OPERATOR_WEIGHT);
    check("wT", patch.w_t, ranges::OPERATOR_WEIGHT);
    check("wC", patch.w_c, ranges::OPERATOR_WEIGHT);
    check("wA", patch.w_a, ranges::OPERATOR_WEIGHT);
    check("wR", patch.w_r, ranges::OPERATOR_WEIGHT);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfield_perturb::ImpulseParams;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn small_params() -> Parameters {
        Parameters {
            grid_size: 64,
            ..Parameters::default()
        }
    }

    #[test]
    fn new_driver_starts_at_step_zero_not_running() {
        let driver = Driver::new(small_params(), 42);
        assert_eq!(driver.current_step(), 0);
        assert!(!driver.is_running());
        assert!(!driver.is_in_playback());
    }

    #[test]
    fn step_once_advances_step_and_records_history() {
        let mut driver = Driver::new(small_params(), 42);
        driver.step_once();
        driver.step_once();
        assert_eq!(driver.current_step(), 2);
    }

    #[test]
    fn s1_scenario_same_seed_same_hash_after_100_steps() {
        let mut a = Driver::new(small_params(), 42);
        let mut b = Driver::new(small_params(), 42);
        for _ in 0..100 {
            a.step_once();
            b.step_once();
        }
        assert_eq!(a.field().as_slice(), b.field().as_slice());
    }

    #[test]
    fn s5_determinism_check_after_s1_setup() {
        let driver = Driver::new(small_params(), 42);
        let report = driver.run_determinism_check(100);
        assert!(report.is_deterministic);
        assert_eq!(report.pixel_difference, 0);
        assert_eq!(report.mean_absolute_deviation, 0.0);
    }

    #[test]
    fn s2_constant_field_with_zero_redistribution_stays_spatially_uniform() {
        // Every operator vanishes at a constant cell, so with redistribution
        // also off every cell gets the same update: the field stays uniform,
        // though the shared value itself drifts toward tanh's fixpoint at 0.
        let params = Parameters {
            grid_size: 64,
            redistribution_rate: 0.0,
            w_r: 0.0,
            ..Parameters::default()
        };
        let mut driver = Driver::new(params, 1);
        // Overwrite the seeded-noise initial field with a constant one.
        for v in driver.field.as_mut_slice() {
            *v = 0.5;
        }
        for _ in 0..10 {
            driver.step_once();
        }
        let first = driver.field().as_slice()[0];
        for &v in driver.field().as_slice() {
            assert!((v - first).abs() < 1e-6, "v={v}, first={first}");
        }
    }

    #[test]
    fn s4_impulse_bounds_centre_and_leaves_far_cells_alone() {
        let params = Parameters {
            grid_size: 128,
            ..small_params()
        };
        let mut driver = Driver::new(params, 7);
        for v in driver.field.as_mut_slice() {
            *v = 0.0;
        }
        driver.perturb(
            32,
            32,
            PerturbationParams::Impulse(ImpulseParams {
                intensity: 0.9,
                radius: 8.0,
                decay: 1.0,
            }),
        );
        let centre = driver.field().get(32, 32);
        assert!((0.85..=0.95).contains(&centre), "centre={centre}");
        assert_eq!(driver.field().get(32 + 40, 32), 0.0);
    }

    #[test]
    fn playback_cursor_pins_field_and_step_once_is_a_no_op() {
        let mut driver = Driver::new(small_params(), 3);
        for _ in 0..5 {
            driver.step_once();
        }
        let live_step = driver.current_step();
        driver.seek_to_frame(0);
        assert!(driver.is_in_playback());
        let pinned_field = driver.field().as_slice().to_vec();
        driver.step_once();
        assert_eq!(driver.current_step(), live_step);
        assert_eq!(driver.field().as_slice(), pinned_field.as_slice());
        driver.exit_playback();
        assert!(!driver.is_in_playback());
    }

    #[test]
    fn reset_clears_history_and_events_but_keeps_params() {
        let mut driver = Driver::new(small_params(), 9);
        for _ in 0..5 {
            driver.step_once();
        }
        driver.reset(99);
        assert_eq!(driver.current_step(), 0);
        assert_eq!(driver.seed(), 99);
        assert!(driver.events().is_empty());
    }

    #[test]
    fn set_grid_size_rejects_out_of_range_and_keeps_prior_grid() {
        let mut driver = Driver::new(small_params(), 1);
        let before = driver.params().grid_size;
        assert!(driver.set_grid_size(10_000).is_err());
        assert_eq!(driver.params().grid_size, before);
    }

    #[test]
    fn set_params_clamps_and_reports_clamped_names() {
        let mut driver = Driver::new(small_params(), 1);
        driver.step_once();
        driver.set_params(ParametersPatch {
            dt: Some(50.0),
            ..Default::default()
        });
        assert_eq!(driver.params().dt, driftfield_core::ranges::DT.max);
        let diag = driver.last_diagnostics().unwrap();
        assert!(diag.clamped_params.contains(&"dt".to_string()));
    }

    #[test]
    fn observers_are_invoked_once_per_step() {
        let mut driver = Driver::new(small_params(), 1);
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        driver.add_observer(Box::new(move |_outcome| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        driver.step_once();
        driver.step_once();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unstable_step_resets_cell_marks_snapshot_and_emits_one_event() {
        let mut driver = Driver::new(small_params(), 3);
        driver.field.as_mut_slice()[0] = f32::NAN;
        driver.step_once();
        assert!(driver.last_diagnostics().unwrap().unstable);
        assert_eq!(driver.field.as_slice()[0], 0.0);
        let snapshot = driver.history.current().unwrap();
        assert!(snapshot.unstable);
        assert_eq!(
            snapshot.event_marker,
            Some(driftfield_events::StructuralEventKind::VarianceInstability)
        );
        let instability_events = driver
            .events()
            .iter()
            .filter(|e| e.kind == driftfield_events::StructuralEventKind::VarianceInstability)
            .count();
        assert_eq!(instability_events, 1);

        // A further unstable step in the same run must not emit a second event.
        driver.field.as_mut_slice()[0] = f32::NAN;
        driver.step_once();
        let instability_events = driver
            .events()
            .iter()
            .filter(|e| e.kind == driftfield_events::StructuralEventKind::VarianceInstability)
            .count();
        assert_eq!(instability_events, 1);

        // Once a stable step runs, the dedup flag clears and a later
        // instability can be reported again.
        driver.step_once();
        assert!(!driver.last_diagnostics().unwrap().unstable);
        driver.field.as_mut_slice()[0] = f32::NAN;
        driver.step_once();
        let instability_events = driver
            .events()
            .iter()
            .filter(|e| e.kind == driftfield_events::StructuralEventKind::VarianceInstability)
            .count();
        assert_eq!(instability_events, 2);
    }

    #[test]
    fn export_surfaces_round_trip_through_json() {
        let mut driver = Driver::new(small_params(), 1);
        driver.step_once();
        let config = driver.export_config(123);
        let _ = serde_json::to_string(&config).unwrap();
        let batch = driver.export_batch_spec(50, 456);
        let _ = serde_json::to_string(&batch).unwrap();
        let events_text = driver.export_events(EventExportFormat::Text);
        assert!(events_text.is_empty() || events_text.contains("t="));
    }
}
