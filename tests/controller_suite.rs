use nivis_tui::compositor::{CompositeError, Compositor, FitMode, SurfaceGeometry};
use nivis_tui::controller::{select_field, FrameOutcome, LoopController, Phase};
use nivis_tui::params::{FieldKind, ParameterStore};
use nivis_tui::sim::{EngineError, SimulationHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    SetKappa,
    SetDelta,
    Step,
    Reset,
    FetchPhi,
    FetchTemperature,
}

/// Scripted engine that records the order of calls the controller makes.
struct StubEngine {
    calls: Vec<Call>,
    kappa: f32,
    delta: f32,
    tick: u64,
    fail_on_step: Option<u64>,
    buffer_len: usize,
    buffer: Vec<u8>,
}

impl StubEngine {
    fn new() -> Self {
        let len = 4 * 4 * 4;
        Self {
            calls: Vec::new(),
            kappa: 0.0,
            delta: 0.0,
            tick: 0,
            fail_on_step: None,
            buffer_len: len,
            buffer: vec![127; len],
        }
    }

    fn with_short_buffer() -> Self {
        let mut s = Self::new();
        s.buffer_len = 7;
        s.buffer = vec![0; 7];
        s
    }
}

impl SimulationHandle for StubEngine {
    fn width(&self) -> usize {
        4
    }

    fn height(&self) -> usize {
        4
    }

    fn set_kappa(&mut self, kappa: f32) {
        self.calls.push(Call::SetKappa);
        self.kappa = kappa;
    }

    fn set_delta(&mut self, delta: f32) {
        self.calls.push(Call::SetDelta);
        self.delta = delta;
    }

    fn step(&mut self) -> Result<(), EngineError> {
        self.calls.push(Call::Step);
        if self.fail_on_step == Some(self.tick) {
            return Err(EngineError::NumericalBlowUp { tick: self.tick });
        }
        self.tick += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.calls.push(Call::Reset);
        self.tick = 0;
    }

    fn add_seed(&mut self, _x: f32, _y: f32) {}

    fn phi_rgba(&mut self) -> &[u8] {
        self.calls.push(Call::FetchPhi);
        &self.buffer[..self.buffer_len]
    }

    fn temperature_rgba(&mut self) -> &[u8] {
        self.calls.push(Call::FetchTemperature);
        &self.buffer[..self.buffer_len]
    }
}

fn compositor() -> Compositor {
    Compositor::new(
        SurfaceGeometry {
            display_width: 8,
            display_height: 8,
            sim_width: 4,
            sim_height: 4,
        },
        FitMode::Stretch,
    )
}

#[test]
fn frame_cycle_syncs_params_then_steps_then_fetches() {
    let mut engine = StubEngine::new();
    let store = ParameterStore::new(1.3, 0.01, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(3);
    ctl.start();

    let outcome = ctl.run_frame(&store, &mut engine, &mut comp);
    assert_eq!(outcome, FrameOutcome::Drawn);
    assert_eq!(
        engine.calls,
        vec![
            Call::SetKappa,
            Call::SetDelta,
            Call::Step,
            Call::Step,
            Call::Step,
            Call::FetchPhi,
        ]
    );
    assert_eq!(engine.kappa, 1.3);
    assert_eq!(engine.delta, 0.01);
}

#[test]
fn out_of_range_store_values_reach_the_engine_clamped() {
    let mut engine = StubEngine::new();
    let store = ParameterStore::new(99.0, 99.0, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(1);
    ctl.start();
    ctl.run_frame(&store, &mut engine, &mut comp);

    assert!(engine.kappa <= 2.0 && engine.kappa >= 0.8);
    assert!(engine.delta <= 0.05 && engine.delta >= 0.0);
}

#[test]
fn no_frame_runs_unless_one_is_pending() {
    let mut engine = StubEngine::new();
    let store = ParameterStore::new(1.6, 0.02, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(1);

    assert_eq!(
        ctl.run_frame(&store, &mut engine, &mut comp),
        FrameOutcome::NotRunning
    );
    assert!(engine.calls.is_empty());

    ctl.start();
    ctl.stop();
    assert_eq!(
        ctl.run_frame(&store, &mut engine, &mut comp),
        FrameOutcome::NotRunning
    );
    assert!(engine.calls.is_empty());
}

#[test]
fn the_field_active_at_fetch_time_is_drawn() {
    let mut engine = StubEngine::new();
    let mut store = ParameterStore::new(1.6, 0.02, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(1);
    ctl.start();

    ctl.run_frame(&store, &mut engine, &mut comp);
    assert!(engine.calls.contains(&Call::FetchPhi));

    store.cycle_field();
    ctl.run_frame(&store, &mut engine, &mut comp);
    assert!(engine.calls.contains(&Call::FetchTemperature));
}

#[test]
fn bad_buffer_skips_the_draw_but_keeps_playing() {
    let mut engine = StubEngine::with_short_buffer();
    let store = ParameterStore::new(1.6, 0.02, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(1);
    ctl.start();

    let outcome = ctl.run_frame(&store, &mut engine, &mut comp);
    assert_eq!(
        outcome,
        FrameOutcome::Skipped(CompositeError::InvalidBufferLength {
            expected: 64,
            got: 7
        })
    );
    assert_eq!(ctl.phase(), Phase::Running);
    assert!(ctl.pending().is_some());
}

#[test]
fn engine_fault_pauses_the_loop() {
    let mut engine = StubEngine::new();
    engine.fail_on_step = Some(0);
    let store = ParameterStore::new(1.6, 0.02, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(4);
    ctl.start();

    let outcome = ctl.run_frame(&store, &mut engine, &mut comp);
    assert_eq!(
        outcome,
        FrameOutcome::EngineFault(EngineError::NumericalBlowUp { tick: 0 })
    );
    assert_eq!(ctl.phase(), Phase::Paused);
    assert_eq!(ctl.pending(), None);
    // Nothing after the failing step.
    assert_eq!(engine.calls.last(), Some(&Call::Step));
}

#[test]
fn pausing_preserves_engine_state() {
    let mut engine = StubEngine::new();
    let store = ParameterStore::new(1.6, 0.02, FieldKind::Phi);
    let mut comp = compositor();
    let mut ctl = LoopController::new(5);
    ctl.start();
    ctl.run_frame(&store, &mut engine, &mut comp);
    assert_eq!(engine.tick, 5);

    ctl.stop();
    ctl.start();
    ctl.run_frame(&store, &mut engine, &mut comp);
    // No reset happened across the pause; ticks accumulate.
    assert_eq!(engine.tick, 10);
    assert!(!engine.calls.contains(&Call::Reset));
}

#[test]
fn reset_reaches_the_engine_without_changing_phase() {
    let mut engine = StubEngine::new();
    let mut ctl = LoopController::new(1);

    ctl.reset(&mut engine);
    assert_eq!(ctl.phase(), Phase::Idle);

    ctl.start();
    ctl.reset(&mut engine);
    assert_eq!(ctl.phase(), Phase::Running);
    assert!(ctl.pending().is_some());

    ctl.stop();
    ctl.reset(&mut engine);
    assert_eq!(ctl.phase(), Phase::Paused);

    assert_eq!(
        engine.calls.iter().filter(|c| **c == Call::Reset).count(),
        3
    );
}

#[test]
fn select_field_covers_every_variant() {
    let mut engine = StubEngine::new();
    for field in FieldKind::ALL {
        let buf = select_field(field, &mut engine);
        assert_eq!(buf.len(), 64);
    }
    assert!(engine.calls.contains(&Call::FetchPhi));
    assert!(engine.calls.contains(&Call::FetchTemperature));
}
