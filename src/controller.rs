//! The render-loop controller: a small state machine that owns frame
//! scheduling and the per-frame cycle (sync parameters, step the engine,
//! fetch the selected field, composite). The app's event loop is the
//! cooperative scheduler; it asks the controller each iteration whether a
//! frame is due and the controller re-arms itself only while Running.

use crate::compositor::{CompositeError, Compositor};
use crate::params::{FieldKind, ParameterStore, DELTA_MAX, DELTA_MIN, KAPPA_MAX, KAPPA_MIN};
use crate::sim::{EngineError, SimulationHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Opaque handle for a scheduled-but-not-yet-executed frame. Tokens are
/// minted monotonically; `stop()` discards the pending one, which is all
/// the cancellation a cooperative scheduler needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(u64);

/// What one frame cycle did, surfaced on the HUD status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Full cycle ran and the composite reached the surface.
    Drawn,
    /// The fetched buffer had the wrong length; the composite was skipped
    /// but the loop keeps running.
    Skipped(CompositeError),
    /// The engine failed mid-step; the loop transitioned to Paused.
    EngineFault(EngineError),
    /// No frame was due (Idle or Paused).
    NotRunning,
}

/// Resolve the active field to the engine accessor that renders it. The
/// enum is closed and the match exhaustive, so there is no unknown-field
/// error path.
pub fn select_field(field: FieldKind, engine: &mut dyn SimulationHandle) -> &[u8] {
    match field {
        FieldKind::Phi => engine.phi_rgba(),
        FieldKind::Temperature => engine.temperature_rgba(),
    }
}

pub struct LoopController {
    phase: Phase,
    pending: Option<FrameToken>,
    next_token: u64,
    steps_per_frame: u32,
}

impl LoopController {
    pub fn new(steps_per_frame: u32) -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            next_token: 0,
            steps_per_frame: steps_per_frame.max(1),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// The observable play-state label the UI mirrors.
    pub fn label(&self) -> &'static str {
        match self.phase {
            Phase::Running => "playing",
            Phase::Idle | Phase::Paused => "paused",
        }
    }

    /// Idle or Paused -> Running; schedules the next frame.
    pub fn start(&mut self) {
        if self.phase != Phase::Running {
            self.phase = Phase::Running;
            self.pending = Some(self.mint_token());
        }
    }

    /// Running -> Paused; cancels the scheduled frame.
    pub fn stop(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            self.pending = None;
        }
    }

    pub fn toggle(&mut self) {
        if self.phase == Phase::Running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Forward a reset to the engine. Valid in any phase and never changes
    /// it: a running loop keeps running against the fresh state, a paused
    /// loop stays paused.
    pub fn reset(&mut self, engine: &mut dyn SimulationHandle) {
        engine.reset();
    }

    /// Execute one frame cycle if one is due. The scheduled token is
    /// consumed up front and a new one is minted at the end iff the loop
    /// is still Running, preserving `pending != None <=> Running`.
    pub fn run_frame(
        &mut self,
        store: &ParameterStore,
        engine: &mut dyn SimulationHandle,
        compositor: &mut Compositor,
    ) -> FrameOutcome {
        let Some(_token) = self.pending.take() else {
            return FrameOutcome::NotRunning;
        };
        // A cancelled-but-dispatched frame must be a no-op.
        if self.phase != Phase::Running {
            return FrameOutcome::NotRunning;
        }

        // 1. Sync parameters, re-clamped as a safety net; the store's
        // setters already enforce the binding ranges.
        engine.set_kappa(store.kappa().clamp(KAPPA_MIN, KAPPA_MAX));
        engine.set_delta(store.delta().clamp(DELTA_MIN, DELTA_MAX));

        // 2. Step; each call advances exactly one tick. A fault pauses
        // the loop rather than scheduling more frames against a possibly
        // corrupt engine.
        for _ in 0..self.steps_per_frame {
            if let Err(e) = engine.step() {
                self.phase = Phase::Paused;
                return FrameOutcome::EngineFault(e);
            }
        }

        // 3-4. Fetch the active field at this instant and composite. The
        // buffer is borrowed only for the composite; a length mismatch
        // skips the draw but keeps the loop alive.
        let (sw, sh) = (engine.width(), engine.height());
        let buffer = select_field(store.field(), engine);
        let outcome = match compositor.composite(buffer, sw, sh) {
            Ok(()) => FrameOutcome::Drawn,
            Err(e) => FrameOutcome::Skipped(e),
        };

        // 5. Re-schedule iff still Running.
        if self.phase == Phase::Running {
            self.pending = Some(self.mint_token());
        }
        outcome
    }

    fn mint_token(&mut self) -> FrameToken {
        let t = FrameToken(self.next_token);
        self.next_token += 1;
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_no_pending_frame() {
        let c = LoopController::new(1);
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.pending(), None);
        assert_eq!(c.label(), "paused");
    }

    #[test]
    fn pending_is_some_iff_running() {
        let mut c = LoopController::new(1);
        c.start();
        assert_eq!(c.phase(), Phase::Running);
        assert!(c.pending().is_some());
        assert_eq!(c.label(), "playing");

        c.stop();
        assert_eq!(c.phase(), Phase::Paused);
        assert_eq!(c.pending(), None);

        c.toggle();
        assert_eq!(c.phase(), Phase::Running);
        assert!(c.pending().is_some());
    }

    #[test]
    fn tokens_are_distinct_across_restarts() {
        let mut c = LoopController::new(1);
        c.start();
        let a = c.pending().unwrap();
        c.stop();
        c.start();
        let b = c.pending().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn stop_is_a_no_op_when_not_running() {
        let mut c = LoopController::new(1);
        c.stop();
        assert_eq!(c.phase(), Phase::Idle);
    }
}
