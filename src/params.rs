//! User-adjustable simulation parameters and the binding table the HUD
//! (the "panel") renders them from. All mutation goes through clamping
//! setters; the frame loop only ever reads.

use clap::ValueEnum;

pub const KAPPA_MIN: f32 = 0.8;
pub const KAPPA_MAX: f32 = 2.0;
pub const KAPPA_STEP: f32 = 0.05;

pub const DELTA_MIN: f32 = 0.0;
pub const DELTA_MAX: f32 = 0.05;
pub const DELTA_STEP: f32 = 0.005;

/// Which scalar field of the engine is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldKind {
    #[value(alias = "t", alias = "temp")]
    Temperature,
    #[value(alias = "p", alias = "phase")]
    Phi,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::Temperature, FieldKind::Phi];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Phi => "phi",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Temperature => Self::Phi,
            Self::Phi => Self::Temperature,
        }
    }
}

/// The panel contract for one numeric parameter: name plus the range and
/// step the widget layer may move it by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBinding {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

pub const BINDINGS: [ParamBinding; 2] = [
    ParamBinding {
        name: "kappa",
        min: KAPPA_MIN,
        max: KAPPA_MAX,
        step: KAPPA_STEP,
    },
    ParamBinding {
        name: "delta",
        min: DELTA_MIN,
        max: DELTA_MAX,
        step: DELTA_STEP,
    },
];

/// Mutable mirror of the tunable parameters and the active field. Written
/// by input bindings, read each frame by the loop controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterStore {
    kappa: f32,
    delta: f32,
    field: FieldKind,
}

impl ParameterStore {
    pub fn new(kappa: f32, delta: f32, field: FieldKind) -> Self {
        Self {
            kappa: kappa.clamp(KAPPA_MIN, KAPPA_MAX),
            delta: delta.clamp(DELTA_MIN, DELTA_MAX),
            field,
        }
    }

    pub fn kappa(&self) -> f32 {
        self.kappa
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn field(&self) -> FieldKind {
        self.field
    }

    pub fn set_kappa(&mut self, kappa: f32) {
        self.kappa = kappa.clamp(KAPPA_MIN, KAPPA_MAX);
    }

    pub fn set_delta(&mut self, delta: f32) {
        self.delta = delta.clamp(DELTA_MIN, DELTA_MAX);
    }

    pub fn set_field(&mut self, field: FieldKind) {
        self.field = field;
    }

    /// Move kappa by a whole number of binding steps.
    pub fn nudge_kappa(&mut self, steps: i32) {
        self.set_kappa(self.kappa + steps as f32 * KAPPA_STEP);
    }

    pub fn nudge_delta(&mut self, steps: i32) {
        self.set_delta(self.delta + steps as f32 * DELTA_STEP);
    }

    pub fn cycle_field(&mut self) {
        self.field = self.field.next();
    }
}
