use crate::compositor::FitMode;
use crate::params::FieldKind;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nivis-tui",
    version,
    about = "Interactive terminal viewer for a dendritic solidification simulation"
)]
pub struct Config {
    /// Requested simulation grid width (the engine may clamp tiny values).
    #[arg(long, default_value_t = 200)]
    pub sim_width: usize,

    /// Requested simulation grid height.
    #[arg(long, default_value_t = 200)]
    pub sim_height: usize,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Latent-heat coefficient, clamped to [0.8, 2.0].
    #[arg(long, default_value_t = 1.6)]
    pub kappa: f32,

    /// Interface anisotropy strength, clamped to [0.0, 0.05].
    #[arg(long, default_value_t = 0.02)]
    pub delta: f32,

    #[arg(long, value_enum, default_value_t = FieldKind::Phi)]
    pub field: FieldKind,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, value_enum, default_value_t = FitMode::Aspect)]
    pub fit: FitMode,

    /// Engine ticks advanced per frame while playing.
    #[arg(long, default_value_t = 8)]
    pub steps_per_frame: u32,

    /// Seeds injected by the random-seed key.
    #[arg(long, default_value_t = 5)]
    pub seed_batch: usize,

    /// Place one seed at the grid center on startup.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub center_seed: bool,

    /// Start playing immediately instead of paused.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub autostart: bool,

    /// Use terminal synchronized-update escapes while painting.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "half-block", alias = "halfblock", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}
