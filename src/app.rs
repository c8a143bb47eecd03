use crate::compositor::{Compositor, SurfaceGeometry};
use crate::config::{Config, RendererMode};
use crate::controller::{FrameOutcome, LoopController};
use crate::input::SeedInputHandler;
use crate::params::{ParameterStore, BINDINGS};
use crate::render::{BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::sim::{Simulation, SimulationHandle};
use crate::snapshot;
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::io::BufWriter;
use std::time::{Duration, Instant};

const HUD_ROWS: u16 = 2;
const MIN_COLS: u16 = 24;
const MIN_VIEWPORT_ROWS: u16 = 8;

/// Every UI event maps to exactly one named operation; the controller and
/// store methods are the public contract, not the key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePlayPause,
    Reset,
    NudgeKappa(i32),
    NudgeDelta(i32),
    CycleField,
    RandomSeeds,
    Snapshot,
    ToggleHelp,
}

pub fn command_for_key(code: KeyCode, mods: KeyModifiers) -> Option<Command> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Some(Command::Quit);
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePlayPause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Reset),
        KeyCode::Up => Some(Command::NudgeKappa(1)),
        KeyCode::Down => Some(Command::NudgeKappa(-1)),
        KeyCode::Right => Some(Command::NudgeDelta(1)),
        KeyCode::Left => Some(Command::NudgeDelta(-1)),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::CycleField),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::RandomSeeds),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(Command::Snapshot),
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') | KeyCode::F(1) => {
            Some(Command::ToggleHelp)
        }
        _ => None,
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    };
    let (px_w, px_h) = renderer.cell_pixels();

    let (term_cols, term_rows) = crossterm::terminal::size().context("get terminal size")?;
    let viewport_rows = term_rows.saturating_sub(HUD_ROWS);
    if term_cols < MIN_COLS || viewport_rows < MIN_VIEWPORT_ROWS {
        anyhow::bail!(
            "terminal too small (need at least {}x{}, got {}x{})",
            MIN_COLS,
            MIN_VIEWPORT_ROWS + HUD_ROWS,
            term_cols,
            term_rows
        );
    }

    let mut engine = Simulation::new(cfg.sim_width, cfg.sim_height);
    // Geometry is fixed here for the lifetime of the run; later resize
    // events do not re-derive it. Simulation dims are the engine's
    // authoritative readback.
    let geometry = SurfaceGeometry {
        display_width: term_cols as usize * px_w,
        display_height: viewport_rows as usize * px_h,
        sim_width: engine.width(),
        sim_height: engine.height(),
    };

    let mut store = ParameterStore::new(cfg.kappa, cfg.delta, cfg.field);
    let mut compositor = Compositor::new(geometry, cfg.fit);
    let mut controller = LoopController::new(cfg.steps_per_frame);
    let seeds = SeedInputHandler::new((px_w, px_h));

    if cfg.center_seed {
        engine.add_seed(
            engine.width() as f32 / 2.0,
            engine.height() as f32 / 2.0,
        );
    }
    if cfg.autostart {
        controller.start();
    }

    let mut status = String::new();
    let mut show_help = false;
    let mut fps = FpsCounter::new();

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let Some(cmd) = command_for_key(k.code, k.modifiers) else {
                        continue;
                    };
                    match cmd {
                        Command::Quit => return Ok(()),
                        Command::TogglePlayPause => {
                            controller.toggle();
                            status.clear();
                        }
                        Command::Reset => {
                            controller.reset(&mut engine);
                            status = "reset".to_string();
                        }
                        Command::NudgeKappa(n) => store.nudge_kappa(n),
                        Command::NudgeDelta(n) => store.nudge_delta(n),
                        Command::CycleField => store.cycle_field(),
                        Command::RandomSeeds => {
                            seeds.random_seeds(cfg.seed_batch, &mut engine);
                            status = format!("{} random seeds", cfg.seed_batch);
                        }
                        Command::Snapshot => {
                            let path = snapshot::snapshot_path();
                            let g = compositor.geometry();
                            status = match snapshot::write_ppm(
                                &path,
                                g.display_width,
                                g.display_height,
                                compositor.surface(),
                            ) {
                                Ok(()) => format!("saved {}", path.display()),
                                Err(e) => format!("snapshot failed: {e:#}"),
                            };
                        }
                        Command::ToggleHelp => show_help = !show_help,
                    }
                }
                Event::Mouse(m) => {
                    // Seeds bypass the frame cadence: the engine call
                    // happens now, the next running frame shows it.
                    if matches!(
                        m.kind,
                        MouseEventKind::Down(MouseButton::Left)
                            | MouseEventKind::Drag(MouseButton::Left)
                    ) && m.row < viewport_rows
                    {
                        seeds.pointer_seed(m.column, m.row, compositor.scale(), &mut engine);
                    }
                }
                _ => {}
            }
        }

        match controller.run_frame(&store, &mut engine, &mut compositor) {
            FrameOutcome::Drawn | FrameOutcome::NotRunning => {}
            FrameOutcome::Skipped(e) => status = format!("frame skipped: {e}"),
            FrameOutcome::EngineFault(e) => {
                status = format!("{e}; paused (r to reset)");
            }
        }

        let hud = build_hud(&controller, &store, &engine, fps.fps(), &status);
        let frame = Frame {
            term_cols,
            term_rows,
            viewport_rows,
            pixel_width: geometry.display_width,
            pixel_height: geometry.display_height,
            pixels_rgba: compositor.surface(),
            hud: &hud,
            hud_rows: HUD_ROWS,
            overlay: show_help.then_some(HELP_TEXT),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Frame pacing; a slow step just eats the sleep budget.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = frame_start.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn build_hud(
    controller: &LoopController,
    store: &ParameterStore,
    engine: &Simulation,
    fps: f32,
    status: &str,
) -> String {
    let kappa = &BINDINGS[0];
    let delta = &BINDINGS[1];
    let line1 = format!(
        "nivis [{}] field:{} | kappa {:.2} ({:.2}..{:.2}) | delta {:.3} ({:.3}..{:.3}) | tick {} | {}x{} | fps {:>4.1}{}{}",
        controller.label(),
        store.field().as_str(),
        store.kappa(),
        kappa.min,
        kappa.max,
        store.delta(),
        delta.min,
        delta.max,
        engine.tick(),
        engine.width(),
        engine.height(),
        fps,
        if status.is_empty() { "" } else { " | " },
        status,
    );
    let line2 = "keys: space play/pause | r reset | up/down kappa | left/right delta | f field | s seeds | click seed | e snapshot | h help | q quit";
    format!("{line1}\n{line2}")
}

const HELP_TEXT: &str = "nivis-tui\n\
space  play / pause\n\
r      reset the simulation (keeps play state)\n\
up/down     latent heat kappa\n\
left/right  anisotropy delta\n\
f      switch displayed field (phi / temperature)\n\
s      inject random seeds\n\
click  inject a seed at the pointer\n\
e      save the current view as PPM\n\
h/?    toggle this help\n\
q/esc  quit";

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let dt = self.last.elapsed().as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = Instant::now();
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
