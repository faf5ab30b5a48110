//! Ledge entry point
//!
//! Native builds run a level headless for a fixed number of ticks; the web
//! build drives the same simulation from `requestAnimationFrame`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use ledge::frames_from_millis;
    use ledge::platform::{CanvasSurface, HeldKeys, KeyMap};
    use ledge::settings::Settings;
    use ledge::sim::tick::is_pathological;
    use ledge::sim::{SessionPhase, Simulation, TickStatus, tick};

    const DEMO_LEVEL: &str = include_str!("../levels/demo.lvl");
    /// Frames the final frame stays on screen before a finished level restarts
    const RESTART_DELAY: f32 = 90.0;

    struct Game {
        sim: Simulation,
        surface: CanvasSurface,
        keys: HeldKeys,
        key_map: KeyMap,
        last_time: f64,
        hidden: bool,
        finished_for: f32,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                frames_from_millis(time - self.last_time)
            } else {
                1.0
            };
            self.last_time = time;
            if self.hidden {
                return;
            }

            if self.sim.is_running() {
                if !is_pathological(dt) {
                    self.surface.clear();
                }
                let input = self.keys.input(&self.key_map);
                let status = tick(&mut self.sim, &input, &mut self.surface, dt);
                if status == TickStatus::Advanced {
                    for event in self.sim.drain_events() {
                        log::debug!("{:?}", event);
                    }
                }
                return;
            }

            if matches!(self.sim.phase, SessionPhase::Won | SessionPhase::Lost) && !is_pathological(dt) {
                self.finished_for += dt;
                if self.finished_for >= RESTART_DELAY {
                    self.finished_for = 0.0;
                    if let Err(err) = self.sim.restart() {
                        log::error!("Restart failed: {}", err);
                    }
                }
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {err}").into());
        }

        log::info!("Ledge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let (width, height, dpr) = fit_canvas(&window, &canvas);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let mut settings = Settings::default();
        settings.seed = js_sys::Date::now() as u64;
        settings.render.scale = dpr as f32;
        settings.render.viewport = (width as f32, height as f32);

        let sim = Simulation::from_level_str(DEMO_LEVEL, settings)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let game = Rc::new(RefCell::new(Game {
            sim,
            surface: CanvasSurface::new(ctx, width as f64, height as f64),
            keys: HeldKeys::default(),
            key_map: KeyMap::default(),
            last_time: 0.0,
            hidden: false,
            finished_for: 0.0,
        }));

        setup_keyboard(&window, game.clone());
        setup_resize(&window, canvas, game.clone());
        setup_visibility(&window, &document, game.clone());

        request_animation_frame(game);

        log::info!("Ledge running!");
        Ok(())
    }

    /// Size the canvas backing store to its CSS box at device resolution
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32, f64) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height, dpr)
    }

    fn setup_resize(window: &web_sys::Window, canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height, dpr) = fit_canvas(&window_clone, &canvas);
            let mut g = game.borrow_mut();
            g.surface.resize(width as f64, height as f64);
            g.sim.settings.render.scale = dpr as f32;
            g.sim.set_viewport(width as f32, height as f32);
            log::debug!("Canvas resized to {}x{}", width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                if g.keys.press(&g.key_map, event.key_code()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            if g.keys.release(&g.key_map, event.key_code()) {
                event.prevent_default();
            }
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_visibility(window: &web_sys::Window, document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        // Hidden tab: freeze and drop held keys
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                g.keys.clear();
                g.last_time = 0.0;
                log::info!("Visibility changed, hidden = {}", g.hidden);
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyup never arrives for keys released while unfocused
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            game.borrow_mut().keys.clear();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use thiserror::Error;

    use ledge::render::RecordingSurface;
    use ledge::settings::Settings;
    use ledge::sim::{SessionPhase, SimError, Simulation, TickInput, TickStatus, tick};

    #[derive(Debug, Error)]
    pub enum RunError {
        #[error("cannot read {}: {source}", .path.display())]
        Read {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("invalid settings: {0}")]
        Settings(#[from] serde_json::Error),
        #[error(transparent)]
        Sim(#[from] SimError),
    }

    #[derive(Debug, PartialEq, Parser)]
    #[command(name = "ledge")]
    #[command(about = "Run a platformer level headless and report the outcome")]
    pub struct Args {
        /// Level description file
        pub level: PathBuf,
        /// Ticks to simulate (one tick per 60 Hz frame)
        #[arg(long, default_value_t = 600)]
        pub ticks: u64,
        /// Settings JSON; missing fields keep their defaults
        #[arg(long)]
        pub settings: Option<PathBuf>,
    }

    fn read(path: &Path) -> Result<String, RunError> {
        std::fs::read_to_string(path).map_err(|source| RunError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Run a level with no input held and report how the session ended
    pub fn run(args: &Args) -> Result<Simulation, RunError> {
        let settings = match &args.settings {
            Some(path) => Settings::from_json(&read(path)?)?,
            None => Settings::default(),
        };
        let source = read(&args.level)?;
        let mut sim = Simulation::from_level_str(&source, settings)?;

        let mut surface = RecordingSurface::new();
        let input = TickInput::default();
        for _ in 0..args.ticks {
            surface.clear();
            if tick(&mut sim, &input, &mut surface, 1.0) == TickStatus::Stopped {
                break;
            }
            for event in sim.drain_events() {
                log::info!("tick {}: {:?}", sim.time_ticks, event);
            }
        }
        if sim.phase == SessionPhase::Running {
            sim.stop();
        }
        Ok(sim)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use clap::error::ErrorKind;

        #[test]
        fn test_parse_args() {
            let parsed =
                Args::try_parse_from(["ledge", "level.lvl", "--ticks", "30", "--settings", "s.json"]).unwrap();
            assert_eq!(
                parsed,
                Args {
                    level: PathBuf::from("level.lvl"),
                    ticks: 30,
                    settings: Some(PathBuf::from("s.json")),
                }
            );
            assert_eq!(Args::try_parse_from(["ledge", "level.lvl"]).unwrap().ticks, 600);
        }

        #[test]
        fn test_bad_args() {
            let kind = |argv: &[&str]| Args::try_parse_from(argv).unwrap_err().kind();
            assert_eq!(kind(&["ledge"]), ErrorKind::MissingRequiredArgument);
            assert_eq!(kind(&["ledge", "a", "b"]), ErrorKind::UnknownArgument);
            assert_eq!(kind(&["ledge", "a", "--ticks", "many"]), ErrorKind::ValueValidation);
            assert!(Args::try_parse_from(["ledge", "a", "--ticks"]).is_err());
        }

        #[test]
        fn test_missing_level_file_is_reported() {
            let args = Args::try_parse_from(["ledge", "no/such/level.lvl"]).unwrap();
            assert!(matches!(run(&args), Err(RunError::Read { .. })));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = headless::Args::parse();
    match headless::run(&args) {
        Ok(sim) => {
            let player = sim.entities.player().map(|p| p.body.pos);
            log::info!("Ledge (native) finished");
            println!(
                "{:?} after {} ticks, player at {:?}",
                sim.phase, sim.time_ticks, player
            );
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
