//! Rope Climb headless runner
//!
//! Drives one run at 60 fps with a simple autopilot on the keyboard and
//! prints the run result as JSON.
//!
//! Usage: `rope-climb [easy|normal|hard] [seed] [duration_ms]`
//! Set `ROPE_CLIMB_SETTINGS` to a JSON file to override settings.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rope_climb::sim::RunResult;
    use rope_climb::{Difficulty, Engine, InputCapabilities, Settings};

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let difficulty = match args.first().map(|s| s.parse::<Difficulty>()) {
        None => Difficulty::default(),
        Some(Ok(d)) => d,
        Some(Err(e)) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let seed = args.get(1).and_then(|s| s.parse::<u64>().ok());

    let mut settings = match std::env::var("ROPE_CLIMB_SETTINGS") {
        Ok(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        Err(_) => Settings::default(),
    };
    if let Some(limit) = args.get(2).and_then(|s| s.parse::<f64>().ok()) {
        settings.duration_limit_ms = Some(limit);
    }

    log::info!("Rope Climb (native) starting...");

    let delivered: Rc<RefCell<Option<RunResult>>> = Rc::default();
    let slot = delivered.clone();
    let sink = move |result: RunResult| {
        *slot.borrow_mut() = Some(result);
    };
    let caps = InputCapabilities::keyboard_only();
    let engine = match seed {
        Some(seed) => Engine::with_seed(difficulty, settings, caps, sink, seed),
        None => Engine::create(difficulty, settings, caps, sink),
    };
    let mut engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    const FRAME_MS: f64 = 1000.0 / 60.0;
    // Ten simulated minutes is far beyond any unassisted run
    const MAX_SIM_MS: f64 = 10.0 * 60.0 * 1000.0;

    let mut now = 0.0;
    while delivered.borrow().is_none() && now < MAX_SIM_MS {
        autopilot::steer(&mut engine);
        for event in engine.tick(now, FRAME_MS) {
            log::debug!("{:>8.0}ms {:?}", now, event);
        }
        now += FRAME_MS;
    }

    match delivered.borrow().as_ref() {
        Some(result) => println!("{}", result.to_json()),
        None => {
            log::warn!("Run did not finish within {:.0}ms", MAX_SIM_MS);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use rope_climb::Engine;
    use rope_climb::sim::{Key, ObstacleKind};

    /// Hazards closer than this (horizontally) are threats
    const DODGE_WIDTH: f32 = 36.0;
    /// How far above the avatar we look (px)
    const LOOKAHEAD: f32 = 220.0;

    /// Press keys to dodge the most urgent hazard, or drift toward a bonus
    pub fn steer(engine: &mut Engine) {
        let avatar = engine.avatar().pos;
        let (lo, hi) = engine.settings().lane_bounds();

        let in_window = |y: f32| y < avatar.y + 10.0 && avatar.y - y < LOOKAHEAD;
        let threat = engine
            .obstacles()
            .iter()
            .filter(|o| o.kind == ObstacleKind::Hazard && in_window(o.pos.y))
            .filter(|o| (o.pos.x - avatar.x).abs() < DODGE_WIDTH)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|o| (o.pos.x, avatar.y - o.pos.y));
        let bonus = engine
            .obstacles()
            .iter()
            .filter(|o| o.kind == ObstacleKind::Bonus && in_window(o.pos.y))
            .min_by(|a, b| {
                (a.pos.x - avatar.x)
                    .abs()
                    .total_cmp(&(b.pos.x - avatar.x).abs())
            })
            .map(|o| o.pos.x);

        let direction: i8 = match (threat, bonus) {
            (Some((x, _)), _) => {
                // Away from the hazard, unless that runs into the wall
                let away = if x > avatar.x { -1 } else { 1 };
                let room = if away < 0 { avatar.x - lo } else { hi - avatar.x };
                if room < DODGE_WIDTH { -away } else { away }
            }
            (None, Some(x)) if (x - avatar.x).abs() > 6.0 => {
                if x > avatar.x { 1 } else { -1 }
            }
            _ => 0,
        };
        let urgent = threat.is_some_and(|(_, dy)| dy < 90.0);

        let input = engine.input_mut();
        input.set_key(Key::Left, direction < 0);
        input.set_key(Key::Right, direction > 0);
        input.set_key(Key::Burst, urgent);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the engine directly through the library
}
