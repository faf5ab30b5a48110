//! End-to-end sessions: level text in, ticks, outcome out

use ledge::editor::Scene;
use ledge::level;
use ledge::render::RecordingSurface;
use ledge::settings::Settings;
use ledge::sim::{Category, GameEvent, SessionPhase, Simulation, TickInput, TickStatus, tick};

const DEMO: &str = include_str!("../levels/demo.lvl");

fn run(sim: &mut Simulation, ticks: usize, input: impl Fn(usize) -> TickInput) -> Vec<GameEvent> {
    let mut surface = RecordingSurface::new();
    let mut events = Vec::new();
    for i in 0..ticks {
        surface.clear();
        if tick(sim, &input(i), &mut surface, 1.0) == TickStatus::Stopped {
            break;
        }
        events.extend(sim.drain_events());
    }
    events
}

#[test]
fn demo_level_is_valid() {
    let parsed = level::parse_checked(DEMO, &Settings::default());
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(parsed.specs.len(), 9);

    let sim = Simulation::new(parsed.specs, Settings::default()).unwrap();
    assert_eq!(sim.entities.get(Category::Players).len(), 1);
    assert_eq!(sim.entities.get(Category::Mobs).len(), 1);
}

#[test]
fn player_falls_and_rests_on_the_first_wall() {
    let mut sim = Simulation::from_level_str(DEMO, Settings::default()).unwrap();
    run(&mut sim, 120, |_| TickInput::default());

    let player = sim.entities.player().unwrap();
    assert_eq!(player.body.pos.y, 150.0 - 20.0 + 1.0);
    assert!(player.physics.as_ref().unwrap().is_grounded());
    assert_eq!(sim.phase, SessionPhase::Running);
}

#[test]
fn same_seed_same_session() {
    let script = |i: usize| TickInput {
        right: i < 40,
        up: (20..30).contains(&i),
        ..TickInput::default()
    };

    let mut a = Simulation::from_level_str(DEMO, Settings::default()).unwrap();
    let mut b = Simulation::from_level_str(DEMO, Settings::default()).unwrap();
    let events_a = run(&mut a, 200, script);
    let events_b = run(&mut b, 200, script);

    assert_eq!(events_a, events_b);
    let bodies = |sim: &Simulation| sim.entities.iter().map(|e| e.body).collect::<Vec<_>>();
    assert_eq!(bodies(&a), bodies(&b));
    assert_eq!(a.camera.pos, b.camera.pos);
}

#[test]
fn restart_replays_identically() {
    let mut sim = Simulation::from_level_str(DEMO, Settings::default()).unwrap();
    let first = run(&mut sim, 150, |i| TickInput {
        right: i % 3 == 0,
        ..TickInput::default()
    });
    let player_first = sim.entities.player().unwrap().body;

    sim.restart().unwrap();
    assert_eq!(sim.time_ticks, 0);
    let second = run(&mut sim, 150, |i| TickInput {
        right: i % 3 == 0,
        ..TickInput::default()
    });
    assert_eq!(first, second);
    assert_eq!(sim.entities.player().unwrap().body, player_first);
}

#[test]
fn enemy_walking_into_player_is_a_defeat() {
    let level = r#"
        wall {"x": -200, "y": 100, "w": 400, "h": 20};
        player {"x": 0, "y": 81};
        enemy {"x": 60, "y": 81};
    "#;
    let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
    let events = run(&mut sim, 120, |_| TickInput::default());

    assert_eq!(sim.phase, SessionPhase::Lost);
    assert_eq!(events.last(), Some(&GameEvent::Defeat));
    assert!(!sim.is_running());
}

#[test]
fn edited_scene_plays_and_saves() {
    let mut scene = Scene::from_level(DEMO, Settings::default());
    assert_eq!(scene.len(), 9);

    scene.move_by(0, glam::Vec2::new(20.0, 0.0)).unwrap();
    let saved = scene.to_level_string();
    let reparsed = level::parse(&saved);
    assert!(reparsed.errors.is_empty());
    assert_eq!(reparsed.specs, scene.specs());

    let sim = scene.start_session().unwrap();
    assert_eq!(sim.entities.player().unwrap().body.pos.x, 120.0);
    // Live specs come back in category order
    let live = sim.live_specs();
    let specs = scene.specs();
    assert_eq!(live.len(), specs.len());
    assert!(live.iter().all(|spec| specs.contains(spec)));
}
