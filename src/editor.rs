//! Level editor document model
//!
//! A `Scene` is the editor's list of level records plus a spawned preview of
//! each one for drawing and picking. GUIs drive it through pointer and
//! property calls; every property edit is validated by spawning the edited
//! record, and a rejected edit leaves the scene unchanged.

use glam::Vec2;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::level;
use crate::render::{Surface, View, draw_entity, draw_selection};
use crate::settings::Settings;
use crate::sim::entity::{Entity, EntityId};
use crate::sim::spawn::{EntitySpec, SpawnError, SpawnKind, spawn_checked};
use crate::sim::state::{SimError, Simulation};

/// Pointer travel (pixels, either axis) under which a press counts as a click
pub const CLICK_SLOP: f32 = 10.0;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no entity at index {0}")]
    NoSuchEntity(usize),
    #[error("property value is not valid JSON: {0}")]
    BadValue(#[from] serde_json::Error),
    #[error(transparent)]
    Rejected(#[from] SpawnError),
}

/// One placed record and its preview
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub spec: EntitySpec,
    pub preview: Entity,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start: Vec2,
    last: Vec2,
}

/// The editor's document
#[derive(Debug, Clone)]
pub struct Scene {
    items: Vec<SceneEntity>,
    selected: Option<usize>,
    /// World position of the viewport's top-left corner
    pub camera: Vec2,
    settings: Settings,
    drag: Option<Drag>,
    next_id: EntityId,
}

/// JSON number for a coordinate, kept integral when it is whole
fn number(v: f32) -> Value {
    let v = v as f64;
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

impl Scene {
    /// Empty scene
    pub fn empty(settings: Settings) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            camera: Vec2::ZERO,
            settings,
            drag: None,
            next_id: 1,
        }
    }

    /// New scene with a player standing on a wall
    pub fn new(settings: Settings) -> Self {
        let mut scene = Self::empty(settings);
        let starters = [
            (SpawnKind::Player, serde_json::json!({ "x": 100, "y": 100 })),
            (SpawnKind::Wall, serde_json::json!({ "x": 50, "y": 150, "w": 300, "h": 20 })),
        ];
        for (kind, props) in starters {
            if let Value::Object(props) = props
                && let Err(err) = scene.add_spec(EntitySpec::new(kind, props))
            {
                log::error!("Starter {} rejected: {}", kind.as_str(), err);
            }
        }
        scene.selected = None;
        scene
    }

    /// Load a level description; bad records are logged and dropped
    pub fn from_level(source: &str, settings: Settings) -> Self {
        let parsed = level::parse_checked(source, &settings);
        for err in &parsed.errors {
            log::warn!("Dropping level record: {}", err);
        }
        let mut scene = Self::empty(settings);
        for spec in parsed.specs {
            if let Err(err) = scene.add_spec(spec) {
                log::warn!("Dropping level record: {}", err);
            }
        }
        scene.selected = None;
        scene
    }

    fn preview(&mut self, spec: &EntitySpec) -> Result<Entity, SpawnError> {
        let entity = spawn_checked(spec, self.next_id, &self.settings)?;
        self.next_id += 1;
        Ok(entity)
    }

    /// Place a record; the new entity becomes the selection
    pub fn add_spec(&mut self, spec: EntitySpec) -> Result<usize, EditorError> {
        let preview = self.preview(&spec)?;
        self.items.push(SceneEntity { spec, preview });
        let index = self.items.len() - 1;
        self.selected = Some(index);
        Ok(index)
    }

    /// Place a new entity of `kind` with its default properties
    pub fn add(&mut self, kind: SpawnKind) -> Result<usize, EditorError> {
        self.add_spec(EntitySpec::with_defaults(kind))
    }

    pub fn remove(&mut self, index: usize) -> Result<EntitySpec, EditorError> {
        if index >= self.items.len() {
            return Err(EditorError::NoSuchEntity(index));
        }
        let removed = self.items.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Ok(removed.spec)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SceneEntity> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneEntity> {
        self.items.iter()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.items.len());
    }

    /// First placed entity under a world point
    pub fn pick(&self, world: Vec2) -> Option<usize> {
        self.items.iter().position(|item| item.preview.body.contains(world))
    }

    pub fn properties(&self, index: usize) -> Option<&Map<String, Value>> {
        self.items.get(index).map(|item| &item.spec.props)
    }

    pub fn property(&self, index: usize, name: &str) -> Option<&Value> {
        self.properties(index).and_then(|props| props.get(name))
    }

    /// Set one property; rejected values leave the entity untouched
    pub fn set_property(&mut self, index: usize, name: &str, value: Value) -> Result<(), EditorError> {
        let item = self.items.get(index).ok_or(EditorError::NoSuchEntity(index))?;
        let mut spec = item.spec.clone();
        spec.props.insert(name.to_string(), value);

        let preview = self.preview(&spec)?;
        self.items[index] = SceneEntity { spec, preview };
        Ok(())
    }

    /// Set a property from text typed into a GUI field (JSON syntax)
    pub fn set_property_str(&mut self, index: usize, name: &str, text: &str) -> Result<(), EditorError> {
        let value: Value = serde_json::from_str(text)?;
        self.set_property(index, name, value)
    }

    /// Move an entity by a world-space delta
    pub fn move_by(&mut self, index: usize, delta: Vec2) -> Result<(), EditorError> {
        let item = self.items.get_mut(index).ok_or(EditorError::NoSuchEntity(index))?;
        let pos = item.preview.body.pos + delta;
        item.spec.props.insert("x".to_string(), number(pos.x));
        item.spec.props.insert("y".to_string(), number(pos.y));
        item.preview.body.pos = pos;
        item.preview.origin = pos;
        Ok(())
    }

    /// Pointer pressed at a screen position
    pub fn pointer_down(&mut self, screen: Vec2) {
        self.drag = Some(Drag {
            start: screen,
            last: screen,
        });
    }

    /// Pointer moved while pressed: drag the selection, or pan without one
    pub fn pointer_move(&mut self, screen: Vec2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = (screen - drag.last) / self.settings.render.scale.max(f32::EPSILON);
        drag.last = screen;

        match self.selected {
            Some(index) => {
                if let Err(err) = self.move_by(index, delta) {
                    log::warn!("Drag failed: {}", err);
                }
            }
            None => self.camera -= delta,
        }
    }

    /// Pointer released; a press that barely moved selects what is under it
    pub fn pointer_up(&mut self, screen: Vec2) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let travel = (screen - drag.start).abs();
        if travel.x > CLICK_SLOP || travel.y > CLICK_SLOP {
            return;
        }
        let world = self.view().to_world(screen);
        self.selected = self.pick(world);
    }

    pub fn view(&self) -> View {
        View::new(self.camera, self.settings.render.scale)
    }

    /// Draw every preview plus the selection highlight
    pub fn draw(&self, surface: &mut dyn Surface) {
        let view = self.view();
        for item in &self.items {
            draw_entity(surface, &item.preview, &view, self.settings.render.show_paths);
        }
        if let Some(item) = self.selected.and_then(|i| self.items.get(i)) {
            draw_selection(surface, &item.preview.body, &view);
        }
    }

    pub fn specs(&self) -> Vec<EntitySpec> {
        self.items.iter().map(|item| item.spec.clone()).collect()
    }

    /// Save format: one record per entity, in placement order
    pub fn to_level_string(&self) -> String {
        level::to_level_string(&self.specs())
    }

    /// Start a play session from the current scene
    pub fn start_session(&self) -> Result<Simulation, SimError> {
        Simulation::new(self.specs(), self.settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};
    use serde_json::json;

    #[test]
    fn test_new_scene_has_player_and_wall() {
        let scene = Scene::new(Settings::default());
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(0).unwrap().spec.kind, SpawnKind::Player);
        assert_eq!(scene.selected(), None);
        assert!(scene.start_session().is_ok());
    }

    #[test]
    fn test_add_uses_defaults_and_selects() {
        let mut scene = Scene::empty(Settings::default());
        let index = scene.add(SpawnKind::Platform).unwrap();
        assert_eq!(scene.selected(), Some(index));
        assert_eq!(scene.property(index, "w"), Some(&json!(100)));
        assert_eq!(scene.get(index).unwrap().preview.body.size, Vec2::new(100.0, 20.0));
    }

    #[test]
    fn test_pick() {
        let scene = Scene::new(Settings::default());
        assert_eq!(scene.pick(Vec2::new(110.0, 110.0)), Some(0));
        assert_eq!(scene.pick(Vec2::new(300.0, 160.0)), Some(1));
        assert_eq!(scene.pick(Vec2::new(-100.0, -100.0)), None);
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut scene = Scene::new(Settings::default());

        scene.pointer_down(Vec2::new(110.0, 110.0));
        scene.pointer_up(Vec2::new(112.0, 111.0));
        assert_eq!(scene.selected(), Some(0));

        scene.pointer_down(Vec2::new(110.0, 110.0));
        scene.pointer_move(Vec2::new(130.0, 105.0));
        scene.pointer_move(Vec2::new(150.0, 100.0));
        scene.pointer_up(Vec2::new(150.0, 100.0));

        // A long drag never changes the selection
        assert_eq!(scene.selected(), Some(0));
        assert_eq!(scene.property(0, "x"), Some(&json!(140)));
        assert_eq!(scene.property(0, "y"), Some(&json!(90)));
        assert_eq!(scene.get(0).unwrap().preview.body.pos, Vec2::new(140.0, 90.0));
    }

    #[test]
    fn test_drag_without_selection_pans() {
        let mut scene = Scene::new(Settings::default());
        scene.pointer_down(Vec2::new(500.0, 500.0));
        scene.pointer_move(Vec2::new(520.0, 490.0));
        scene.pointer_up(Vec2::new(520.0, 490.0));
        assert_eq!(scene.camera, Vec2::new(-20.0, 10.0));
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_click_on_nothing_clears_selection() {
        let mut scene = Scene::new(Settings::default());
        scene.select(Some(1));
        scene.pointer_down(Vec2::new(700.0, 20.0));
        scene.pointer_up(Vec2::new(700.0, 20.0));
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_invalid_property_is_rejected_without_change() {
        let mut scene = Scene::empty(Settings::default());
        let index = scene.add(SpawnKind::Platform).unwrap();
        let before = scene.to_level_string();

        let err = scene.set_property(index, "type", json!("zigzag")).unwrap_err();
        assert!(matches!(err, EditorError::Rejected(_)));
        assert!(scene.set_property(index, "x", json!("left")).is_err());
        assert!(scene.set_property(index, "speed", json!(3)).is_err());
        assert!(matches!(
            scene.set_property_str(index, "x", "{oops"),
            Err(EditorError::BadValue(_))
        ));
        assert_eq!(scene.to_level_string(), before);
    }

    #[test]
    fn test_valid_property_updates_preview() {
        let mut scene = Scene::empty(Settings::default());
        let index = scene.add(SpawnKind::Platform).unwrap();
        scene.set_property_str(index, "path", "[[0, 0], [50, 0]]").unwrap();
        scene.set_property(index, "type", json!("loop")).unwrap();
        let preview = &scene.get(index).unwrap().preview;
        assert!(preview.kind.path().is_some());
        scene.set_property(index, "path", Value::Null).unwrap();
        assert!(scene.get(index).unwrap().preview.kind.path().is_none());
    }

    #[test]
    fn test_remove_adjusts_selection() {
        let mut scene = Scene::new(Settings::default());
        let index = scene.add(SpawnKind::Victory).unwrap();
        scene.remove(0).unwrap();
        assert_eq!(scene.selected(), Some(index - 1));
        scene.remove(index - 1).unwrap();
        assert_eq!(scene.selected(), None);
        assert!(matches!(scene.remove(5), Err(EditorError::NoSuchEntity(5))));
    }

    #[test]
    fn test_save_and_reload() {
        let mut scene = Scene::new(Settings::default());
        let index = scene.add(SpawnKind::Enemy).unwrap();
        scene.set_property(index, "health", json!(2)).unwrap();
        scene.move_by(0, Vec2::new(0.5, 0.0)).unwrap();

        let text = scene.to_level_string();
        let reloaded = Scene::from_level(&text, Settings::default());
        assert_eq!(reloaded.specs(), scene.specs());
        assert_eq!(reloaded.property(0, "x"), Some(&json!(100.5)));
    }

    #[test]
    fn test_from_level_drops_bad_records() {
        let scene = Scene::from_level(
            r#"player {"x": 0, "y": 0}; wall {"x": 0}; dragon {}"#,
            Settings::default(),
        );
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_draw_highlights_selection() {
        let mut scene = Scene::new(Settings::default());
        let mut surface = RecordingSurface::new();
        scene.draw(&mut surface);
        let plain = surface.count(&DrawCommand::Stroke);

        scene.select(Some(0));
        surface.clear();
        scene.draw(&mut surface);
        assert_eq!(surface.count(&DrawCommand::Stroke), plain + 1);
    }
}
