//! Simulation context
//!
//! Everything the per-frame loop mutates lives in one `Simulation`: the
//! category lists, particle groups, camera, held input, RNG and session
//! phase. Components receive it explicitly instead of reaching for globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::entity::{Body, Category, Entity, EntityId, GroundRef};
use super::particles::{Burst, ParticleGroup};
use super::spawn::{EntitySpec, SpawnError, SpawnKind, spawn};
use super::tick::TickInput;
use crate::level;
use crate::settings::Settings;

/// Fatal initialization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("level has no player")]
    MissingPlayer,
    #[error("level has {0} players, expected exactly one")]
    MultiplePlayers(usize),
}

/// Where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    /// Player reached a victory zone
    Won,
    /// Player ran into an enemy
    Lost,
    /// Stopped from outside (editor, page hidden)
    Stopped,
}

/// Things the host may want to react to (sound, HUD, restart)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Landed { id: EntityId, impact: f32 },
    EnemyHit { id: EntityId, health: u32 },
    EnemyKilled { id: EntityId },
    PathFrozen { id: EntityId },
    Victory,
    Defeat,
}

/// The fixed category partition
#[derive(Debug, Clone, Default)]
pub struct EntityLists {
    lists: [Vec<Entity>; 5],
}

impl EntityLists {
    pub fn get(&self, category: Category) -> &[Entity] {
        &self.lists[category.index()]
    }

    pub fn get_mut(&mut self, category: Category) -> &mut [Entity] {
        &mut self.lists[category.index()]
    }

    pub fn push(&mut self, entity: Entity) {
        self.lists[entity.category().index()].push(entity);
    }

    /// All entities in update order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        Category::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.lists.iter_mut().flat_map(|list| list.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.lists.iter_mut().for_each(Vec::clear);
    }

    pub fn find(&self, category: Category, id: EntityId) -> Option<&Entity> {
        self.get(category).iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, category: Category, id: EntityId) -> Option<&mut Entity> {
        self.lists[category.index()].iter_mut().find(|e| e.id == id)
    }

    /// Resolve a ground handle; stale or dead handles resolve to nothing
    pub fn resolve(&self, handle: GroundRef) -> Option<&Entity> {
        self.find(handle.category, handle.id).filter(|e| !e.dead)
    }

    /// Body of a ground handle, if it still refers to something
    pub fn ground_body(&self, handle: Option<GroundRef>) -> Option<Body> {
        handle.and_then(|h| self.resolve(h)).map(|e| e.body)
    }

    /// The player, if present
    pub fn player(&self) -> Option<&Entity> {
        self.get(Category::Players).first()
    }

    /// Drop every entity flagged dead; returns how many were removed
    pub fn purge_dead(&mut self) -> usize {
        let before = self.len();
        for list in &mut self.lists {
            list.retain(|e| !e.dead);
        }
        before - self.len()
    }

    /// Take an entity out for its update so it can see every other entity
    pub(crate) fn take(&mut self, category: Category, index: usize) -> Entity {
        self.lists[category.index()].remove(index)
    }

    pub(crate) fn put_back(&mut self, category: Category, index: usize, entity: Entity) {
        self.lists[category.index()].insert(index, entity);
    }
}

/// Smoothed follow camera with impact shake
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Camera {
    /// World position of the viewport's top-left corner
    pub pos: Vec2,
    /// Current shake amplitude, pixels
    pub shake: f32,
    /// Shake offset applied this frame
    pub jitter: Vec2,
}

impl Camera {
    /// Move toward centering `target` in a viewport of `viewport` world units
    pub fn follow(&mut self, target: &Body, viewport: Vec2, smoothing: f32, instant: bool, dt: f32) {
        let goal = target.center() - viewport / 2.0;
        let t = if instant { 1.0 } else { (smoothing * dt).min(1.0) };
        self.pos += (goal - self.pos) * t;
    }

    /// Pick this frame's shake offset and decay the amplitude
    pub fn update_shake<R: Rng + ?Sized>(&mut self, rng: &mut R, decay: f32, dt: f32) {
        if self.shake < 0.01 {
            self.shake = 0.0;
            self.jitter = Vec2::ZERO;
            return;
        }
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        self.jitter = Vec2::from_angle(angle) * self.shake;
        self.shake *= decay.powf(dt);
    }
}

/// The whole simulation context
#[derive(Debug, Clone)]
pub struct Simulation {
    pub settings: Settings,
    pub entities: EntityLists,
    pub particles: Vec<ParticleGroup>,
    pub camera: Camera,
    /// Actions held during the current tick
    pub input: TickInput,
    pub rng: Pcg32,
    pub events: Vec<GameEvent>,
    pub phase: SessionPhase,
    /// Ticks advanced since the session started
    pub time_ticks: u64,
    running: bool,
    specs: Vec<EntitySpec>,
    next_id: EntityId,
}

impl Simulation {
    /// Start a session from level records
    ///
    /// Records that fail to spawn are logged and skipped. A level without
    /// exactly one player is refused.
    pub fn new(specs: Vec<EntitySpec>, settings: Settings) -> Result<Self, SimError> {
        let mut sim = Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            entities: EntityLists::default(),
            particles: Vec::new(),
            camera: Camera::default(),
            input: TickInput::default(),
            events: Vec::new(),
            phase: SessionPhase::Running,
            time_ticks: 0,
            running: true,
            specs,
            next_id: 1,
        };
        sim.restart()?;
        Ok(sim)
    }

    /// Parse a level description and start a session from it
    pub fn from_level_str(source: &str, settings: Settings) -> Result<Self, SimError> {
        let parsed = level::parse(source);
        for err in &parsed.errors {
            log::warn!("Skipping level record: {}", err);
        }
        Self::new(parsed.specs, settings)
    }

    /// Reset every piece of session state and respawn the level
    pub fn restart(&mut self) -> Result<(), SimError> {
        self.entities.clear();
        self.particles.clear();
        self.events.clear();
        self.camera = Camera::default();
        self.input = TickInput::default();
        self.rng = Pcg32::seed_from_u64(self.settings.seed);
        self.time_ticks = 0;
        self.next_id = 1;

        let specs = std::mem::take(&mut self.specs);
        for spec in &specs {
            if let Err(err) = self.spawn(spec) {
                log::warn!("Skipping {} record: {}", spec.kind.as_str(), err);
            }
        }
        self.specs = specs;

        let players = self.entities.get(Category::Players).len();
        match players {
            0 => return Err(SimError::MissingPlayer),
            1 => {}
            n => return Err(SimError::MultiplePlayers(n)),
        }

        let viewport = self.viewport();
        if let Some(player) = self.entities.player() {
            let body = player.body;
            self.camera.follow(&body, viewport, 1.0, true, 1.0);
        }

        self.phase = SessionPhase::Running;
        self.running = true;
        log::info!("Session started with {} entities", self.entities.len());
        Ok(())
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an entity into its category list
    pub fn spawn(&mut self, spec: &EntitySpec) -> Result<EntityId, SpawnError> {
        let id = self.next_entity_id();
        let entity = spawn(spec, id, &self.settings)?;
        self.entities.push(entity);
        Ok(id)
    }

    /// Records this session was started from
    pub fn specs(&self) -> &[EntitySpec] {
        &self.specs
    }

    /// Records for the live entity set, in category order
    pub fn live_specs(&self) -> Vec<EntitySpec> {
        self.entities
            .iter()
            .filter(|e| !e.dead)
            .map(|e| e.spec.clone())
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop scheduling ticks. A tick already in progress still completes.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Session stopped after {} ticks", self.time_ticks);
        }
        self.running = false;
        if self.phase == SessionPhase::Running {
            self.phase = SessionPhase::Stopped;
        }
    }

    /// End the session with a result; the first result wins
    pub fn finish(&mut self, phase: SessionPhase) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.phase = phase;
        self.running = false;
        match phase {
            SessionPhase::Won => {
                log::info!("Victory after {} ticks", self.time_ticks);
                self.events.push(GameEvent::Victory);
            }
            SessionPhase::Lost => {
                log::info!("Defeat after {} ticks", self.time_ticks);
                self.events.push(GameEvent::Defeat);
            }
            _ => {}
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Viewport size in world units
    pub fn viewport(&self) -> Vec2 {
        let (w, h) = self.settings.render.viewport;
        Vec2::new(w, h) / self.settings.render.scale.max(f32::EPSILON)
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.settings.render.viewport = (width, height);
    }

    /// Emit a particle burst unless particles are off or at the cap
    pub fn emit(&mut self, burst: Burst) {
        if burst.count == 0 || self.particles.len() >= self.settings.max_particle_groups() {
            return;
        }
        let group = ParticleGroup::emit(&mut self.rng, burst);
        self.particles.push(group);
    }

    /// Kick the camera
    pub fn add_shake(&mut self, amount: f32) {
        if !self.settings.effective_screen_shake() {
            return;
        }
        self.camera.shake = (self.camera.shake + amount).min(self.settings.camera.max_shake);
    }

    /// Spec kinds are checked before spawning so editors can filter
    pub fn count_kind(&self, kind: SpawnKind) -> usize {
        self.entities.iter().filter(|e| e.spec.kind == kind).count()
    }
}
