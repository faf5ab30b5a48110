//! Deterministic waypoint following for moving platforms and decorations
//!
//! Waypoints are offsets from the owning entity's spawn origin. Each one
//! carries the number of frames it takes to travel *to* it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::Body;
use crate::consts::DEFAULT_PATH_FRAMES;

/// How the index moves once the last waypoint is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Reverse direction at either end
    #[default]
    Bounce,
    /// Wrap back to the first waypoint
    Loop,
}

impl PathMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMode::Bounce => "bounce",
            PathMode::Loop => "loop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [PathMode::Bounce, PathMode::Loop]
            .into_iter()
            .find(|mode| mode.as_str() == name)
    }
}

/// One waypoint: `[x, y]` or `[x, y, frames]` in level files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Waypoint {
    pub offset: Vec2,
    /// Frames to reach this point; `None` uses the path default
    pub frames: Option<f32>,
}

impl Waypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            frames: None,
        }
    }

    pub fn with_frames(mut self, frames: f32) -> Self {
        self.frames = Some(frames);
        self
    }
}

impl TryFrom<Vec<f32>> for Waypoint {
    type Error = String;

    fn try_from(raw: Vec<f32>) -> Result<Self, Self::Error> {
        match raw.as_slice() {
            [x, y] => Ok(Waypoint::new(*x, *y)),
            [x, y, n] => Ok(Waypoint::new(*x, *y).with_frames(*n)),
            other => Err(format!(
                "waypoint needs 2 or 3 numbers, got {}",
                other.len()
            )),
        }
    }
}

impl From<Waypoint> for Vec<f32> {
    fn from(point: Waypoint) -> Self {
        match point.frames {
            Some(n) => vec![point.offset.x, point.offset.y, n],
            None => vec![point.offset.x, point.offset.y],
        }
    }
}

/// Path faults; the owner freezes the path when one is reported
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("path has no waypoints")]
    Empty,
    #[error("waypoint {index} has a non-positive frame count ({frames})")]
    BadFrames { index: usize, frames: f32 },
    #[error("unknown path mode `{0}`")]
    UnknownMode(String),
}

/// A waypoint follower owned by exactly one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    mode: PathMode,
    frames: f32,
    points: Vec<Waypoint>,
    index: usize,
    direction: i32,
    frozen: bool,
    /// Mode name from the level that matched no `PathMode`
    unknown_mode: Option<String>,
}

impl Path {
    /// Build a path; `frames` is the default travel time for waypoints
    /// without their own count (120 when `None`).
    pub fn new(mode: PathMode, frames: Option<f32>, points: Vec<Waypoint>) -> Self {
        Self {
            mode,
            frames: frames.unwrap_or(DEFAULT_PATH_FRAMES),
            points,
            index: 0,
            direction: 1,
            frozen: false,
            unknown_mode: None,
        }
    }

    /// Path whose level record named a mode that does not exist
    ///
    /// The first `advance` reports `PathError::UnknownMode`.
    pub fn with_unknown_mode(name: impl Into<String>, frames: Option<f32>, points: Vec<Waypoint>) -> Self {
        Self {
            unknown_mode: Some(name.into()),
            ..Self::new(PathMode::default(), frames, points)
        }
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }

    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    /// Index of the waypoint currently being approached
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Stop advancing; every later `advance` is a no-op
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn frames_for(&self, index: usize) -> Result<f32, PathError> {
        let frames = self.points[index].frames.unwrap_or(self.frames);
        if frames > 0.0 {
            Ok(frames)
        } else {
            Err(PathError::BadFrames { index, frames })
        }
    }

    fn next_index(&mut self) -> usize {
        let last = self.points.len() as i32 - 1;
        let next = self.index as i32 + self.direction;
        match self.mode {
            PathMode::Bounce => {
                if next > last || next < 0 {
                    self.direction = -self.direction;
                }
                (self.index as i32 + self.direction).clamp(0, last) as usize
            }
            PathMode::Loop => {
                if next > last {
                    0
                } else {
                    next.max(0) as usize
                }
            }
        }
    }

    /// Move `body` along the path for one tick
    ///
    /// While the body is still closing in on the current waypoint nothing
    /// changes. Once one more step would take it further away, the body is
    /// snapped exactly onto the waypoint (clearing accumulated drift), the
    /// next waypoint is selected and the velocity is set so that it is
    /// reached in exactly its frame count at unit `dt`.
    pub fn advance(&mut self, body: &mut Body, origin: Vec2, dt: f32) -> Result<(), PathError> {
        if self.frozen {
            return Ok(());
        }
        if let Some(name) = &self.unknown_mode {
            return Err(PathError::UnknownMode(name.clone()));
        }
        if self.points.is_empty() {
            return Err(PathError::Empty);
        }

        let offset = body.pos - origin;
        let target = self.points[self.index].offset;

        let now = offset.distance(target);
        let ahead = (offset + body.vel * dt).distance(target);
        if now > ahead {
            return Ok(());
        }

        body.pos = origin + target;

        self.index = self.next_index();
        let next = self.points[self.index].offset;
        let frames = self.frames_for(self.index)?;
        body.vel = (next - target) / frames;

        Ok(())
    }
}
