//! Rendering boundary
//!
//! The simulation draws through the `Surface` trait, a small subset of a 2D
//! canvas API. The browser backend implements it on a canvas context; the
//! headless runner and tests use `RecordingSurface`.

pub mod shapes;

use glam::Vec2;

pub use shapes::{draw_entity, draw_particles, draw_path, draw_selection};

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GREY: Color = Color::rgb(128, 128, 128);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const RED: Color = Color::rgb(200, 30, 30);
    pub const DARK_RED: Color = Color::rgb(110, 10, 10);
    pub const ORANGE: Color = Color::rgb(255, 140, 0);
    /// Landing dust
    pub const DUST: Color = Color::rgb(150, 150, 150);
    /// Dirt kicked up when skidding
    pub const DIRT: Color = Color::rgb(110, 80, 50);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS color string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// World-to-screen mapping for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// World position drawn at the screen's top-left corner
    pub offset: Vec2,
    /// Pixels per world unit
    pub scale: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl View {
    pub fn new(offset: Vec2, scale: f32) -> Self {
        Self { offset, scale }
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.offset) * self.scale
    }

    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.scale + self.offset
    }
}

/// Drawing primitives the engine needs from a 2D backend
pub trait Surface {
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    /// Circular arc around `(x, y)`, angles in radians
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32);
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_global_alpha(&mut self, alpha: f32);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, x: f32, y: f32);
    fn reset_transform(&mut self);
}

/// One recorded `Surface` call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginPath,
    ClosePath,
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
    },
    Rect {
        pos: Vec2,
        size: Vec2,
    },
    FillColor(Color),
    StrokeColor(Color),
    GlobalAlpha(f32),
    Fill,
    Stroke,
    Translate(Vec2),
    Scale(Vec2),
    ResetTransform,
}

/// Surface that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every translation recorded, in order
    pub fn translations(&self) -> Vec<Vec2> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Translate(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &DrawCommand) -> usize {
        self.commands.iter().filter(|cmd| *cmd == wanted).count()
    }
}

impl Surface for RecordingSurface {
    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(Vec2::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(Vec2::new(x, y)));
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32) {
        self.commands.push(DrawCommand::Arc {
            center: Vec2::new(x, y),
            radius,
            start,
            end,
        });
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Rect {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate(Vec2::new(x, y)));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Scale(Vec2::new(x, y)));
    }

    fn reset_transform(&mut self) {
        self.commands.push(DrawCommand::ResetTransform);
    }
}
