//! HTML canvas drawing surface

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::render::{Color, Surface};

/// `Surface` backed by a 2D canvas context
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

fn report(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("canvas {} failed: {:?}", op, err);
    }
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self { ctx, width, height }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Wipe the whole canvas before a frame
    pub fn clear(&mut self) {
        report("resetTransform", self.ctx.reset_transform());
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }
}

impl Surface for CanvasSurface {
    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ctx.line_to(x as f64, y as f64);
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32) {
        let result = self
            .ctx
            .arc(x as f64, y as f64, radius as f64, start as f64, end as f64);
        report("arc", result);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ctx.rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn translate(&mut self, x: f32, y: f32) {
        report("translate", self.ctx.translate(x as f64, y as f64));
    }

    fn scale(&mut self, x: f32, y: f32) {
        report("scale", self.ctx.scale(x as f64, y as f64));
    }

    fn reset_transform(&mut self) {
        report("resetTransform", self.ctx.reset_transform());
    }
}
