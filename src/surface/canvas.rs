//! Browser backend: draws onto an `HtmlCanvasElement` 2d context.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{LandscapeError, Result};
use crate::render::{Rgba, Surface};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
}

impl CanvasSurface {
    /// Acquire the 2d context. Fails when the canvas cannot provide one, in
    /// which case the host should keep ticking without a surface.
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| LandscapeError::SurfaceUnavailable("get_context threw".into()))?
            .ok_or_else(|| LandscapeError::SurfaceUnavailable("missing 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| LandscapeError::SurfaceUnavailable("context is not 2d".into()))?;

        Ok(Self {
            ctx,
            width: canvas.width() as f32,
            height: canvas.height() as f32,
        })
    }

    fn circle_path(&self, x: f32, y: f32, radius: f32) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            x as f64,
            y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::PI * 2.0,
        );
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx
            .fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(x1 as f64, y1 as f64);
        self.ctx.line_to(x2 as f64, y2 as f64);
        self.ctx.stroke();
    }

    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        let Ok(grad) = self.ctx.create_radial_gradient(
            x as f64,
            y as f64,
            0.0,
            x as f64,
            y as f64,
            radius.max(0.0) as f64,
        ) else {
            return;
        };
        let _ = grad.add_color_stop(0.0, &color.to_string());
        let _ = grad.add_color_stop(1.0, &color.with_alpha(0.0).to_string());
        self.ctx.set_fill_style_canvas_gradient(&grad);
        self.circle_path(x, y, radius);
        self.ctx.fill();
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.circle_path(x, y, radius);
        self.ctx.fill();
    }

    fn dashed_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba, dash: f32) {
        let pattern = js_sys::Array::of2(&(dash as f64).into(), &(dash as f64).into());
        let _ = self.ctx.set_line_dash(&pattern);
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.set_line_width(1.0);
        self.circle_path(x, y, radius);
        self.ctx.stroke();
        let _ = self.ctx.set_line_dash(&js_sys::Array::new());
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.set_font("12px ui-sans-serif, system-ui, sans-serif");
        self.ctx.set_text_align("center");
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}
