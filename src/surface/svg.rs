//! SVG export of a rendered frame.
//!
//! Builds a standalone document from the draw calls of the last frame, for
//! headless snapshots of the landscape.

use core::fmt::Write as _;

use crate::render::{Rgba, Surface};

#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f32,
    height: f32,
    /// Decimal precision for coordinate values.
    precision: usize,
    defs: String,
    body: String,
    next_gradient: usize,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            precision: 2,
            defs: String::new(),
            body: String::new(),
            next_gradient: 0,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Complete SVG document for the current frame.
    pub fn to_document(&self) -> String {
        let p = self.precision;
        let mut out = String::with_capacity(self.defs.len() + self.body.len() + 256);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = num(p, self.width),
            h = num(p, self.height),
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            out.push_str(&self.defs);
            out.push_str("</defs>\n");
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

fn num(precision: usize, v: f32) -> String {
    format!("{:.prec$}", v, prec = precision)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

impl Surface for SvgSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        let p = self.precision;
        self.defs.clear();
        self.body.clear();
        self.next_gradient = 0;
        let _ = writeln!(
            self.body,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            num(p, self.width),
            num(p, self.height),
            color
        );
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba, width: f32) {
        let p = self.precision;
        let _ = writeln!(
            self.body,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
            num(p, x1),
            num(p, y1),
            num(p, x2),
            num(p, y2),
            color,
            num(p, width)
        );
    }

    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        let p = self.precision;
        let id = format!("glow{}", self.next_gradient);
        self.next_gradient += 1;
        let _ = writeln!(
            self.defs,
            "<radialGradient id=\"{id}\"><stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></radialGradient>",
            color,
            color.with_alpha(0.0)
        );
        let _ = writeln!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"url(#{id})\"/>",
            num(p, x),
            num(p, y),
            num(p, radius)
        );
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        let p = self.precision;
        let _ = writeln!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
            num(p, x),
            num(p, y),
            num(p, radius.max(0.0)),
            color
        );
    }

    fn dashed_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba, dash: f32) {
        let p = self.precision;
        let _ = writeln!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke=\"{}\" stroke-dasharray=\"{d} {d}\"/>",
            num(p, x),
            num(p, y),
            num(p, radius.max(0.0)),
            color,
            d = num(p, dash)
        );
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        let p = self.precision;
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" fill=\"{}\" font-family=\"system-ui, sans-serif\" font-size=\"12\" text-anchor=\"middle\">{}</text>",
            num(p, x),
            num(p, y),
            color,
            escape_xml(text)
        );
    }
}
