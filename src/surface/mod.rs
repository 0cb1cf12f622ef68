//! Drawing backends for [`Surface`](crate::render::Surface).

use crate::render::{Rgba, Surface};

pub mod svg;

#[cfg(feature = "web")]
pub mod canvas;

pub use svg::SvgSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Rgba,
        width: f32,
    },
    Glow {
        center: (f32, f32),
        radius: f32,
        color: Rgba,
    },
    FillCircle {
        center: (f32, f32),
        radius: f32,
        color: Rgba,
    },
    DashedCircle {
        center: (f32, f32),
        radius: f32,
        color: Rgba,
        dash: f32,
    },
    Text {
        at: (f32, f32),
        text: String,
        color: Rgba,
    },
}

/// Keeps the draw calls of the current frame. `clear` starts a new frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Line {
            from: (x1, y1),
            to: (x2, y2),
            color,
            width,
        });
    }

    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Glow {
            center: (x, y),
            radius,
            color,
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center: (x, y),
            radius,
            color,
        });
    }

    fn dashed_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba, dash: f32) {
        self.commands.push(DrawCommand::DashedCircle {
            center: (x, y),
            radius,
            color,
            dash,
        });
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            at: (x, y),
            text: text.to_string(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.clear(Rgba::WHITE);
        s.line(0.0, 0.0, 1.0, 1.0, Rgba::WHITE, 1.0);
        s.fill_circle(2.0, 2.0, 1.0, Rgba::WHITE);
        assert_eq!(s.commands().len(), 3);

        s.clear(Rgba::WHITE);
        assert_eq!(s.commands().len(), 1);
        assert_eq!(s.count(|c| matches!(c, DrawCommand::Line { .. })), 0);
    }
}
