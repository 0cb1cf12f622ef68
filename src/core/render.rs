//! Frame renderer: edges, then nodes, then region overlays.
//!
//! The renderer holds no per-frame state. Everything it draws is read from
//! the landscape and the rotation passed in, so calling it twice with the
//! same inputs produces the same draw calls.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{LandscapeConfig, Mode};
use crate::landscape::{ConnectionKind, Landscape, NodeKind};
use crate::projection::{project, Projected, Rotation, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear blend toward `other`; `t` is clamped to [0,1].
    pub fn mix(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let h = hex.strip_prefix('#')?;
        if h.len() != 6 {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(h.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?))
    }
}

impl fmt::Display for Rgba {
    /// CSS `rgba(...)` form, accepted by both canvas and SVG.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Matches the dark scientific theme used across the dashboard.
pub const BACKGROUND: Rgba = Rgba::rgb(0x0a, 0x0f, 0x1a);

pub fn node_color(kind: NodeKind) -> Rgba {
    match kind {
        NodeKind::Sensory => Rgba::rgb(74, 222, 128),
        NodeKind::Processing => Rgba::rgb(122, 162, 255),
        NodeKind::Integration => Rgba::rgb(251, 191, 36),
        NodeKind::Output => Rgba::rgb(244, 114, 182),
    }
}

pub fn connection_color(kind: ConnectionKind) -> Rgba {
    match kind {
        ConnectionKind::Excitatory => Rgba::rgb(96, 165, 250),
        ConnectionKind::Inhibitory => Rgba::rgb(251, 113, 133),
        ConnectionKind::Modulatory => Rgba::rgb(167, 139, 250),
    }
}

/// A 2D drawing target. Coordinates are in surface pixels.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn clear(&mut self, color: Rgba);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba, width: f32);
    /// Radial gradient from `color` at the center to transparent at `radius`.
    fn glow(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn dashed_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba, dash: f32);
    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba);
}

/// What one `render` call emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameStats {
    pub edges_drawn: usize,
    pub nodes_drawn: usize,
    pub glows_drawn: usize,
    pub regions_drawn: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Renderer {
    pub edge_threshold: f32,
    pub glow_threshold: f32,
    pub focal_distance: f32,
    pub accent: Rgba,
    pub background: Rgba,
}

impl Renderer {
    pub fn new(cfg: &LandscapeConfig, mode: Mode) -> Self {
        Self {
            edge_threshold: cfg.edge_draw_threshold,
            glow_threshold: cfg.glow_threshold,
            focal_distance: cfg.focal_distance,
            accent: Rgba::from_hex(mode.preset().accent_color).unwrap_or(Rgba::WHITE),
            background: BACKGROUND,
        }
    }

    pub fn viewport_for<S: Surface + ?Sized>(&self, surface: &S) -> Viewport {
        Viewport::new(surface.width(), surface.height(), self.focal_distance)
    }

    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        landscape: &Landscape,
        rotation: Rotation,
    ) -> FrameStats {
        let view = self.viewport_for(surface);
        let mut stats = FrameStats::default();

        surface.clear(self.background);

        let projected: Vec<Projected> = landscape
            .nodes
            .iter()
            .map(|n| project(n.position, rotation, &view))
            .collect();

        for conn in &landscape.connections {
            if conn.activation <= self.edge_threshold {
                continue;
            }
            let (Some(a), Some(b)) = (
                projected.get(conn.from as usize),
                projected.get(conn.to as usize),
            ) else {
                continue;
            };
            if !a.is_visible() || !b.is_visible() {
                continue;
            }
            let color = connection_color(conn.kind).with_alpha(conn.activation);
            let width = if conn.myelination { 2.0 } else { 1.0 };
            surface.line(a.x, a.y, b.x, b.y, color, width);
            stats.edges_drawn += 1;
        }

        // Far to near, so closer nodes paint over farther ones.
        let mut order: Vec<usize> = (0..landscape.nodes.len())
            .filter(|&i| projected[i].is_visible())
            .collect();
        order.sort_by(|&a, &b| projected[b].depth.total_cmp(&projected[a].depth));

        for i in order {
            let node = &landscape.nodes[i];
            let p = projected[i];
            let act = node.activation;
            let radius = node.size * (1.0 + act) * p.scale;
            let base = node_color(node.kind);

            if act > self.glow_threshold {
                surface.glow(p.x, p.y, radius * 2.5, base.with_alpha(act * 0.6));
                stats.glows_drawn += 1;
            }
            surface.fill_circle(p.x, p.y, radius, base.mix(Rgba::WHITE, act * 0.6));
            stats.nodes_drawn += 1;
        }

        for region in &landscape.regions {
            let p = project(region.center, rotation, &view);
            if !p.is_visible() {
                continue;
            }
            let r = region.radius * p.scale;
            surface.dashed_circle(p.x, p.y, r, self.accent.with_alpha(0.5), 6.0);
            surface.text(p.x, p.y - r - 6.0, &region.category, self.accent.with_alpha(0.85));
            stats.regions_drawn += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landscape::{Connection, Node, Region};
    use crate::prng::Prng;
    use crate::projection::Vec3;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn node(id: u32, pos: Vec3, activation: f32) -> Node {
        Node {
            id,
            position: pos,
            size: 5.0,
            activation,
            kind: NodeKind::Processing,
            connection_ids: Vec::new(),
            memory_strength: 0.5,
            plasticity: 0.5,
            resonant_frequency: 5.0,
        }
    }

    fn edge(from: u32, to: u32, activation: f32, myelination: bool) -> Connection {
        Connection {
            from,
            to,
            strength: 1.0,
            conductivity: 1.0,
            myelination,
            kind: ConnectionKind::Excitatory,
            activation,
        }
    }

    fn two_node_landscape(edge_activation: f32) -> Landscape {
        Landscape {
            nodes: vec![
                node(0, Vec3::new(-50.0, 0.0, 100.0), 0.0),
                node(1, Vec3::new(50.0, 0.0, 100.0), 0.0),
            ],
            connections: vec![edge(0, 1, edge_activation, true)],
            ..Default::default()
        }
    }

    fn renderer() -> Renderer {
        Renderer::new(&LandscapeConfig::default(), Mode::NeuralGalaxy)
    }

    #[test]
    fn edges_at_or_below_threshold_are_never_drawn() {
        for act in [0.0, 0.05, 0.1] {
            let mut s = RecordingSurface::new(800.0, 600.0);
            let stats = renderer().render(&mut s, &two_node_landscape(act), Rotation::default());
            assert_eq!(stats.edges_drawn, 0);
            assert_eq!(s.count(|c| matches!(c, DrawCommand::Line { .. })), 0);
        }
    }

    #[test]
    fn edges_above_threshold_are_drawn_with_weight() {
        let mut s = RecordingSurface::new(800.0, 600.0);
        let stats = renderer().render(&mut s, &two_node_landscape(0.11), Rotation::default());
        assert_eq!(stats.edges_drawn, 1);
        let line = s
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Line { width, color, .. } => Some((*width, *color)),
                _ => None,
            })
            .unwrap();
        assert_eq!(line.0, 2.0);
        assert!((line.1.a - 0.11).abs() < 1e-6);
    }

    #[test]
    fn frame_starts_with_background_clear() {
        let mut s = RecordingSurface::new(320.0, 200.0);
        renderer().render(&mut s, &Landscape::default(), Rotation::default());
        assert_eq!(s.commands().first(), Some(&DrawCommand::Clear { color: BACKGROUND }));
    }

    #[test]
    fn glow_only_above_threshold() {
        let mut l = two_node_landscape(0.0);
        l.nodes[0].activation = 0.3;
        l.nodes[1].activation = 0.31;
        let mut s = RecordingSurface::new(800.0, 600.0);
        let stats = renderer().render(&mut s, &l, Rotation::default());
        assert_eq!(stats.nodes_drawn, 2);
        assert_eq!(stats.glows_drawn, 1);
    }

    #[test]
    fn node_radius_scales_with_activation_and_depth() {
        let mut l = two_node_landscape(0.0);
        l.nodes.truncate(1);
        l.connections.clear();
        l.nodes[0].position = Vec3::new(0.0, 0.0, 800.0);
        l.nodes[0].activation = 1.0;
        let mut s = RecordingSurface::new(800.0, 600.0);
        renderer().render(&mut s, &l, Rotation::default());
        let r = s
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillCircle { radius, .. } => Some(*radius),
                _ => None,
            })
            .unwrap();
        // size 5, activation 1, scale 800 / (800 + 800).
        assert!((r - 5.0).abs() < 1e-4);
    }

    #[test]
    fn nodes_behind_viewer_are_culled_with_their_edges() {
        for z in [-100.0, -1000.0, 0.0] {
            let mut l = two_node_landscape(0.9);
            l.nodes[1].position = Vec3::new(50.0, 0.0, z);
            let mut s = RecordingSurface::new(800.0, 600.0);
            let stats = renderer().render(&mut s, &l, Rotation::default());
            assert_eq!(stats.nodes_drawn, 1, "z = {z}");
            assert_eq!(stats.edges_drawn, 0, "z = {z}");
        }
    }

    #[test]
    fn single_node_behind_viewer_draws_nothing() {
        let mut l = two_node_landscape(0.0);
        l.nodes.truncate(1);
        l.connections.clear();
        l.nodes[0].position = Vec3::new(0.0, 0.0, -100.0);
        l.nodes[0].activation = 0.9;
        let mut s = RecordingSurface::new(800.0, 600.0);
        let stats = renderer().render(&mut s, &l, Rotation::default());
        assert_eq!(stats, FrameStats::default());
        assert_eq!(s.commands().len(), 1);
    }

    #[test]
    fn regions_behind_viewer_are_skipped() {
        let mut l = Landscape::default();
        for z in [120.0, -120.0] {
            l.regions.push(Region {
                center: Vec3::new(0.0, 0.0, z),
                radius: 60.0,
                category: "spatial".to_string(),
                strength: 0.5,
                accessibility: 0.5,
            });
        }
        let mut s = RecordingSurface::new(800.0, 600.0);
        let stats = renderer().render(&mut s, &l, Rotation::default());
        assert_eq!(stats.regions_drawn, 1);
    }

    #[test]
    fn regions_draw_dashed_circle_and_label() {
        let mut l = Landscape::default();
        l.regions.push(Region {
            center: Vec3::new(0.0, 0.0, 50.0),
            radius: 0.0,
            category: "episodic".to_string(),
            strength: 0.5,
            accessibility: 0.5,
        });
        let mut s = RecordingSurface::new(800.0, 600.0);
        let stats = renderer().render(&mut s, &l, Rotation::default());
        assert_eq!(stats.regions_drawn, 1);
        assert_eq!(s.count(|c| matches!(c, DrawCommand::DashedCircle { .. })), 1);
        assert!(s
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "episodic")));
    }

    #[test]
    fn rendering_is_idempotent() {
        let spec = crate::landscape::GeneratorSpec::for_mode(
            Mode::MemoryPathways,
            &LandscapeConfig::default(),
        );
        let mut l = Landscape::generate(&spec, &mut Prng::new(31));
        for c in l.connections.iter_mut() {
            c.activation = 0.5;
        }
        let rot = Rotation::new(0.15, -0.2);
        let mut a = RecordingSurface::new(1024.0, 768.0);
        let mut b = RecordingSurface::new(1024.0, 768.0);
        let r = renderer();
        let first = r.render(&mut a, &l, rot);
        let second = r.render(&mut a, &l, rot);
        let other = r.render(&mut b, &l, rot);
        assert_eq!(first, second);
        assert_eq!(first, other);
        assert!(first.edges_drawn > 0);
        assert_eq!(a.commands(), b.commands());
    }

    #[test]
    fn hex_parsing_and_mixing() {
        assert_eq!(Rgba::from_hex("#f59e0b"), Some(Rgba::rgb(0xf5, 0x9e, 0x0b)));
        assert_eq!(Rgba::from_hex("f59e0b"), None);
        assert_eq!(Rgba::from_hex("#xyz123"), None);
        let m = Rgba::rgb(0, 0, 0).mix(Rgba::WHITE, 0.5);
        assert_eq!((m.r, m.g, m.b), (128, 128, 128));
        assert_eq!(Rgba::rgb(1, 2, 3).with_alpha(0.5).to_string(), "rgba(1, 2, 3, 0.500)");
    }
}
