use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};
use crate::landscape::REGION_CATEGORIES;

/// The fixed set of landscape presets a host can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Mode {
    #[default]
    MemoryPathways,
    SynapticForest,
    NeuralGalaxy,
    CognitiveMaze,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModePreset {
    pub node_count: usize,
    pub connection_density: f32,
    pub display_name: &'static str,
    /// CSS hex color used for mode overlays.
    pub accent_color: &'static str,
    /// Only the memory preset carries region overlays.
    pub has_regions: bool,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::MemoryPathways,
        Mode::SynapticForest,
        Mode::NeuralGalaxy,
        Mode::CognitiveMaze,
    ];

    pub fn preset(self) -> ModePreset {
        match self {
            Mode::MemoryPathways => ModePreset {
                node_count: 150,
                connection_density: 0.8,
                display_name: "Memory Pathways",
                accent_color: "#8b5cf6",
                has_regions: true,
            },
            Mode::SynapticForest => ModePreset {
                node_count: 200,
                connection_density: 0.6,
                display_name: "Synaptic Forest",
                accent_color: "#22c55e",
                has_regions: false,
            },
            Mode::NeuralGalaxy => ModePreset {
                node_count: 300,
                connection_density: 0.4,
                display_name: "Neural Galaxy",
                accent_color: "#3b82f6",
                has_regions: false,
            },
            Mode::CognitiveMaze => ModePreset {
                node_count: 100,
                connection_density: 0.5,
                display_name: "Cognitive Maze",
                accent_color: "#f59e0b",
                has_regions: false,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::MemoryPathways => "memory-pathways",
            Mode::SynapticForest => "synaptic-forest",
            Mode::NeuralGalaxy => "neural-galaxy",
            Mode::CognitiveMaze => "cognitive-maze",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = LandscapeError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| LandscapeError::UnknownMode(s.to_string()))
    }
}

/// Tunables for generation, projection, rendering and interaction.
///
/// Every field has a default; a JSON config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LandscapeConfig {
    /// Half-extent of the world box per axis; positions are drawn from
    /// `[-e, e]`.
    pub world_extent: [f32; 3],
    /// Edges only join nodes closer than this.
    pub locality_threshold: f32,
    /// Perspective focal distance `D`.
    pub focal_distance: f32,
    /// Radians of rotation per pixel of pointer offset from the center.
    pub rotation_gain: f32,

    pub cascade_radius: f32,
    /// Activation floor applied to nodes inside the cascade radius.
    pub cascade_floor: f32,
    pub cascade_delay_ms: f64,

    /// Edges at or below this activation are not drawn.
    pub edge_draw_threshold: f32,
    /// Nodes above this activation get a glow.
    pub glow_threshold: f32,

    pub pattern_count: usize,
    pub pattern_size: usize,
    pub region_count: usize,

    /// If set, every generation is reproducible.
    pub seed: Option<u64>,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            world_extent: [400.0, 300.0, 200.0],
            locality_threshold: 300.0,
            focal_distance: 800.0,
            rotation_gain: 0.001,
            cascade_radius: 150.0,
            cascade_floor: 0.5,
            cascade_delay_ms: 100.0,
            edge_draw_threshold: 0.1,
            glow_threshold: 0.3,
            pattern_count: 10,
            pattern_size: 15,
            region_count: 5,
            seed: None,
        }
    }
}

impl LandscapeConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_locality_threshold(mut self, threshold: f32) -> Self {
        self.locality_threshold = threshold;
        self
    }

    pub fn with_focal_distance(mut self, d: f32) -> Self {
        self.focal_distance = d;
        self
    }

    pub fn with_cascade(mut self, radius: f32, floor: f32, delay_ms: f64) -> Self {
        self.cascade_radius = radius;
        self.cascade_floor = floor;
        self.cascade_delay_ms = delay_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        fn bad(msg: impl Into<String>) -> Result<()> {
            Err(LandscapeError::InvalidConfig(msg.into()))
        }

        if self
            .world_extent
            .iter()
            .any(|e| !e.is_finite() || *e <= 0.0)
        {
            return bad("world_extent must be finite and > 0 on every axis");
        }
        if !self.locality_threshold.is_finite() || self.locality_threshold <= 0.0 {
            return bad("locality_threshold must be > 0");
        }
        if !self.focal_distance.is_finite() || self.focal_distance <= 0.0 {
            return bad("focal_distance must be > 0");
        }
        if !self.rotation_gain.is_finite() {
            return bad("rotation_gain must be finite");
        }
        if !self.cascade_radius.is_finite() || self.cascade_radius < 0.0 {
            return bad("cascade_radius must be >= 0");
        }
        if !(0.0..=1.0).contains(&self.cascade_floor) {
            return bad("cascade_floor must be in [0,1]");
        }
        if !self.cascade_delay_ms.is_finite() || self.cascade_delay_ms < 0.0 {
            return bad("cascade_delay_ms must be >= 0");
        }
        if !(0.0..=1.0).contains(&self.edge_draw_threshold) {
            return bad("edge_draw_threshold must be in [0,1]");
        }
        if !(0.0..=1.0).contains(&self.glow_threshold) {
            return bad("glow_threshold must be in [0,1]");
        }
        // One distinct category label per region.
        if self.region_count > REGION_CATEGORIES.len() {
            return bad(format!(
                "region_count must be <= {}",
                REGION_CATEGORIES.len()
            ));
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
