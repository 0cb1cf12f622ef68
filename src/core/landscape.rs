use core::fmt;

use hashbrown::HashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{LandscapeConfig, Mode};
use crate::prng::Prng;
use crate::projection::Vec3;

pub type NodeId = u32;

/// Functional role of a node, fixed by its ordinal position in a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    Sensory,
    Processing,
    Integration,
    Output,
}

impl NodeKind {
    /// First 30% sensory, next 30% processing, next 25% integration, rest output.
    pub fn for_ordinal(index: usize, count: usize) -> Self {
        let count = count.max(1);
        let pct = index * 100;
        if pct < 30 * count {
            NodeKind::Sensory
        } else if pct < 60 * count {
            NodeKind::Processing
        } else if pct < 85 * count {
            NodeKind::Integration
        } else {
            NodeKind::Output
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionKind {
    Excitatory,
    Inhibitory,
    Modulatory,
}

impl ConnectionKind {
    const ALL: [ConnectionKind; 3] = [
        ConnectionKind::Excitatory,
        ConnectionKind::Inhibitory,
        ConnectionKind::Modulatory,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PatternKind {
    Wave,
    Spiral,
    Burst,
    Ripple,
    Cascade,
}

impl PatternKind {
    const ALL: [PatternKind; 5] = [
        PatternKind::Wave,
        PatternKind::Spiral,
        PatternKind::Burst,
        PatternKind::Ripple,
        PatternKind::Cascade,
    ];
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub position: Vec3,
    /// Base render radius.
    pub size: f32,
    /// Always in [0,1].
    pub activation: f32,
    pub kind: NodeKind,
    /// Outgoing neighbors, in the order the edges were accepted.
    pub connection_ids: Vec<NodeId>,
    pub memory_strength: f32,
    /// Smoothing factor for how fast `activation` tracks new stimulus.
    pub plasticity: f32,
    /// In [1,11]; matched against signal band frequencies.
    pub resonant_frequency: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionId {
    pub from: NodeId,
    pub to: NodeId,
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    pub strength: f32,
    pub conductivity: f32,
    /// Render weight only.
    pub myelination: bool,
    /// Render color only; dynamics do not branch on it.
    pub kind: ConnectionKind,
    pub activation: f32,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        ConnectionId {
            from: self.from,
            to: self.to,
        }
    }
}

/// Decorative overlay of the memory preset. No effect on dynamics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub center: Vec3,
    pub radius: f32,
    pub category: String,
    pub strength: f32,
    pub accessibility: f32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivationPattern {
    pub name: String,
    pub node_ids: Vec<NodeId>,
    pub kind: PatternKind,
    pub frequency: f32,
    pub amplitude: f32,
    pub phase: f32,
}

pub const REGION_CATEGORIES: [&str; 5] =
    ["episodic", "semantic", "procedural", "spatial", "emotional"];

/// Everything the generator needs; normally derived from a mode and a config.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSpec {
    pub node_count: usize,
    pub connection_density: f32,
    pub locality_threshold: f32,
    pub world_extent: [f32; 3],
    pub pattern_count: usize,
    pub pattern_size: usize,
    /// Zero for presets without regions.
    pub region_count: usize,
}

impl GeneratorSpec {
    pub fn for_mode(mode: Mode, cfg: &LandscapeConfig) -> Self {
        let preset = mode.preset();
        Self {
            node_count: preset.node_count,
            connection_density: preset.connection_density,
            locality_threshold: cfg.locality_threshold,
            world_extent: cfg.world_extent,
            pattern_count: cfg.pattern_count,
            pattern_size: cfg.pattern_size,
            region_count: if preset.has_regions {
                cfg.region_count
            } else {
                0
            },
        }
    }

    /// Candidate edges tried per node before locality filtering.
    pub fn attempts_per_node(&self) -> usize {
        let a = self.connection_density.max(0.0) * self.node_count as f32 * 0.1;
        a.floor() as usize
    }

    /// Nodes per pattern group; shrinks for small graphs so groups never overlap.
    pub fn pattern_group_size(&self) -> usize {
        if self.pattern_count == 0 {
            return 0;
        }
        (self.node_count / self.pattern_count).min(self.pattern_size)
    }
}

/// One complete generation of the graph. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landscape {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub regions: Vec<Region>,
    pub patterns: Vec<ActivationPattern>,
}

impl Landscape {
    pub fn generate(spec: &GeneratorSpec, rng: &mut Prng) -> Self {
        let n = spec.node_count;
        let [ex, ey, ez] = spec.world_extent;

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            nodes.push(Node {
                id: i as NodeId,
                position: Vec3::new(
                    rng.gen_range_f32(-ex, ex),
                    rng.gen_range_f32(-ey, ey),
                    rng.gen_range_f32(-ez, ez),
                ),
                size: rng.gen_range_f32(3.0, 8.0),
                activation: rng.gen_range_f32(0.0, 0.5),
                kind: NodeKind::for_ordinal(i, n),
                connection_ids: Vec::new(),
                memory_strength: rng.next_f32_01(),
                plasticity: rng.next_f32_01(),
                resonant_frequency: rng.gen_range_f32(1.0, 11.0),
            });
        }

        // Local wiring only: long-range candidates are dropped, never rerouted.
        let attempts = spec.attempts_per_node();
        let mut connections = Vec::new();
        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        if n >= 2 {
            for i in 0..n {
                for _ in 0..attempts {
                    let mut j = rng.gen_range_usize(0, n - 1);
                    if j >= i {
                        j += 1;
                    }
                    let d = nodes[i].position.distance(nodes[j].position);
                    if d >= spec.locality_threshold {
                        continue;
                    }
                    let (a, b) = (i as NodeId, j as NodeId);
                    let key = (a.min(b), a.max(b));
                    if !seen.insert(key) {
                        continue;
                    }
                    let kind = *rng
                        .choose(&ConnectionKind::ALL)
                        .unwrap_or(&ConnectionKind::Excitatory);
                    connections.push(Connection {
                        from: a,
                        to: b,
                        strength: rng.next_f32_01(),
                        conductivity: rng.next_f32_01(),
                        myelination: rng.next_f32_01() < 0.5,
                        kind,
                        activation: 0.0,
                    });
                    nodes[i].connection_ids.push(b);
                }
            }
        }

        let group = spec.pattern_group_size();
        let mut patterns = Vec::with_capacity(spec.pattern_count);
        for p in 0..spec.pattern_count {
            let start = p * group;
            let node_ids = (start..start + group).map(|i| i as NodeId).collect();
            let kind = *rng.choose(&PatternKind::ALL).unwrap_or(&PatternKind::Wave);
            patterns.push(ActivationPattern {
                name: format!("pattern-{p}"),
                node_ids,
                kind,
                frequency: rng.gen_range_f32(0.5, 4.0),
                amplitude: rng.gen_range_f32(0.2, 1.0),
                phase: rng.gen_range_f32(0.0, core::f32::consts::TAU),
            });
        }

        let region_count = spec.region_count.min(REGION_CATEGORIES.len());
        let mut regions = Vec::with_capacity(region_count);
        for category in REGION_CATEGORIES.iter().take(region_count) {
            regions.push(Region {
                center: Vec3::new(
                    rng.gen_range_f32(-ex * 0.8, ex * 0.8),
                    rng.gen_range_f32(-ey * 0.8, ey * 0.8),
                    rng.gen_range_f32(-ez * 0.8, ez * 0.8),
                ),
                radius: rng.gen_range_f32(40.0, 120.0),
                category: category.to_string(),
                strength: rng.next_f32_01(),
                accessibility: rng.next_f32_01(),
            });
        }

        Self {
            nodes,
            connections,
            regions,
            patterns,
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn active_node_count(&self, threshold: f32) -> usize {
        self.nodes.iter().filter(|n| n.activation > threshold).count()
    }

    pub fn active_connection_count(&self, threshold: f32) -> usize {
        self.connections
            .iter()
            .filter(|c| c.activation > threshold)
            .count()
    }

    pub fn mean_activation(&self) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(|n| n.activation).sum::<f32>() / self.nodes.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_for(mode: Mode) -> GeneratorSpec {
        GeneratorSpec::for_mode(mode, &LandscapeConfig::default())
    }

    #[test]
    fn node_count_is_exact_for_every_mode() {
        for mode in Mode::ALL {
            let spec = spec_for(mode);
            let l = Landscape::generate(&spec, &mut Prng::new(11));
            assert_eq!(l.node_count(), mode.preset().node_count, "{mode}");
            for (i, n) in l.nodes.iter().enumerate() {
                assert_eq!(n.id as usize, i);
            }
        }
    }

    #[test]
    fn edges_reference_existing_nodes_and_stay_local() {
        for seed in [1u64, 2, 3, 99, 12345] {
            let spec = spec_for(Mode::NeuralGalaxy);
            let l = Landscape::generate(&spec, &mut Prng::new(seed));
            assert!(l.connection_count() > 0);
            for c in &l.connections {
                let a = l.node(c.from).expect("from exists");
                let b = l.node(c.to).expect("to exists");
                assert_ne!(c.from, c.to);
                assert!(a.position.distance(b.position) < spec.locality_threshold);
                assert!(a.connection_ids.contains(&c.to));
            }
        }
    }

    #[test]
    fn no_duplicate_pairs_in_either_direction() {
        let l = Landscape::generate(&spec_for(Mode::MemoryPathways), &mut Prng::new(5));
        let mut pairs = HashSet::new();
        for c in &l.connections {
            assert!(pairs.insert((c.from.min(c.to), c.from.max(c.to))));
        }
    }

    #[test]
    fn cognitive_maze_out_degree_bounded_by_attempts() {
        let spec = spec_for(Mode::CognitiveMaze);
        assert_eq!(spec.attempts_per_node(), 5);
        let l = Landscape::generate(&spec, &mut Prng::new(8));
        assert_eq!(l.node_count(), 100);
        for n in &l.nodes {
            assert!(n.connection_ids.len() <= 5);
        }
        assert!(l.connection_count() <= 500);
    }

    #[test]
    fn tiny_locality_threshold_prunes_everything() {
        let mut spec = spec_for(Mode::CognitiveMaze);
        spec.locality_threshold = 0.001;
        let l = Landscape::generate(&spec, &mut Prng::new(3));
        assert_eq!(l.connection_count(), 0);
        assert!(l.nodes.iter().all(|n| n.connection_ids.is_empty()));
    }

    #[test]
    fn kinds_follow_ordinal_buckets() {
        assert_eq!(NodeKind::for_ordinal(0, 100), NodeKind::Sensory);
        assert_eq!(NodeKind::for_ordinal(29, 100), NodeKind::Sensory);
        assert_eq!(NodeKind::for_ordinal(30, 100), NodeKind::Processing);
        assert_eq!(NodeKind::for_ordinal(59, 100), NodeKind::Processing);
        assert_eq!(NodeKind::for_ordinal(60, 100), NodeKind::Integration);
        assert_eq!(NodeKind::for_ordinal(84, 100), NodeKind::Integration);
        assert_eq!(NodeKind::for_ordinal(85, 100), NodeKind::Output);
        assert_eq!(NodeKind::for_ordinal(99, 100), NodeKind::Output);
    }

    #[test]
    fn attributes_stay_in_their_ranges() {
        let l = Landscape::generate(&spec_for(Mode::SynapticForest), &mut Prng::new(21));
        for n in &l.nodes {
            assert!((3.0..=8.0).contains(&n.size));
            assert!((0.0..=1.0).contains(&n.activation));
            assert!((0.0..=1.0).contains(&n.plasticity));
            assert!((0.0..=1.0).contains(&n.memory_strength));
            assert!((1.0..=11.0).contains(&n.resonant_frequency));
            assert!(n.position.x.abs() <= 400.0);
            assert!(n.position.y.abs() <= 300.0);
            assert!(n.position.z.abs() <= 200.0);
        }
        for c in &l.connections {
            assert!((0.0..=1.0).contains(&c.strength));
            assert!((0.0..=1.0).contains(&c.conductivity));
            assert_eq!(c.activation, 0.0);
        }
    }

    #[test]
    fn patterns_are_ten_disjoint_groups_of_valid_ids() {
        let l = Landscape::generate(&spec_for(Mode::MemoryPathways), &mut Prng::new(4));
        assert_eq!(l.patterns.len(), 10);
        let mut seen = HashSet::new();
        for p in &l.patterns {
            assert_eq!(p.node_ids.len(), 15);
            for id in &p.node_ids {
                assert!(l.node(*id).is_some());
                assert!(seen.insert(*id), "node {id} in two patterns");
            }
            // Adjacent ordinals.
            for w in p.node_ids.windows(2) {
                assert_eq!(w[1], w[0] + 1);
            }
        }
    }

    #[test]
    fn small_graphs_shrink_pattern_groups() {
        let mut spec = spec_for(Mode::CognitiveMaze);
        spec.node_count = 42;
        let l = Landscape::generate(&spec, &mut Prng::new(4));
        assert_eq!(l.patterns.len(), 10);
        for p in &l.patterns {
            assert_eq!(p.node_ids.len(), 4);
            assert!(p.node_ids.iter().all(|id| (*id as usize) < 42));
        }
    }

    #[test]
    fn regions_only_for_memory_pathways() {
        let mem = Landscape::generate(&spec_for(Mode::MemoryPathways), &mut Prng::new(6));
        assert_eq!(mem.regions.len(), 5);
        let cats: HashSet<_> = mem.regions.iter().map(|r| r.category.clone()).collect();
        assert_eq!(cats.len(), 5);

        let galaxy = Landscape::generate(&spec_for(Mode::NeuralGalaxy), &mut Prng::new(6));
        assert!(galaxy.regions.is_empty());
    }

    #[test]
    fn region_labels_never_repeat() {
        let mut spec = spec_for(Mode::MemoryPathways);
        spec.region_count = 7;
        let l = Landscape::generate(&spec, &mut Prng::new(6));
        let cats: HashSet<_> = l.regions.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(l.regions.len(), REGION_CATEGORIES.len());
        assert_eq!(cats.len(), l.regions.len());
    }

    #[test]
    fn same_seed_reproduces_layout_and_wiring() {
        let spec = spec_for(Mode::SynapticForest);
        let a = Landscape::generate(&spec, &mut Prng::new(77));
        let b = Landscape::generate(&spec, &mut Prng::new(77));
        assert_eq!(a, b);

        let c = Landscape::generate(&spec, &mut Prng::new(78));
        assert_ne!(a.nodes[0].position, c.nodes[0].position);
    }

    #[test]
    fn single_node_graph_has_no_edges() {
        let mut spec = spec_for(Mode::CognitiveMaze);
        spec.node_count = 1;
        let l = Landscape::generate(&spec, &mut Prng::new(1));
        assert_eq!(l.node_count(), 1);
        assert_eq!(l.connection_count(), 0);
    }

    #[test]
    fn connection_id_formats_as_pair() {
        let id = ConnectionId { from: 3, to: 17 };
        assert_eq!(id.to_string(), "3-17");
    }
}
