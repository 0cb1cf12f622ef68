use crate::config::LandscapeConfig;
use crate::landscape::{Landscape, NodeId};
use crate::projection::{project, Rotation, Viewport};

/// Pointer mapping, hit-testing and click cascades.
///
/// Hit-testing re-projects every node with the current rotation and compares
/// screen distances; there is no inverse projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionController {
    pub rotation_gain: f32,
    pub cascade_radius: f32,
    pub cascade_floor: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::from_config(&LandscapeConfig::default())
    }
}

impl InteractionController {
    pub fn from_config(cfg: &LandscapeConfig) -> Self {
        Self {
            rotation_gain: cfg.rotation_gain,
            cascade_radius: cfg.cascade_radius,
            cascade_floor: cfg.cascade_floor,
        }
    }

    /// Absolute mapping: the same pointer position always yields the same rotation.
    pub fn rotation_for_pointer(&self, x: f32, y: f32, view: &Viewport) -> Rotation {
        Rotation {
            x: (y - view.center_y) * self.rotation_gain,
            y: (x - view.center_x) * self.rotation_gain,
        }
    }

    /// Every node whose projection lies within `size * (1 + activation)` of the click.
    /// Culled nodes are tested too, so a click on any node's own projection hits it.
    pub fn hit_test(
        &self,
        landscape: &Landscape,
        rotation: Rotation,
        view: &Viewport,
        x: f32,
        y: f32,
    ) -> Vec<NodeId> {
        landscape
            .nodes
            .iter()
            .filter(|node| {
                let p = project(node.position, rotation, view);
                p.distance_to(x, y) < node.size * (1.0 + node.activation)
            })
            .map(|node| node.id)
            .collect()
    }

    /// Raise every node within the world-space radius of `origin` to at least
    /// the cascade floor. Returns how many nodes were inside the radius.
    pub fn cascade(&self, landscape: &mut Landscape, origin: NodeId) -> usize {
        apply_cascade(landscape, origin, self.cascade_radius, self.cascade_floor)
    }
}

pub fn apply_cascade(landscape: &mut Landscape, origin: NodeId, radius: f32, floor: f32) -> usize {
    let Some(center) = landscape.node(origin).map(|n| n.position) else {
        return 0;
    };
    let mut reached = 0;
    for node in landscape.nodes.iter_mut() {
        if node.position.distance(center) < radius {
            node.activation = node.activation.max(floor);
            reached += 1;
        }
    }
    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::landscape::GeneratorSpec;
    use crate::prng::Prng;
    use crate::projection::Vec3;

    fn view() -> Viewport {
        Viewport::new(1000.0, 700.0, 800.0)
    }

    fn landscape(mode: Mode, seed: u64) -> Landscape {
        let spec = GeneratorSpec::for_mode(mode, &LandscapeConfig::default());
        Landscape::generate(&spec, &mut Prng::new(seed))
    }

    #[test]
    fn pointer_maps_directly_to_rotation() {
        let ic = InteractionController::default();
        let v = view();
        assert_eq!(ic.rotation_for_pointer(500.0, 350.0, &v), Rotation::new(0.0, 0.0));
        let r = ic.rotation_for_pointer(700.0, 250.0, &v);
        assert!((r.x - (-0.1)).abs() < 1e-6);
        assert!((r.y - 0.2).abs() < 1e-6);
        // Not cumulative.
        assert_eq!(r, ic.rotation_for_pointer(700.0, 250.0, &v));
    }

    #[test]
    fn clicking_a_projected_node_hits_it() {
        let ic = InteractionController::default();
        let v = view();
        let mut rng = Prng::new(99);
        for seed in [1u64, 2, 3] {
            let l = landscape(Mode::NeuralGalaxy, seed);
            let rot = Rotation::new(rng.gen_range_f32(-0.35, 0.35), rng.gen_range_f32(-0.5, 0.5));
            for node in &l.nodes {
                let p = project(node.position, rot, &v);
                let hits = ic.hit_test(&l, rot, &v, p.x, p.y);
                assert!(hits.contains(&node.id), "node {} missed", node.id);
            }
        }
    }

    #[test]
    fn exact_click_on_idle_node_hits_and_far_click_misses() {
        let mut l = landscape(Mode::CognitiveMaze, 4);
        l.nodes.truncate(1);
        l.connections.clear();
        l.nodes[0].position = Vec3::new(30.0, -20.0, 10.0);
        l.nodes[0].size = 5.0;
        l.nodes[0].activation = 0.0;

        let ic = InteractionController::default();
        let v = view();
        let rot = Rotation::default();
        let p = project(l.nodes[0].position, rot, &v);
        assert_eq!(ic.hit_test(&l, rot, &v, p.x, p.y), vec![0]);
        assert!(ic.hit_test(&l, rot, &v, p.x + 200.0, p.y).is_empty());
        // Just inside and just outside the unscaled radius.
        assert_eq!(ic.hit_test(&l, rot, &v, p.x + 4.9, p.y).len(), 1);
        assert!(ic.hit_test(&l, rot, &v, p.x + 5.1, p.y).is_empty());
    }

    #[test]
    fn culled_nodes_still_hit_at_their_projection() {
        let mut l = landscape(Mode::CognitiveMaze, 4);
        l.nodes.truncate(1);
        l.connections.clear();
        l.nodes[0].position = Vec3::new(40.0, 25.0, -100.0);
        l.nodes[0].size = 5.0;
        l.nodes[0].activation = 0.0;

        let ic = InteractionController::default();
        let v = view();
        let p = project(l.nodes[0].position, Rotation::default(), &v);
        assert!(!p.is_visible());
        assert_eq!(ic.hit_test(&l, Rotation::default(), &v, p.x, p.y), vec![0]);
    }

    #[test]
    fn activation_widens_the_hit_radius() {
        let mut l = landscape(Mode::CognitiveMaze, 4);
        l.nodes.truncate(1);
        l.nodes[0].position = Vec3::ZERO;
        l.nodes[0].size = 5.0;
        l.nodes[0].activation = 1.0;
        let ic = InteractionController::default();
        let v = view();
        let hits = ic.hit_test(&l, Rotation::default(), &v, v.center_x + 9.0, v.center_y);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn cascade_only_raises_nodes_inside_radius() {
        let ic = InteractionController::default();
        for seed in [5u64, 6, 7] {
            let mut l = landscape(Mode::SynapticForest, seed);
            let before = l.clone();
            let origin = (seed * 13 % 200) as NodeId;
            let center = l.node(origin).unwrap().position;
            let reached = ic.cascade(&mut l, origin);
            assert!(reached >= 1, "origin is always inside its own radius");

            for (old, new) in before.nodes.iter().zip(&l.nodes) {
                if old.position.distance(center) < ic.cascade_radius {
                    assert!(new.activation >= old.activation);
                    assert!(new.activation >= ic.cascade_floor);
                } else {
                    assert_eq!(new.activation, old.activation);
                }
            }
        }
    }

    #[test]
    fn cascade_never_lowers_a_hot_node() {
        let mut l = landscape(Mode::CognitiveMaze, 8);
        for n in l.nodes.iter_mut() {
            n.activation = 0.9;
        }
        InteractionController::default().cascade(&mut l, 0);
        assert!(l.nodes.iter().all(|n| n.activation == 0.9));
    }

    #[test]
    fn cascade_from_unknown_origin_is_a_no_op() {
        let mut l = landscape(Mode::CognitiveMaze, 9);
        let before = l.clone();
        assert_eq!(InteractionController::default().cascade(&mut l, 10_000), 0);
        assert_eq!(before, l);
    }
}
