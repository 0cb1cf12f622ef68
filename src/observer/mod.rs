use crate::config::Mode;
use crate::controller::{ControllerState, LandscapeController};
use crate::projection::Rotation;
use crate::render::{FrameStats, Surface};
use crate::schedule::FrameScheduler;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A read-only snapshot of what the landscape is doing, for dashboards.
///
/// Design intent:
/// - Observers cannot mutate the graph or steer the frame loop.
/// - Snapshotting is on-demand and cheap; nothing is cached between calls.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LandscapeSnapshot {
    pub mode: Mode,
    pub display_name: String,
    pub state: ControllerState,
    pub generation: u64,

    pub node_count: usize,
    pub connection_count: usize,
    pub region_count: usize,
    pub pattern_count: usize,

    /// Nodes above the glow threshold.
    pub active_nodes: usize,
    /// Edges above the draw threshold.
    pub active_connections: usize,
    pub mean_activation: f32,

    pub rotation: Rotation,
    pub pending_cascades: usize,
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub ticks_applied: u64,
    pub last_frame: FrameStats,
}

pub struct LandscapeAdapter<'a, S: Surface, F: FrameScheduler> {
    controller: &'a LandscapeController<S, F>,
}

impl<'a, S: Surface, F: FrameScheduler> LandscapeAdapter<'a, S, F> {
    pub fn new(controller: &'a LandscapeController<S, F>) -> Self {
        Self { controller }
    }

    pub fn snapshot(&self) -> LandscapeSnapshot {
        let c = self.controller;
        let l = c.landscape();
        LandscapeSnapshot {
            mode: c.mode(),
            display_name: c.mode().preset().display_name.to_string(),
            state: c.state(),
            generation: c.generation(),

            node_count: l.node_count(),
            connection_count: l.connection_count(),
            region_count: l.regions.len(),
            pattern_count: l.patterns.len(),

            active_nodes: c.active_node_count(),
            active_connections: c.active_connection_count(),
            mean_activation: l.mean_activation(),

            rotation: c.rotation(),
            pending_cascades: c.pending_cascades(),
            frames_rendered: c.frames_rendered(),
            frames_skipped: c.frames_skipped(),
            ticks_applied: c.ticks_applied(),
            last_frame: c.last_frame(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LandscapeConfig;
    use crate::schedule::ManualScheduler;
    use crate::surface::RecordingSurface;

    #[test]
    fn snapshot_reflects_controller() {
        let cfg = LandscapeConfig::default().with_seed(3);
        let mut c: LandscapeController<RecordingSurface, ManualScheduler> =
            LandscapeController::new(cfg, Mode::MemoryPathways, ManualScheduler::new()).unwrap();
        c.start(RecordingSurface::new(640.0, 480.0)).unwrap();
        c.scheduler_mut().take_pending();
        c.on_frame(0.0);

        let snap = LandscapeAdapter::new(&c).snapshot();
        assert_eq!(snap.mode, Mode::MemoryPathways);
        assert_eq!(snap.display_name, "Memory Pathways");
        assert_eq!(snap.state, ControllerState::Running);
        assert_eq!(snap.node_count, 150);
        assert_eq!(snap.region_count, 5);
        assert_eq!(snap.pattern_count, 10);
        assert_eq!(snap.frames_rendered, 1);
        let in_front = c.landscape().nodes.iter().filter(|n| n.position.z > 0.0).count();
        assert_eq!(snap.last_frame.nodes_drawn, in_front);
        assert!(snap.active_nodes <= snap.node_count);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_with_kebab_mode() {
        let cfg = LandscapeConfig::default().with_seed(3);
        let c: LandscapeController<RecordingSurface, ManualScheduler> =
            LandscapeController::new(cfg, Mode::CognitiveMaze, ManualScheduler::new()).unwrap();
        let json = serde_json::to_string(&LandscapeAdapter::new(&c).snapshot()).unwrap();
        assert!(json.contains("\"mode\":\"cognitive-maze\""));
        assert!(json.contains("\"state\":\"idle\""));
    }
}
