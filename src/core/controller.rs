//! Landscape lifecycle: the single owner of graph state.
//!
//! Frame callbacks, signal pushes and pointer events all arrive on the host's
//! one event thread and enter through the narrow methods below. Nothing else
//! holds a mutable reference to the landscape.

use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::{ActivationEngine, SignalFrame};
use crate::config::{LandscapeConfig, Mode};
use crate::error::Result;
use crate::interaction::InteractionController;
use crate::landscape::{GeneratorSpec, Landscape, Node, NodeId};
use crate::prng::Prng;
use crate::projection::{Rotation, Viewport};
use crate::render::{FrameStats, Renderer, Surface};
use crate::schedule::{CascadeQueue, FrameHandle, FrameScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ControllerState {
    Idle,
    Running,
}

/// Called once per node hit by a click, before its cascade is scheduled.
///
/// `Send + Sync` keeps the controller shareable behind `Arc<RwLock<_>>` in
/// threaded hosts such as the daemon. Single-threaded hosts that want to
/// collect hits should capture `Arc<Mutex<_>>` or atomics, not `Rc<RefCell<_>>`.
pub type ActivationListener = Box<dyn FnMut(&Node) + Send + Sync>;

/// Surface size assumed for pointer mapping until a surface is attached.
const DEFAULT_VIEW_SIZE: (f32, f32) = (800.0, 600.0);

pub struct LandscapeController<S: Surface, F: FrameScheduler> {
    cfg: LandscapeConfig,
    mode: Mode,
    rng: Prng,

    landscape: Landscape,
    generation: u64,
    rotation: Rotation,

    state: ControllerState,
    surface: Option<S>,
    view_size: (f32, f32),
    scheduler: F,
    frame: Option<FrameHandle>,
    cascades: CascadeQueue,

    engine: ActivationEngine,
    interaction: InteractionController,
    renderer: Renderer,
    listener: Option<ActivationListener>,

    frames_rendered: u64,
    frames_skipped: u64,
    ticks_applied: u64,
    last_frame: FrameStats,
}

impl<S: Surface, F: FrameScheduler> LandscapeController<S, F> {
    /// Validate `cfg` and build the first generation for `mode`. Starts idle.
    pub fn new(cfg: LandscapeConfig, mode: Mode, scheduler: F) -> Result<Self> {
        if let Err(e) = cfg.validate() {
            warn!("rejected landscape config: {}", e);
            return Err(e);
        }
        let mut rng = Prng::seeded_or_time(cfg.seed);
        let landscape = Landscape::generate(&GeneratorSpec::for_mode(mode, &cfg), &mut rng);
        info!(
            mode = %mode,
            nodes = landscape.node_count(),
            edges = landscape.connection_count(),
            "landscape generated"
        );

        Ok(Self {
            engine: ActivationEngine::default(),
            interaction: InteractionController::from_config(&cfg),
            renderer: Renderer::new(&cfg, mode),
            cfg,
            mode,
            rng,
            landscape,
            generation: 1,
            rotation: Rotation::default(),
            state: ControllerState::Idle,
            surface: None,
            view_size: DEFAULT_VIEW_SIZE,
            scheduler,
            frame: None,
            cascades: CascadeQueue::new(),
            listener: None,
            frames_rendered: 0,
            frames_skipped: 0,
            ticks_applied: 0,
            last_frame: FrameStats::default(),
        })
    }

    pub fn set_activation_listener(&mut self, listener: impl FnMut(&Node) + Send + Sync + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_activation_listener(&mut self) {
        self.listener = None;
    }

    // ---- lifecycle -------------------------------------------------------

    /// `idle -> running`: take the surface and schedule the first frame.
    ///
    /// If already running, the surface is swapped in place and the old one
    /// dropped; use `replace_surface` to get it back. On scheduler failure
    /// the surface is dropped again and the controller stays idle.
    pub fn start(&mut self, surface: S) -> Result<()> {
        if self.state == ControllerState::Running {
            let (w, h) = (surface.width(), surface.height());
            if self.replace_surface(surface).is_some() {
                debug!(width = w, height = h, "start while running; previous surface dropped");
            }
            return Ok(());
        }

        self.view_size = (surface.width(), surface.height());
        self.surface = Some(surface);
        match self.scheduler.request_frame() {
            Ok(h) => {
                self.frame = Some(h);
                self.state = ControllerState::Running;
                info!(mode = %self.mode, generation = self.generation, "landscape started");
                Ok(())
            }
            Err(e) => {
                self.surface = None;
                warn!("landscape start failed: {}", e);
                Err(e)
            }
        }
    }

    /// `running -> idle`: cancel the pending frame and every pending cascade,
    /// then hand back the surface. Graph state is kept, so a later `start`
    /// resumes without regenerating.
    pub fn stop(&mut self) -> Option<S> {
        if let Some(h) = self.frame.take() {
            self.scheduler.cancel_frame(h);
        }
        let dropped = self.cascades.cancel_all();
        if self.state == ControllerState::Running {
            info!(cancelled_cascades = dropped, "landscape stopped");
        }
        self.state = ControllerState::Idle;
        self.surface.take()
    }

    /// Swap in a new surface (host resize). Returns the previous one.
    pub fn replace_surface(&mut self, surface: S) -> Option<S> {
        self.view_size = (surface.width(), surface.height());
        self.surface.replace(surface)
    }

    /// Drop the surface without stopping; frames are skipped until a new one arrives.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    // ---- mutation entry points ---------------------------------------

    /// Switch preset and regenerate. The frame loop is not interrupted.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        info!(from = %self.mode, to = %mode, "mode change");
        self.mode = mode;
        self.renderer = Renderer::new(&self.cfg, mode);
        self.regenerate();
    }

    /// Replace every node, edge, region and pattern with a fresh generation.
    pub fn regenerate(&mut self) {
        let spec = GeneratorSpec::for_mode(self.mode, &self.cfg);
        self.landscape = Landscape::generate(&spec, &mut self.rng);
        self.generation += 1;
        info!(
            mode = %self.mode,
            generation = self.generation,
            nodes = self.landscape.node_count(),
            edges = self.landscape.connection_count(),
            "landscape regenerated"
        );
    }

    /// Feed one signal frame. `None` leaves activations untouched.
    pub fn apply_tick(&mut self, frame: Option<&SignalFrame>, now_ms: f64) -> bool {
        let applied = self.engine.apply(&mut self.landscape, frame, now_ms);
        if applied {
            self.ticks_applied += 1;
        }
        applied
    }

    /// Immediate cascade around `origin`. Returns nodes reached.
    pub fn apply_cascade(&mut self, origin: NodeId) -> usize {
        self.interaction.cascade(&mut self.landscape, origin)
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    // ---- pointer events --------------------------------------------------

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Rotation {
        let view = self.viewport();
        self.rotation = self.interaction.rotation_for_pointer(x, y, &view);
        self.rotation
    }

    /// Hit-test a click, notify the listener per hit, and queue one delayed
    /// cascade per hit. Cascades are only queued while running.
    pub fn click(&mut self, x: f32, y: f32, now_ms: f64) -> Vec<NodeId> {
        let view = self.viewport();
        let hits = self
            .interaction
            .hit_test(&self.landscape, self.rotation, &view, x, y);
        debug!(x, y, hits = hits.len(), "click");

        for &id in &hits {
            if let (Some(listener), Some(node)) = (self.listener.as_mut(), self.landscape.node(id)) {
                listener(node);
            }
            if self.state == ControllerState::Running {
                self.cascades
                    .schedule(id, self.generation, now_ms + self.cfg.cascade_delay_ms);
            }
        }
        hits
    }

    /// Fire cascades that are due. Entries from an older generation are dropped.
    pub fn advance(&mut self, now_ms: f64) -> usize {
        if self.state != ControllerState::Running {
            return 0;
        }
        let mut fired = 0;
        for pending in self.cascades.take_due(now_ms) {
            if pending.generation != self.generation {
                debug!(origin = pending.origin, "dropping cascade from a previous generation");
                continue;
            }
            self.interaction.cascade(&mut self.landscape, pending.origin);
            fired += 1;
        }
        fired
    }

    /// Frame callback from the scheduler: fire due cascades, draw, and
    /// schedule the next frame. Returns `None` when nothing was drawn.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<FrameStats> {
        if self.state != ControllerState::Running {
            return None;
        }
        self.frame = None;
        self.advance(now_ms);

        let stats = match self.surface.as_mut() {
            Some(surface) => {
                let stats = self.renderer.render(surface, &self.landscape, self.rotation);
                self.frames_rendered += 1;
                self.last_frame = stats;
                Some(stats)
            }
            None => {
                self.frames_skipped += 1;
                debug!("no drawing surface; frame skipped");
                None
            }
        };

        match self.scheduler.request_frame() {
            Ok(h) => self.frame = Some(h),
            Err(e) => {
                warn!("could not schedule next frame: {}", e);
                self.stop();
            }
        }
        stats
    }

    // ---- read-only accessors -------------------------------------------

    fn viewport(&self) -> Viewport {
        Viewport::new(self.view_size.0, self.view_size.1, self.cfg.focal_distance)
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &LandscapeConfig {
        &self.cfg
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn pending_cascades(&self) -> usize {
        self.cascades.len()
    }

    pub fn active_node_count(&self) -> usize {
        self.landscape.active_node_count(self.cfg.glow_threshold)
    }

    pub fn active_connection_count(&self) -> usize {
        self.landscape
            .active_connection_count(self.cfg.edge_draw_threshold)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }
}

impl<S: Surface, F: FrameScheduler> Drop for LandscapeController<S, F> {
    fn drop(&mut self) {
        if self.state == ControllerState::Running {
            self.stop();
        }
    }
}
