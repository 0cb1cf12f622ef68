//! Neuroscape Daemon - headless landscape service
//!
//! Keeps one landscape controller alive in the background:
//! - Frame loop at a configurable rate, drawing into an SVG surface
//! - Synthetic five-band signal feed every 100 ms
//! - IPC server for CLI clients (newline-delimited JSON)
//!
//! Storage locations:
//! - Linux: ~/.local/share/neuroscape/
//! - Windows: %APPDATA%\neuroscape\
//! - MacOS: ~/Library/Application Support/neuroscape/

use neuroscape::activation::SignalWalk;
use neuroscape::config::{LandscapeConfig, Mode};
use neuroscape::controller::LandscapeController;
use neuroscape::landscape::NodeId;
use neuroscape::observer::{LandscapeAdapter, LandscapeSnapshot};
use neuroscape::prng::Prng;
use neuroscape::render::Renderer;
use neuroscape::schedule::ManualScheduler;
use neuroscape::surface::SvgSurface;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{error, info, warn};

mod error;
mod paths;

use error::Result;
use paths::AppPaths;

const LISTEN_ADDR: &str = "127.0.0.1:9877";
const SURFACE_SIZE: (f32, f32) = (1280.0, 720.0);
const SIGNAL_PERIOD: Duration = Duration::from_millis(100);
const RECENT_ACTIVATIONS: usize = 16;

// ═══════════════════════════════════════════════════════════════════════════
// Protocol Messages
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Request {
    GetState,
    Start,
    Stop,
    SetMode { mode: String },
    Regenerate,
    PointerMove { x: f32, y: f32 },
    Click { x: f32, y: f32 },
    ExportSvg,
    SetFramerate { fps: u32 },
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Response {
    State(StateSnapshot),
    Success { message: String },
    Error { message: String },
}

impl Response {
    fn ok(message: impl Into<String>) -> Self {
        Response::Success {
            message: message.into(),
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateSnapshot {
    target_fps: u32,
    recent_activations: Vec<NodeId>,
    landscape: LandscapeSnapshot,
}

// ═══════════════════════════════════════════════════════════════════════════
// Daemon State
// ═══════════════════════════════════════════════════════════════════════════

type Controller = LandscapeController<SvgSurface, ManualScheduler>;

struct DaemonState {
    controller: Controller,
    signal: SignalWalk,
    paths: AppPaths,
    target_fps: u32,
    epoch: Instant,
    recent: Arc<Mutex<VecDeque<NodeId>>>,
}

impl DaemonState {
    fn new(paths: AppPaths, cfg: LandscapeConfig) -> Result<Self> {
        let signal = SignalWalk::new(Prng::seeded_or_time(cfg.seed.map(|s| s ^ 0x5EED)));
        let mut controller = Controller::new(cfg, Mode::MemoryPathways, ManualScheduler::new())?;

        let recent = Arc::new(Mutex::new(VecDeque::with_capacity(RECENT_ACTIVATIONS)));
        let sink = Arc::clone(&recent);
        controller.set_activation_listener(move |node| {
            info!(node = node.id, kind = ?node.kind, "neural pathway activated");
            if let Ok(mut q) = sink.lock() {
                if q.len() == RECENT_ACTIVATIONS {
                    q.pop_front();
                }
                q.push_back(node.id);
            }
        });

        Ok(Self {
            controller,
            signal,
            paths,
            target_fps: 60,
            epoch: Instant::now(),
            recent,
        })
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Draw a frame if the controller asked for one.
    fn frame_tick(&mut self) {
        if self.controller.scheduler_mut().take_pending().is_some() {
            let now = self.now_ms();
            self.controller.on_frame(now);
        }
    }

    fn signal_tick(&mut self) {
        let frame = self.signal.next_frame();
        let now = self.now_ms();
        self.controller.apply_tick(Some(&frame), now);
    }

    fn get_snapshot(&self) -> StateSnapshot {
        let recent_activations = self
            .recent
            .lock()
            .map(|q| q.iter().copied().collect())
            .unwrap_or_default();
        StateSnapshot {
            target_fps: self.target_fps,
            recent_activations,
            landscape: LandscapeAdapter::new(&self.controller).snapshot(),
        }
    }

    /// SVG of the current view. Uses the live surface when running, else a
    /// one-off render.
    fn current_svg(&self) -> String {
        match self.controller.surface() {
            Some(surface) => surface.to_document(),
            None => {
                let mut surface = SvgSurface::new(SURFACE_SIZE.0, SURFACE_SIZE.1);
                Renderer::new(self.controller.config(), self.controller.mode()).render(
                    &mut surface,
                    self.controller.landscape(),
                    self.controller.rotation(),
                );
                surface.to_document()
            }
        }
    }

    fn export_svg(&self) -> Result<std::path::PathBuf> {
        let path = self.paths.svg_file();
        std::fs::write(&path, self.current_svg())?;
        info!("Frame written to {:?}", path);
        Ok(path)
    }

    /// Every request except `Shutdown`, which needs the runtime.
    fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::GetState => Response::State(self.get_snapshot()),
            Request::Start => {
                if self.controller.is_running() {
                    return Response::ok("Already running");
                }
                match self
                    .controller
                    .start(SvgSurface::new(SURFACE_SIZE.0, SURFACE_SIZE.1))
                {
                    Ok(()) => Response::ok("Started"),
                    Err(e) => Response::err(format!("Start failed: {e}")),
                }
            }
            Request::Stop => {
                self.controller.stop();
                Response::ok("Stopped")
            }
            Request::SetMode { mode } => match mode.parse::<Mode>() {
                Ok(m) => {
                    self.controller.set_mode(m);
                    Response::ok(format!("Mode set to {}", m.preset().display_name))
                }
                Err(e) => Response::err(e.to_string()),
            },
            Request::Regenerate => {
                self.controller.regenerate();
                Response::ok(format!(
                    "Regenerated (generation {})",
                    self.controller.generation()
                ))
            }
            Request::PointerMove { x, y } => {
                let r = self.controller.pointer_move(x, y);
                Response::ok(format!("Rotation ({:.3}, {:.3})", r.x, r.y))
            }
            Request::Click { x, y } => {
                let now = self.now_ms();
                let hits = self.controller.click(x, y, now);
                Response::ok(format!("Hit {} node(s): {:?}", hits.len(), hits))
            }
            Request::ExportSvg => match self.export_svg() {
                Ok(path) => Response::ok(format!("Wrote {}", path.display())),
                Err(e) => Response::err(format!("Export failed: {e}")),
            },
            Request::SetFramerate { fps } => {
                let clamped = fps.clamp(1, 240);
                self.target_fps = clamped;
                info!("Framerate set to {} FPS", clamped);
                Response::ok(format!("Framerate set to {} FPS", clamped))
            }
            Request::Shutdown => Response::err("Shutdown is handled by the server"),
        }
    }
}

fn load_config(paths: &AppPaths) -> LandscapeConfig {
    let path = paths.config_file();
    if !path.exists() {
        return LandscapeConfig::default();
    }
    match LandscapeConfig::load(&path) {
        Ok(cfg) => {
            info!("Config loaded from {:?}", path);
            cfg
        }
        Err(e) => {
            warn!("Ignoring config {:?}: {}", path, e);
            LandscapeConfig::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Client Handler
// ═══════════════════════════════════════════════════════════════════════════

async fn handle_client(
    stream: TcpStream,
    state: Arc<RwLock<DaemonState>>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let request: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                let resp = Response::err(format!("Invalid request: {}", e));
                writer
                    .write_all(serde_json::to_string(&resp)?.as_bytes())
                    .await?;
                writer.write_all(b"\n").await?;
                continue;
            }
        };

        let response = match request {
            Request::GetState => {
                let s = state.read().await;
                Response::State(s.get_snapshot())
            }
            Request::Shutdown => {
                let mut s = state.write().await;
                s.controller.stop();
                info!("Shutdown requested");
                tokio::spawn(async {
                    // Give the response a moment to flush before exiting.
                    time::sleep(Duration::from_millis(50)).await;
                    std::process::exit(0);
                });
                Response::ok("Shutting down")
            }
            other => {
                let mut s = state.write().await;
                s.handle(other)
            }
        };

        writer
            .write_all(serde_json::to_string(&response)?.as_bytes())
            .await?;
        writer.write_all(b"\n").await?;
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let paths = AppPaths::new()?;
    info!("Data directory: {:?}", paths.data_dir());

    let cfg = load_config(&paths);
    let state = Arc::new(RwLock::new(DaemonState::new(paths, cfg)?));

    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let mut s = state.write().await;
                s.controller.stop();
                info!("Ctrl-C: landscape stopped");
                std::process::exit(0);
            }
        });
    }

    let listener = TcpListener::bind(LISTEN_ADDR).await?;
    info!("Neuroscape daemon listening on {}", LISTEN_ADDR);

    // Frame loop
    let frame_state = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            let target_fps = frame_state.read().await.target_fps;
            let frame_millis = (1000 / target_fps.max(1)).max(1) as u64;
            time::sleep(Duration::from_millis(frame_millis)).await;

            frame_state.write().await.frame_tick();
        }
    });

    // Signal feed
    let signal_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = time::interval(SIGNAL_PERIOD);
        loop {
            interval.tick().await;
            signal_state.write().await.signal_tick();
        }
    });

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let state_clone = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, state_clone).await {
                error!("Client handler error: {}", e);
            }
        });
    }
}
