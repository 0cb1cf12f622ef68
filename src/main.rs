use neuroscape::activation::SignalWalk;
use neuroscape::config::{LandscapeConfig, Mode};
use neuroscape::controller::LandscapeController;
use neuroscape::observer::LandscapeAdapter;
use neuroscape::prng::Prng;
use neuroscape::schedule::ManualScheduler;
use neuroscape::surface::SvgSurface;
use tracing::{error, info};

const FRAME_MS: f64 = 1000.0 / 60.0;
const SIGNAL_PERIOD_MS: f64 = 100.0;

struct RunArgs {
    mode: Mode,
    frames: u32,
    seed: Option<u64>,
    config: Option<String>,
    svg: Option<String>,
    width: f32,
    height: f32,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            mode: Mode::MemoryPathways,
            frames: 600,
            seed: None,
            config: None,
            svg: None,
            width: 1024.0,
            height: 768.0,
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--help" | "-h" | "help") => print_help(),
        Some("modes") => print_modes(),
        Some("run") => run_or_exit(&args[1..]),
        None => run_or_exit(&[]),
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(2);
        }
    }
}

fn run_or_exit(args: &[String]) {
    let parsed = match parse_run_args(args) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            print_help();
            std::process::exit(2);
        }
    };
    if let Err(e) = run(parsed) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut out = RunArgs::default();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| {
            it.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--frames" => {
                out.frames = value("--frames")?
                    .parse()
                    .map_err(|_| "--frames must be an integer".to_string())?
            }
            "--seed" => {
                out.seed = Some(
                    value("--seed")?
                        .parse()
                        .map_err(|_| "--seed must be an integer".to_string())?,
                )
            }
            "--config" => out.config = Some(value("--config")?),
            "--svg" => out.svg = Some(value("--svg")?),
            "--size" => {
                let v = value("--size")?;
                let (w, h) = v
                    .split_once('x')
                    .ok_or_else(|| "--size expects WxH".to_string())?;
                out.width = w.parse().map_err(|_| "bad width".to_string())?;
                out.height = h.parse().map_err(|_| "bad height".to_string())?;
            }
            mode => out.mode = mode.parse().map_err(|e| format!("{e}"))?,
        }
    }
    Ok(out)
}

/// Drive the controller offline: 60 fps frames, a signal push every 100 ms,
/// a slow pointer orbit and a click at the view center every two seconds.
fn run(args: RunArgs) -> neuroscape::error::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => LandscapeConfig::load(path)?,
        None => LandscapeConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg = cfg.with_seed(seed);
    }

    let mut signal = SignalWalk::new(Prng::seeded_or_time(cfg.seed.map(|s| s ^ 0x5EED)));
    let mut c = LandscapeController::new(cfg, args.mode, ManualScheduler::new())?;
    c.set_activation_listener(|node| {
        info!(node = node.id, kind = ?node.kind, "neural pathway activated");
    });
    c.start(SvgSurface::new(args.width, args.height))?;

    let (cx, cy) = (args.width * 0.5, args.height * 0.5);
    let mut next_signal = 0.0;
    for frame in 0..args.frames {
        let now = frame as f64 * FRAME_MS;

        if now >= next_signal {
            let f = signal.next_frame();
            c.apply_tick(Some(&f), now);
            next_signal += SIGNAL_PERIOD_MS;
        }

        let theta = now as f32 * 0.0005;
        c.pointer_move(cx + theta.cos() * 120.0, cy + theta.sin() * 80.0);
        if frame % 120 == 60 {
            c.click(cx, cy, now);
        }

        if c.scheduler_mut().take_pending().is_some() {
            c.on_frame(now);
        }

        if frame % 120 == 0 {
            let s = LandscapeAdapter::new(&c).snapshot();
            println!(
                "t={:7.0}ms mode={} nodes={} edges={} active_nodes={} active_edges={} mean={:.3} drawn_edges={}",
                now,
                s.mode,
                s.node_count,
                s.connection_count,
                s.active_nodes,
                s.active_connections,
                s.mean_activation,
                s.last_frame.edges_drawn
            );
        }
    }

    let surface = c.stop();
    if let (Some(path), Some(surface)) = (args.svg, surface) {
        std::fs::write(&path, surface.to_document())?;
        info!("last frame written to {}", path);
    }
    Ok(())
}

fn print_help() {
    println!("neuroscape (procedural neural landscape, headless)");
    println!("usage:");
    println!("  neuroscape [run] [MODE] [--frames N] [--seed S] [--config FILE] [--svg OUT] [--size WxH]");
    println!("  neuroscape modes");
    println!("  neuroscape --help");
}

fn print_modes() {
    for m in Mode::ALL {
        let p = m.preset();
        println!(
            "{:<16} {:<16} nodes={:<4} density={:.2} accent={}{}",
            m.as_str(),
            p.display_name,
            p.node_count,
            p.connection_density,
            p.accent_color,
            if p.has_regions { " regions" } else { "" }
        );
    }
}
