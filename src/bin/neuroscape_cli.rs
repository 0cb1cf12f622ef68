//! CLI client for the `neuroscaped` daemon.
//!
//! Examples:
//!   neuroscape-cli status
//!   neuroscape-cli start
//!   neuroscape-cli mode neural-galaxy
//!   neuroscape-cli click 512 384
//!   neuroscape-cli export
//!
//! By default it talks to 127.0.0.1:9877; override with `--addr host:port`.

use neuroscape::config::Mode;
use neuroscape::observer::LandscapeSnapshot;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

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

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateSnapshot {
    target_fps: u32,
    #[serde(default)]
    recent_activations: Vec<u32>,
    landscape: LandscapeSnapshot,
}

fn usage() -> ! {
    eprintln!("neuroscape-cli (talks to neuroscaped @ 127.0.0.1:9877 by default)");
    eprintln!("Usage: neuroscape-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  status                      Show daemon state");
    eprintln!("  start | stop                Control the frame loop");
    eprintln!("  mode <name>                 Switch landscape mode (see `modes`)");
    eprintln!("  modes                       List modes");
    eprintln!("  regen                       Regenerate the current mode");
    eprintln!("  move <x> <y>                Send a pointer move");
    eprintln!("  click <x> <y>               Send a click");
    eprintln!("  export                      Write the current frame as SVG");
    eprintln!("  fps <1-240>                 Set frame rate");
    eprintln!("  shutdown                    Exit daemon");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = "127.0.0.1:9877".to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_state(s: StateSnapshot) {
    let l = s.landscape;
    println!(
        "mode={} ({}) state={:?} fps={} generation={}",
        l.mode, l.display_name, l.state, s.target_fps, l.generation,
    );
    println!(
        "graph: nodes={} conns={} regions={} patterns={} mean_act={:.3}",
        l.node_count, l.connection_count, l.region_count, l.pattern_count, l.mean_activation,
    );
    println!(
        "activity: active_nodes={} active_conns={} pending_cascades={} rot=({:.3}, {:.3})",
        l.active_nodes, l.active_connections, l.pending_cascades, l.rotation.x, l.rotation.y,
    );
    println!(
        "frames: rendered={} skipped={} ticks={} last=[edges {} nodes {} glows {} regions {}]",
        l.frames_rendered,
        l.frames_skipped,
        l.ticks_applied,
        l.last_frame.edges_drawn,
        l.last_frame.nodes_drawn,
        l.last_frame.glows_drawn,
        l.last_frame.regions_drawn,
    );
    if !s.recent_activations.is_empty() {
        println!("recent activations: {:?}", s.recent_activations);
    }
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };

    let coords = |args: &[String]| -> (f32, f32) {
        if args.len() < 3 {
            usage();
        }
        let x = args[1]
            .parse()
            .unwrap_or_else(|_| make_error("x must be a number"));
        let y = args[2]
            .parse()
            .unwrap_or_else(|_| make_error("y must be a number"));
        (x, y)
    };

    let req = match cmd.as_str() {
        "status" => Request::GetState,
        "start" => Request::Start,
        "stop" => Request::Stop,
        "mode" => {
            if args.len() < 2 {
                usage();
            }
            let mode: Mode = args[1]
                .parse()
                .unwrap_or_else(|e| make_error(&format!("{e}")));
            Request::SetMode {
                mode: mode.as_str().to_string(),
            }
        }
        "modes" => {
            // Local command: no daemon needed.
            for m in Mode::ALL {
                println!("{:<16} {}", m.as_str(), m.preset().display_name);
            }
            process::exit(0);
        }
        "regen" => Request::Regenerate,
        "move" => {
            let (x, y) = coords(&args);
            Request::PointerMove { x, y }
        }
        "click" => {
            let (x, y) = coords(&args);
            Request::Click { x, y }
        }
        "export" => Request::ExportSvg,
        "shutdown" => Request::Shutdown,
        "fps" => {
            if args.len() < 2 {
                usage();
            }
            let fps: u32 = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("fps must be a number (1-240)"));
            Request::SetFramerate { fps }
        }
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(Response::State(s)) => print_state(s),
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
