use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::{ARC_POINTS, Coordinate, DIRECT_BEND, compute_arc_with_points, compute_bearing};
use foundation::time::Millis;
use routes::{AnimationConfig, RecordingHost, RouteBoard, SlotId};
use runtime::frame::Frame;
use runtime::random::SeededRandom;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod report;

use report::{Scenario, SessionSummary, TraceLine};

#[derive(Parser, Debug)]
#[command(author, version, about = "Flight-route arcs and animation timelines")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the curved route between two points as JSON
    Arc {
        /// Departure as LAT,LNG
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Coordinate,

        /// Arrival as LAT,LNG
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Coordinate,

        /// Curvature relative to the great-circle distance
        #[arg(long, default_value_t = DIRECT_BEND)]
        bend: f64,

        #[arg(long, default_value_t = ARC_POINTS)]
        points: usize,
    },

    /// Print the initial bearing from one point to another
    Bearing {
        /// Origin as LAT,LNG
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Coordinate,

        /// Target as LAT,LNG
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Coordinate,
    },

    /// Run route animations on a virtual clock and print the trace as JSON lines
    Simulate {
        /// JSON file: an array of routes, or {"routes": [...], "itineraries": [...]}
        scenario: PathBuf,

        /// Animation config JSON; missing fields keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Random seed; unseeded runs differ in jitter and replays
        #[arg(long, env = "FLIGHTPATH_SEED")]
        seed: Option<u64>,

        /// Virtual time to stop at
        #[arg(long, default_value_t = 30_000)]
        until_ms: u64,

        /// Virtual frame length
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Args::parse().command {
        Command::Arc {
            from,
            to,
            bend,
            points,
        } => cmd_arc(from, to, bend, points),
        Command::Bearing { from, to } => cmd_bearing(from, to),
        Command::Simulate {
            scenario,
            config,
            seed,
            until_ms,
            frame_ms,
        } => cmd_simulate(scenario, config, seed, until_ms, frame_ms),
    }
}

fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude {lat:?}: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("longitude {lng:?}: {e}"))?;
    Coordinate::new(lat, lng).validated().map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct ArcOutput {
    distance_km: f64,
    bend: f64,
    points: Vec<[f64; 2]>,
}

fn cmd_arc(from: Coordinate, to: Coordinate, bend: f64, points: usize) -> Result<(), String> {
    let arc = compute_arc_with_points(from, to, bend, points).map_err(|e| e.to_string())?;
    let out = ArcOutput {
        distance_km: foundation::math::haversine_km(from, to),
        bend,
        points: arc.points().iter().map(|c| [c.lat, c.lng]).collect(),
    };
    let json = serde_json::to_string_pretty(&out).map_err(|e| format!("serialize arc: {e}"))?;
    println!("{json}");
    Ok(())
}

fn cmd_bearing(from: Coordinate, to: Coordinate) -> Result<(), String> {
    let bearing = compute_bearing(from, to).map_err(|e| e.to_string())?;
    println!("{bearing:.6}");
    Ok(())
}

fn cmd_simulate(
    scenario_path: PathBuf,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    until_ms: u64,
    frame_ms: u64,
) -> Result<(), String> {
    let config = match &config_path {
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| format!("read {p:?}: {e}"))?;
            AnimationConfig::from_json_str(&text).map_err(|e| format!("{p:?}: {e}"))?
        }
        None => AnimationConfig::default(),
    };
    let text = fs::read_to_string(&scenario_path)
        .map_err(|e| format!("read {scenario_path:?}: {e}"))?;
    let scenario = Scenario::from_json_str(&text)?;

    let rng = match seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };
    info!(
        routes = scenario.routes.len(),
        itineraries = scenario.itineraries.len(),
        seed = ?seed,
        "simulation starting"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut board = RouteBoard::new(config, RecordingHost::new(), rng);
    let mut next_slot = 0;
    for request in scenario.routes {
        let slot = SlotId(next_slot);
        next_slot += 1;
        if let Err(err) = board.set_route(slot, request) {
            emit(&mut out, &TraceLine::from_error(0, slot, &err))?;
        }
    }
    for itinerary in &scenario.itineraries {
        let first = SlotId(next_slot);
        next_slot += itinerary.legs.len() as u64;
        for (slot, result) in board.set_itinerary(first, itinerary) {
            if let Err(err) = result {
                emit(&mut out, &TraceLine::from_error(0, slot, &err))?;
            }
        }
    }

    for frame in Frame::run_until(frame_ms, Millis(until_ms)) {
        let now = frame.now.min(Millis(until_ms));
        for (slot, err) in board.advance_to(now) {
            emit(&mut out, &TraceLine::from_error(now.0, slot, &err))?;
        }
        for (slot, event) in board.drain_trace() {
            emit(&mut out, &TraceLine::from_event(slot, &event))?;
        }
    }

    for (slot, session) in board.sessions() {
        emit(&mut out, &SessionSummary::new(slot, session))?;
    }
    info!(
        frames = board.host().frames().len(),
        live = board.host().surface.live_count(),
        "simulation finished"
    );
    Ok(())
}

fn emit<W: Write, T: Serialize>(out: &mut W, line: &T) -> Result<(), String> {
    let json = serde_json::to_string(line).map_err(|e| format!("serialize: {e}"))?;
    writeln!(out, "{json}").map_err(|e| format!("write: {e}"))
}
