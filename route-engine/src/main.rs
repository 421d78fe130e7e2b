use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use route_engine::cache::GeometryCache;
use route_engine::domain::{Coord, RouteId, StopId, VehicleId, load_routes};
use route_engine::eta::{EtaConfig, EtaEstimator, EtaTarget, VehiclePosition, VehicleTracker};
use route_engine::road::{OsrmClient, OsrmConfig, road_distance_with_fallback};
use route_engine::router::plan_trip;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(
    name = "route-engine",
    version,
    about = "Plan trips over fixed routes and estimate vehicle arrival times",
    long_about = "Plan trips over fixed routes and estimate vehicle arrival times.\n\n\
                  ETA settings are read from AVG_SPEED_KMH, ETA_SMOOTH_ALPHA, \
                  ETA_PASSED_THRESHOLD_SECS and ETA_PASSED_CONFIRMATIONS. \
                  Log verbosity follows RUST_LOG, e.g. route_engine=debug."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the best route between two stops
    Plan {
        /// JSON file with an array of routes
        routes: PathBuf,
        /// Pickup stop id
        pickup: StopId,
        /// Destination stop id
        dest: StopId,
    },

    /// Estimate arrival for a vehicle at a position on a route
    Eta {
        /// JSON file with an array of routes
        routes: PathBuf,
        /// Route the vehicle is running on
        route: RouteId,
        /// Vehicle position as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        position: Coord,
        /// Target stop index in route order (default: nearest stop)
        stop: Option<usize>,
    },

    /// Road distance between two points, falling back to a straight-line estimate
    Road {
        /// Start as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        from: Coord,
        /// End as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        to: Coord,
        /// OSRM-compatible routing service
        #[arg(long, env = "OSRM_BASE_URL")]
        osrm_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Plan {
            routes,
            pickup,
            dest,
        } => plan(&routes, pickup, dest),
        Command::Eta {
            routes,
            route,
            position,
            stop,
        } => eta(&routes, route, position, stop).await,
        Command::Road {
            from,
            to,
            osrm_url,
            timeout,
        } => road(from, to, osrm_url, timeout).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn plan(path: &Path, pickup: StopId, dest: StopId) -> Result<(), BoxError> {
    let routes = load_routes(path)?;

    let best = plan_trip(&routes, pickup, dest);
    match best.route {
        Some(route) => {
            let output = serde_json::json!({
                "route_id": route.id(),
                "route_name": route.name(),
                "distance_m": best.distance,
                "path": best.path,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        None => println!("no route from {pickup} to {dest}"),
    }
    Ok(())
}

async fn eta(
    path: &Path,
    route_id: RouteId,
    position: Coord,
    stop: Option<usize>,
) -> Result<(), BoxError> {
    let config = EtaConfig::from_env()?;
    let routes = load_routes(path)?;
    let route = routes
        .iter()
        .find(|r| r.id() == route_id)
        .ok_or_else(|| format!("route {route_id} not found"))?;

    let target = stop.map_or(EtaTarget::NearestStop, EtaTarget::Stop);
    let position = VehiclePosition::new(position, Utc::now());

    let tracker = VehicleTracker::new(EtaEstimator::new(config), GeometryCache::default());
    let update = tracker
        .observe(VehicleId(0), route, position, target)
        .await?;

    let output = serde_json::json!({
        "remaining_m": update.remaining_m,
        "status": update.status,
        "passed": update.passed,
        "state": update.state,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn road(from: Coord, to: Coord, osrm_url: Option<String>, timeout: u64) -> Result<(), BoxError> {
    let mut config = OsrmConfig::new().with_timeout(timeout);
    if let Some(url) = osrm_url {
        config = config.with_base_url(url);
    }
    let client = OsrmClient::new(config)?;

    let estimate = road_distance_with_fallback(&client, from, to).await?;
    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
