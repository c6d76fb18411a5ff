//! Run one aggregation against the configured providers and print JSON.
//!
//! Provider endpoints and keys come from the same `EVAC_*` variables as the
//! server. Ctrl-C cancels the run.

use clap::Parser;
use evac_core::Coordinate;
use evac_providers::ProviderSet;
use evac_server::api::{RoutesResponse, ZonesResponse};
use evac_server::{config::Config, logging, AggregationRequest, Engine};
use tokio_util::sync::CancellationToken;

/// Query evacuation routes and safe zones for one position
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Search radius in meters (default: EVAC_DEFAULT_RADIUS_M)
    #[arg(long)]
    radius_m: Option<f64>,

    /// Skip every provider, as if the device had no connectivity
    #[arg(long)]
    offline: bool,

    /// Seed for synthetic data
    #[arg(long)]
    seed: Option<u64>,

    /// Only query routes
    #[arg(long, conflicts_with = "zones_only")]
    routes_only: bool,

    /// Only query safe zones
    #[arg(long)]
    zones_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    logging::init(config.log_json, "evac_server=info,evac_providers=info")?;

    let engine = Engine::new(ProviderSet::from_settings(&config.providers)?, config.policy.clone());
    let request = AggregationRequest {
        center: Coordinate::new(args.lat, args.lon),
        radius_m: args.radius_m.unwrap_or(config.default_radius_m),
        connected: !args.offline,
        seed: args.seed,
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted; cancelling");
            on_interrupt.cancel();
        }
    });

    let mut output = serde_json::Map::new();
    if !args.zones_only {
        let routes = engine.discover_routes(&request, &cancel).await?;
        output.insert("routes".to_string(), serde_json::to_value(RoutesResponse::from(routes))?);
    }
    if !args.routes_only {
        let zones = engine.discover_safe_zones(&request, &cancel).await?;
        output.insert(
            "safe_zones".to_string(),
            serde_json::to_value(ZonesResponse::from_discovery(zones, request.center))?,
        );
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
