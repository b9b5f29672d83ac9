//! parkmap - Campus parking occupancy map
//!
//! Commands:
//!   --render [ZOOM]   Print visible map features as GeoJSON (default)
//!   --status          Show per-lot availability
//!   --geocode QUERY   Resolve an address, plus code or LAT,LNG
//!   --feeds           List live feed files per lot
//!   --init            Write the built-in lot table to lots.json
//!   --help            Show usage
//!
//! --render and --status accept --simulate and --seed N to randomize occupancy.

mod config;
mod feed;
mod geo;
mod geocode;
mod layout;
mod lot;
mod map;
mod occupancy;
mod resolve;
mod style;
mod view;

use std::process;
use std::sync::Arc;

use crate::config::{LotTable, OccupancyMode, Settings};
use crate::geo::Coord;
use crate::geocode::{ChainGeocoder, Geocoder, StaticGeocoder};
use crate::map::geojson::GeoJsonMap;
use crate::map::MapProvider;
use crate::occupancy::{ConfiguredOccupancy, OccupancySource, SimulatedOccupancy};
use crate::resolve::Resolver;
use crate::view::ViewState;

/// Spots are drawn above this zoom level, lots at or below it
pub const ZOOM_THRESHOLD: f64 = 17.0;

/// Initial map view
pub const DEFAULT_ZOOM: f64 = 15.0;
pub const DEFAULT_CENTER: Coord = Coord {
    lat: 38.538066,
    lng: -121.753007,
};

/// Upper bound on a single geocode call
pub const GEOCODE_TIMEOUT_SEC: u64 = 10;

#[derive(Debug, PartialEq)]
enum Command {
    Render { zoom: Option<f64>, simulate: Option<Option<u64>> },
    Status { simulate: Option<Option<u64>> },
    Geocode(String),
    Feeds,
    Init,
    Help,
}

fn print_usage() {
    eprintln!("parkmap - Campus parking occupancy map");
    eprintln!();
    eprintln!("Usage: parkmap [COMMAND] [--simulate] [--seed N]");
    eprintln!();
    eprintln!("  --render [ZOOM]       Print visible features as GeoJSON (default)");
    eprintln!("  --status              Show per-lot availability");
    eprintln!("  --geocode QUERY       Resolve an address, plus code or LAT,LNG");
    eprintln!("  --feeds               List live feed files per lot");
    eprintln!("  --init                Write built-in lots to ~/.config/parkmap/lots.json");
    eprintln!("  --help                Show this help");
    eprintln!();
    eprintln!("  --simulate            Random occupancy instead of configured counts");
    eprintln!("  --seed N              Simulation seed (implies --simulate)");
}

/// Occupancy options trailing --render / --status. Returns `None` when
/// neither `--simulate` nor `--seed` is given.
fn parse_simulate(opts: &[String]) -> Result<Option<Option<u64>>, String> {
    let mut simulate = false;
    let mut seed = None;
    let mut iter = opts.iter();
    while let Some(opt) = iter.next() {
        match opt.as_str() {
            "--simulate" => simulate = true,
            "--seed" => {
                let value = iter.next().ok_or("--seed requires a value")?;
                let n = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid seed: {value}"))?;
                seed = Some(n);
            }
            other => return Err(format!("Unexpected argument: {other}")),
        }
    }
    Ok(if simulate || seed.is_some() { Some(seed) } else { None })
}

/// `args` excludes the program name
fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Ok(Command::Render { zoom: None, simulate: None });
    };

    match first.as_str() {
        "--render" | "render" => {
            let rest = &args[1..];
            let (zoom, opts) = match rest.first() {
                Some(z) if !z.starts_with("--") => match z.parse::<f64>() {
                    Ok(z) if z.is_finite() => (Some(z), &rest[1..]),
                    _ => return Err(format!("Invalid zoom: {z}")),
                },
                _ => (None, rest),
            };
            Ok(Command::Render { zoom, simulate: parse_simulate(opts)? })
        }
        "--simulate" | "--seed" => Ok(Command::Render { zoom: None, simulate: parse_simulate(args)? }),
        "--status" | "status" => Ok(Command::Status { simulate: parse_simulate(&args[1..])? }),
        "--geocode" | "geocode" => {
            if args.len() < 2 {
                return Err(concat!(
                    "--geocode requires a query\n",
                    "  Example: parkmap --geocode \"QQ3J+6J Davis, CA\"\n",
                    "  Example: parkmap --geocode 38.5435,-121.7583"
                )
                .to_string());
            }
            Ok(Command::Geocode(args[1..].join(" ")))
        }
        "--feeds" | "feeds" => Ok(Command::Feeds),
        "--init" | "init" => Ok(Command::Init),
        "--help" | "-h" | "help" => Ok(Command::Help),
        other => Err(format!("Unknown command: {other}")),
    }
}

fn parse_args() -> Command {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_command(&args) {
        Ok(Command::Help) => {
            print_usage();
            process::exit(0);
        }
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = parse_args();

    let paths = match config::Paths::init() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize paths: {e}");
            process::exit(1);
        }
    };

    if let Command::Init = command {
        process::exit(cmd_init(&paths));
    }

    let settings = config::load_settings(&paths);
    let table = match config::load_lots(&paths) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let result = match command {
        Command::Render { zoom, simulate } => cmd_render(&settings, &table, zoom, simulate),
        Command::Status { simulate } => cmd_status(&settings, &table, simulate),
        Command::Geocode(query) => cmd_geocode(&settings, &table, &query),
        Command::Feeds => cmd_feeds(&table),
        Command::Init | Command::Help => unreachable!(),
    };

    process::exit(result);
}

fn build_geocoder(settings: &Settings, table: &LotTable) -> Arc<dyn Geocoder> {
    let local = StaticGeocoder::new(table.aliases.clone());

    #[cfg(feature = "google")]
    let remote: Option<Box<dyn Geocoder>> = settings.api_key.as_deref().map(|key| {
        Box::new(geocode::google::GoogleGeocoder::new(key, settings.geocode_timeout))
            as Box<dyn Geocoder>
    });

    #[cfg(not(feature = "google"))]
    let remote: Option<Box<dyn Geocoder>> = {
        if settings.api_key.is_some() {
            log::warn!("api_key set but built without the google feature");
        }
        None
    };

    Arc::new(ChainGeocoder::new(local, remote))
}

fn build_occupancy(
    settings: &Settings,
    simulate: Option<Option<u64>>,
) -> Box<dyn OccupancySource> {
    let seed = match simulate {
        Some(seed) => Some(seed.unwrap_or(settings.seed)),
        None if settings.occupancy == OccupancyMode::Simulated => Some(settings.seed),
        None => None,
    };
    match seed {
        Some(seed) => {
            log::info!("Simulating occupancy (seed {seed}, p={})", settings.probability);
            Box::new(SimulatedOccupancy::new(seed, settings.probability))
        }
        None => Box::new(ConfiguredOccupancy),
    }
}

fn resolve_lots(settings: &Settings, table: &LotTable) -> resolve::Resolved {
    let resolver = Resolver::new(build_geocoder(settings, table), settings.geocode_timeout);
    resolver.all(&table.lots)
}

fn cmd_render(
    settings: &Settings,
    table: &LotTable,
    zoom: Option<f64>,
    simulate: Option<Option<u64>>,
) -> i32 {
    let resolved = resolve_lots(settings, table);

    let mut map = GeoJsonMap::new(settings.center, settings.zoom);
    let zoom_rx = map.zoom_events();
    let mut view = ViewState::create(
        &mut map,
        &resolved.lots,
        build_occupancy(settings, simulate),
        settings.zoom_threshold,
    );

    if let Some(z) = zoom {
        map.set_zoom(z);
    }
    for z in zoom_rx.try_iter() {
        view.apply_zoom(&mut map, z);
    }

    // Spot level: center on the first row like a user zooming into a lot
    if view.showing_spots() {
        if let Some(start) = resolved.lots.first().and_then(|l| l.rows.first()).map(|r| r.start) {
            map.pan_to(start);
        }
    }

    match serde_json::to_string_pretty(&map.to_feature_collection()) {
        Ok(json) => {
            println!("{json}");
            log::info!(
                "Rendered {} features at zoom {}",
                map.visible_count(),
                map.current_zoom()
            );
            0
        }
        Err(e) => {
            eprintln!("Failed to encode GeoJSON: {e}");
            1
        }
    }
}

fn cmd_status(settings: &Settings, table: &LotTable, simulate: Option<Option<u64>>) -> i32 {
    let resolved = resolve_lots(settings, table);

    let mut map = GeoJsonMap::new(settings.center, settings.zoom);
    let view = ViewState::create(
        &mut map,
        &resolved.lots,
        build_occupancy(settings, simulate),
        settings.zoom_threshold,
    );

    for lv in view.lots() {
        let s = lv.summary;
        println!(
            "{:<28} {:>4}/{:<4} {:>5.1}% occupied  {}  {}",
            lv.name,
            s.available,
            s.total,
            s.occupancy() * 100.0,
            style::occupancy_color(s.available, s.total),
            match style::tier(s.available, s.total) {
                style::Tier::Green => "plenty",
                style::Tier::Amber => "filling",
                style::Tier::Red => "nearly full",
            }
        );
    }
    for (name, e) in &resolved.failed {
        println!("{:<28} unavailable: {}", name, e);
    }

    if view.lots().is_empty() {
        1
    } else {
        0
    }
}

fn cmd_geocode(settings: &Settings, table: &LotTable, query: &str) -> i32 {
    let geocoder = build_geocoder(settings, table);
    match geocode::with_timeout(geocoder, query, settings.geocode_timeout) {
        Ok(c) => {
            println!("{} -> {}", query, c);
            0
        }
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

fn cmd_feeds(table: &LotTable) -> i32 {
    for item in feed::feed_items(&table.lots) {
        println!("{:<28} {}", item.lot, item.file);
    }
    0
}

fn cmd_init(paths: &config::Paths) -> i32 {
    if paths.lots_file.exists() {
        eprintln!("{} already exists, not overwriting.", paths.lots_file.display());
        return 1;
    }
    match config::save_lots(paths, &LotTable::default()) {
        Ok(()) => {
            println!("Wrote {}", paths.lots_file.display());
            0
        }
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn simulate_and_seed_options() {
        assert_eq!(
            parse_command(&args(&["--status", "--simulate"])),
            Ok(Command::Status { simulate: Some(None) })
        );
        assert_eq!(
            parse_command(&args(&["--status", "--seed", "7"])),
            Ok(Command::Status { simulate: Some(Some(7)) })
        );
        assert_eq!(
            parse_command(&args(&["--status"])),
            Ok(Command::Status { simulate: None })
        );
        assert!(parse_command(&args(&["--status", "--seed", "x"])).is_err());
        assert!(parse_command(&args(&["--status", "--seed"])).is_err());
    }

    #[test]
    fn zoom_after_simulate_is_not_a_seed() {
        assert_eq!(
            parse_command(&args(&["--render", "--simulate", "18"])),
            Err("Unexpected argument: 18".to_string())
        );
        assert_eq!(
            parse_command(&args(&["--render", "18", "--simulate"])),
            Ok(Command::Render { zoom: Some(18.0), simulate: Some(None) })
        );
        assert_eq!(
            parse_command(&args(&["--render", "--simulate"])),
            Ok(Command::Render { zoom: None, simulate: Some(None) })
        );
    }

    #[test]
    fn geocode_query_keeps_flag_like_words() {
        assert_eq!(
            parse_command(&args(&["--geocode", "simulate", "road"])),
            Ok(Command::Geocode("simulate road".to_string()))
        );
        assert_eq!(
            parse_command(&args(&["--geocode", "1", "--simulate", "way"])),
            Ok(Command::Geocode("1 --simulate way".to_string()))
        );
    }

    #[test]
    fn occupancy_choice() {
        let mut s = Settings::default();
        assert_eq!(build_occupancy(&s, None).availability("x", 4, 2), vec![true, true, false, false]);

        let expected = SimulatedOccupancy::new(42, s.probability).availability("x", 32, 0);
        assert_eq!(build_occupancy(&s, Some(Some(42))).availability("x", 32, 0), expected);

        s.occupancy = OccupancyMode::Simulated;
        s.seed = 42;
        assert_eq!(build_occupancy(&s, None).availability("x", 32, 0), expected);
    }

    #[test]
    fn builtin_table_resolves_offline() {
        let out = resolve_lots(&Settings::default(), &LotTable::default());
        assert_eq!(out.lots.len(), 2);
        assert!(out.failed.is_empty());
    }
}
