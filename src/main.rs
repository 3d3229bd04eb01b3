use std::fs;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use sat_approach::config::Config;
use sat_approach::fetch::{unavailable_tle_text, TleClient};
use sat_approach::predict::{parse_tle, GeodeticCoordinate, OrbitalState};
use sat_approach::report::{ApproachReport, OutputFormat};

#[derive(Parser)]
#[command(name = "sat-approach")]
#[command(about = "Find the next closest approach of a satellite to a ground location")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the next closest approach
    Find(FindArgs),
    /// Validate a TLE file
    Validate { tle: String },
}

#[derive(Args)]
struct FindArgs {
    /// YAML configuration file
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    catalog_id: Option<u32>,
    /// Target as "lat,lon" in degrees
    #[arg(long)]
    target: Option<String>,
    #[arg(long)]
    height_km: Option<f64>,
    /// Time between samples, e.g. "1m" or "30s"
    #[arg(long)]
    step: Option<String>,
    #[arg(long)]
    max_steps: Option<usize>,
    #[arg(long)]
    workers: Option<usize>,
    /// Scan start as RFC 3339, defaults to now
    #[arg(long)]
    start: Option<String>,
    /// Read the TLE from a file instead of fetching it
    #[arg(long)]
    tle_file: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Find(args) => find(args).await,
        Commands::Validate { tle } => validate(&tle),
    }
}

async fn find(args: FindArgs) -> ExitCode {
    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let t0 = match args.start.as_deref().map(parse_start).transpose() {
        Ok(start) => start.unwrap_or_else(Utc::now),
        Err(e) => {
            eprintln!("Invalid start time: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tle = match &args.tle_file {
        Some(path) => match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading file: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => fetch_tle(&config).await,
    };

    let max_age = match config.max_element_age() {
        Ok(age) => age,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match parse_tle(&tle) {
        Ok(s) => s.with_max_age(max_age),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "{} (NORAD {}), epoch {}, {:?}",
        state.name().unwrap_or(&config.satellite.name),
        state.norad_id(),
        state.epoch(),
        state.regime()
    );

    let approach = match config.approach_search().run(&state, t0) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let name = state.name().unwrap_or(&config.satellite.name);
    let report = ApproachReport::new(name, state.norad_id(), &approach);
    match report.render(args.output) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Output error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Falls back to a TLE that fails to parse when the fetch fails.
async fn fetch_tle(config: &Config) -> String {
    let lines = match TleClient::new(&config.source.base_url, config.source.timeout()) {
        Ok(client) => client.fetch_or_log(config.satellite.catalog_id).await,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            None
        }
    };
    match lines {
        Some(lines) => lines.to_tle_text(&config.satellite.name),
        None => unavailable_tle_text(&config.satellite.name),
    }
}

fn load_config(args: &FindArgs) -> Result<Config, String> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    if let Some(id) = args.catalog_id {
        config.satellite.catalog_id = id;
    }
    if let Some(target) = &args.target {
        let coord = GeodeticCoordinate::from_coordinates(target, args.height_km)
            .ok_or_else(|| format!("invalid target \"{}\", expected \"lat,lon\"", target))?;
        config.target.latitude_deg = coord.latitude_deg();
        config.target.longitude_deg = coord.longitude_deg();
    }
    if let Some(h) = args.height_km {
        config.target.height_km = h;
    }
    if let Some(step) = &args.step {
        config.search.step_millis = parse_step_millis(step)?;
    }
    if let Some(n) = args.max_steps {
        config.search.max_steps = n;
    }
    if let Some(n) = args.workers {
        config.search.workers = n;
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn parse_step_millis(s: &str) -> Result<u64, String> {
    let d = humantime::parse_duration(s.trim()).map_err(|e| e.to_string())?;
    u64::try_from(d.as_millis()).map_err(|e| e.to_string())
}

fn parse_start(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn validate(path: &str) -> ExitCode {
    let tle = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match parse_tle(&tle) {
        Ok(state) => {
            print_elements(&state);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_elements(state: &OrbitalState) {
    let elements = state.elements();
    println!("TLE is valid");
    println!("  name: {}", state.name().unwrap_or("(none)"));
    println!("  norad id: {}", state.norad_id());
    println!("  epoch: {}", state.epoch());
    println!("  inclination: {:.4} deg", elements.inclination);
    println!("  eccentricity: {:.7}", elements.eccentricity);
    println!("  mean motion: {:.8} rev/day", elements.mean_motion);
    println!(
        "  period: {:.2} min ({:?})",
        state.period_minutes(),
        state.regime()
    );
}
