//! # celldim
//!
//! Command-line front end for the cell dimensioning engine.
//!
//! Inputs are layered: built-in defaults, then `--config` YAML files in
//! order, then command line flags. Results go to stdout as text or JSON;
//! logs go to stderr and are controlled with `RUST_LOG`.

use celldim_common::{Environment, Technology, TechnologyProfile};
use celldim_link::LinkBudgetResult;
use celldim_model::{load_scenarios, ScenarioConfig, TechnologyRegistry, UnresolvedScenario};
use celldim_runner::{
    DimensioningEngine, DimensioningRequest, DimensioningResult, RadioSettings, RunnerError,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// CLI Configuration
// ============================================================================

/// Output format for command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable report.
    Text,
    /// Pretty-printed JSON for programmatic consumption.
    Json,
}

/// celldim - Cellular network dimensioning
#[derive(Parser, Debug)]
#[command(name = "celldim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dimension a network: radius, cell count, capacity and reuse pattern
    Dimension(DimensionConfig),
    /// Compute the link budget at a given distance
    LinkBudget(LinkBudgetConfig),
    /// Find the maximum cell radius at which the link still closes
    Radius(RadiusConfig),
    /// List the available technologies and their radio parameters
    Technologies(CatalogConfig),
    /// List the frequency bands of a technology
    Frequencies(FrequenciesConfig),
}

/// Radio scenario options shared by every computing command.
///
/// ## Example YAML
///
/// ```yaml
/// scenario:
///   technology: GSM
///   band: "900"
///   environment: rural
///   base_station_height_m: 40.0
/// technologies:
///   GSM:
///     fade_margin_db: 8.0
/// ```
#[derive(Args, Debug, Default)]
pub struct ScenarioArgs {
    /// Path(s) to YAML scenario file(s). Multiple files are merged in order (later overrides earlier).
    #[arg(short, long = "config", value_name = "FILE")]
    pub configs: Vec<PathBuf>,
    /// Technology: GSM, UMTS or LTE (overrides config file)
    #[arg(short, long)]
    pub technology: Option<Technology>,
    /// Carrier frequency in MHz (overrides config file)
    #[arg(short, long)]
    pub frequency: Option<f64>,
    /// Named band of the technology, e.g. 1800 (alternative to --frequency)
    #[arg(long, conflicts_with = "frequency")]
    pub band: Option<String>,
    /// Environment: urban, suburban, rural or free_space (overrides config file)
    #[arg(short, long)]
    pub environment: Option<Environment>,
    /// Base station antenna height in meters (default: 30)
    #[arg(long)]
    pub hb: Option<f64>,
    /// Mobile antenna height in meters (default: 1.5)
    #[arg(long)]
    pub hm: Option<f64>,
}

impl ScenarioArgs {
    /// Scenario layer made of the flags given on the command line.
    fn overlay(&self) -> UnresolvedScenario {
        UnresolvedScenario {
            technology: self.technology,
            frequency_mhz: self.frequency,
            band: self.band.clone(),
            environment: self.environment,
            base_station_height_m: self.hb,
            mobile_height_m: self.hm,
            ..Default::default()
        }
    }

    /// Load and merge YAML configs, then apply CLI overrides.
    fn load(&self, extra: &UnresolvedScenario) -> Result<(UnresolvedScenario, TechnologyRegistry), RunnerError> {
        let config = load_config(&self.configs)?;
        let registry = config.registry()?;

        let mut scenario = config.scenario;
        scenario.merge(&self.overlay());
        scenario.merge(extra);
        Ok((scenario, registry))
    }

    /// Resolve the radio settings and the registry they refer to.
    pub fn resolve_radio(&self) -> Result<(RadioSettings, TechnologyRegistry), RunnerError> {
        let (scenario, registry) = self.load(&UnresolvedScenario::default())?;
        let radio = RadioSettings::resolve(&scenario, &registry)?;
        Ok((radio, registry))
    }
}

/// Configuration for a full dimensioning run
#[derive(Parser, Debug)]
#[command(allow_hyphen_values = true)]
pub struct DimensionConfig {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    /// Total surface to cover in km² (overrides config file)
    #[arg(short, long)]
    pub surface: Option<f64>,
    /// Traffic demand in percent, 0-100 (overrides config file)
    #[arg(long)]
    pub traffic: Option<f64>,
    /// Required quality of service in percent, 0-100 (overrides config file)
    #[arg(long)]
    pub qos: Option<f64>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl DimensionConfig {
    /// Resolve the full request and the registry it refers to.
    pub fn resolve(&self) -> Result<(DimensioningRequest, TechnologyRegistry), RunnerError> {
        let extra = UnresolvedScenario {
            surface_total_km2: self.surface,
            traffic_demand_pct: self.traffic,
            qos_pct: self.qos,
            ..Default::default()
        };
        let (scenario, registry) = self.scenario.load(&extra)?;
        let request = DimensioningRequest::resolve(&scenario, &registry)?;
        Ok((request, registry))
    }
}

/// Configuration for a single link budget
#[derive(Parser, Debug)]
#[command(allow_hyphen_values = true)]
pub struct LinkBudgetConfig {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    /// Distance between base station and mobile in km - REQUIRED
    #[arg(short, long)]
    pub distance: f64,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Configuration for a radius search
#[derive(Parser, Debug)]
#[command(allow_hyphen_values = true)]
pub struct RadiusConfig {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Configuration for listing technologies
#[derive(Parser, Debug)]
pub struct CatalogConfig {
    /// YAML file(s) whose `technologies` overrides are applied to the catalog
    #[arg(short, long = "config", value_name = "FILE")]
    pub configs: Vec<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Configuration for listing frequency bands
#[derive(Parser, Debug)]
pub struct FrequenciesConfig {
    /// Technology key: GSM, UMTS or LTE
    pub technology: String,
    #[command(flatten)]
    pub catalog: CatalogConfig,
}

fn load_config(paths: &[PathBuf]) -> Result<ScenarioConfig, RunnerError> {
    if paths.is_empty() {
        return Ok(ScenarioConfig::default());
    }
    let paths: Vec<&Path> = paths.iter().map(|p| p.as_path()).collect();
    load_scenarios(&paths)
        .map_err(|e| RunnerError::ConfigError(format!("Failed to load config: {}", e)))
}

fn engine_for(registry: TechnologyRegistry) -> DimensioningEngine {
    DimensioningEngine::new(Arc::new(registry))
}

// ============================================================================
// Commands
// ============================================================================

fn dimension_command(config: DimensionConfig) -> Result<(), RunnerError> {
    let (request, registry) = config.resolve()?;
    let engine = engine_for(registry);
    let result = engine.dimension(&request)?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_dimensioning(&request, &result),
    }
    Ok(())
}

fn link_budget_command(config: LinkBudgetConfig) -> Result<(), RunnerError> {
    let (radio, registry) = config.scenario.resolve_radio()?;
    let engine = engine_for(registry);
    let budget = engine.link_budget(&radio, config.distance)?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&budget)?),
        OutputFormat::Text => {
            println!("Link Budget");
            println!("===========");
            println!();
            println!("Scenario:");
            print_radio(&radio);
            println!("  Distance:            {:.3} km", config.distance);
            println!();
            print_link_budget(&budget);
        }
    }
    Ok(())
}

fn radius_command(config: RadiusConfig) -> Result<(), RunnerError> {
    let (radio, registry) = config.scenario.resolve_radio()?;
    let engine = engine_for(registry);
    let search = engine.max_radius(&radio)?;

    match config.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "technology": radio.technology,
                "frequency_mhz": radio.frequency_mhz,
                "environment": radio.environment,
                "radius_km": search.radius_km,
                "iterations": search.iterations,
                "lower_bracket_confirmed": search.lower_bracket_confirmed,
                "upper_bracket_reached": search.upper_bracket_reached,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Maximum Cell Radius");
            println!("===================");
            println!();
            print_radio(&radio);
            println!();
            println!("  Radius:              {:.2} km", search.radius_km);
            println!("  Iterations:          {}", search.iterations);
            if !search.lower_bracket_confirmed {
                println!("  Note:                link never closes, radius is the search lower bound");
            }
            if search.upper_bracket_reached {
                println!("  Note:                link closes everywhere, radius capped at the search upper bound");
            }
        }
    }
    Ok(())
}

fn technologies_command(config: CatalogConfig) -> Result<(), RunnerError> {
    let registry = load_config(&config.configs)?.registry()?;

    match config.format {
        OutputFormat::Json => {
            let profiles: Vec<&TechnologyProfile> = registry.technologies().collect();
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        }
        OutputFormat::Text => {
            println!("celldim Technologies");
            println!("====================\n");
            for profile in registry.technologies() {
                print_profile(profile);
            }
        }
    }
    Ok(())
}

fn frequencies_command(config: FrequenciesConfig) -> Result<(), RunnerError> {
    let registry = load_config(&config.catalog.configs)?.registry()?;
    let profile = registry.lookup(&config.technology)?;
    let bands = registry.frequency_bands(profile.technology)?;

    match config.catalog.format {
        OutputFormat::Json => {
            let bands: serde_json::Map<String, serde_json::Value> = bands
                .iter()
                .map(|b| (b.name.clone(), serde_json::json!(b.frequency_mhz)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&bands)?);
        }
        OutputFormat::Text => {
            println!("{} frequency bands:", profile.name);
            for band in bands {
                println!("  {:<8} {} MHz", band.name, band.frequency_mhz);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Text Output
// ============================================================================

fn print_radio(radio: &RadioSettings) {
    println!("  Technology:          {}", radio.technology);
    println!("  Frequency:           {} MHz", radio.frequency_mhz);
    println!("  Environment:         {}", radio.environment);
    println!("  Antenna heights:     {} m (BTS), {} m (mobile)", radio.geometry.hb_m, radio.geometry.hm_m);
}

fn print_link_budget(budget: &LinkBudgetResult) {
    println!("  TX power:            {:.1} dBm", budget.tx_power_dbm);
    println!("  TX antenna gain:     {:.1} dBi", budget.tx_antenna_gain_dbi);
    println!("  RX antenna gain:     {:.1} dBi", budget.rx_antenna_gain_dbi);
    println!("  Path loss:           {:.2} dB", budget.path_loss_db);
    println!("  Fade margin:         {:.1} dB", budget.fade_margin_db);
    println!("  Interference margin: {:.1} dB", budget.interference_margin_db);
    println!("  Body loss:           {:.1} dB", budget.body_loss_db);
    println!("  Received power:      {:.2} dBm", budget.received_power_dbm);
    println!("  RX sensitivity:      {:.1} dBm", budget.rx_sensitivity_dbm);
    println!("  Link margin:         {:.2} dB", budget.link_margin_db);
    println!("  Status:              {}", if budget.feasible { "FEASIBLE" } else { "NOT FEASIBLE" });
}

fn print_dimensioning(request: &DimensioningRequest, result: &DimensioningResult) {
    let title = format!("Network Dimensioning: {}", result.technology_name);
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    println!();
    println!("Inputs:");
    print_radio(&request.radio);
    println!("  Surface:             {} km²", request.surface_total_km2);
    println!("  Traffic demand:      {} %", request.traffic_demand_pct);
    println!("  QoS requirement:     {} %", request.qos_pct);
    println!();
    println!("Coverage ({}):", result.propagation_model);
    println!("  Max radius:          {:.2} km", result.max_radius_km);
    println!("  Optimal radius:      {:.2} km", result.optimal_radius_km);
    println!("  Cell area:           {:.2} km²", result.cell_area_km2);
    println!("  Cells:               {}", result.cell_count);
    println!();
    println!("Capacity:");
    println!("  Channels per cell:   {}", result.channels_per_cell);
    println!("  Capacity per cell:   {:.1}", result.capacity_per_cell);
    println!("  Total capacity:      {:.1}", result.total_capacity);
    println!();
    println!("Frequency Reuse:");
    println!("  Cluster size:        {}", result.cluster_size);
    println!("  Reuse distance:      {:.2} km", result.reuse_distance_km);
    println!();
    println!("Link Budget at Optimal Radius:");
    print_link_budget(&result.link_budget);
    println!();
    println!("QoS score:             {:.1} %", result.qos_score);
}

fn print_profile(profile: &TechnologyProfile) {
    println!("## {} [{}]", profile.name, profile.technology);
    let bands: Vec<String> = profile
        .frequency_bands
        .iter()
        .map(|b| format!("{} MHz", b.frequency_mhz))
        .collect();
    println!("    Bands:              {}", bands.join(", "));
    println!("    Channel spacing:    {} MHz", profile.channel_spacing_mhz);
    println!("    Max TX power:       {} dBm", profile.tx_power_max_dbm);
    println!("    RX sensitivity:     {} dBm", profile.rx_sensitivity_dbm);
    println!("    Noise figure:       {} dB", profile.noise_figure_db);
    println!(
        "    Margins:            fade {} dB, interference {} dB, body {} dB",
        profile.fade_margin_db, profile.interference_margin_db, profile.body_loss_db
    );
    println!();
}

fn main() -> Result<(), RunnerError> {
    // Initialize tracing subscriber with RUST_LOG env filter
    // Default to "warn" level if RUST_LOG is not set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dimension(config) => dimension_command(config)?,
        Commands::LinkBudget(config) => link_budget_command(config)?,
        Commands::Radius(config) => radius_command(config)?,
        Commands::Technologies(config) => technologies_command(config)?,
        Commands::Frequencies(config) => frequencies_command(config)?,
    }

    Ok(())
}
