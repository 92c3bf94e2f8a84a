use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use postscriptum_shared::{CalibrationReport, MapCatalog, MapDescriptor, RangeConfig};
use tracing_subscriber::EnvFilter;

/// Inspect the map catalog and range tables before shipping them.
#[derive(Parser, Debug)]
#[command(name = "map-report", version)]
struct Cli {
    /// Directory holding maps.json and ranges.json. Falls back to ASSETS_DIR,
    /// then to the built-in tables.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List maps in declaration order
    List,
    /// Show one map descriptor
    Show { name: String },
    /// Print heightmap calibration reports for one map or all of them
    Calibration { name: Option<String> },
    /// Print range circle radii and ammo variants
    Ranges,
}

fn assets_dir(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var_os("ASSETS_DIR").map(PathBuf::from))
}

fn load_catalog(dir: Option<&Path>) -> anyhow::Result<MapCatalog> {
    match dir {
        Some(dir) => {
            let path = dir.join("maps.json");
            MapCatalog::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(MapCatalog::builtin().clone()),
    }
}

fn load_ranges(dir: Option<&Path>) -> anyhow::Result<RangeConfig> {
    match dir {
        Some(dir) => {
            let path = dir.join("ranges.json");
            RangeConfig::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(RangeConfig::default()),
    }
}

fn format_list(catalog: &MapCatalog) -> String {
    let mut out = String::new();
    out.push_str("=== Maps ===\n");
    for map in catalog.maps() {
        let calibrated = if map.calibration.is_some() { " (calibrated)" } else { "" };
        out.push_str(&format!(
            "  {}: {}x{}m{}\n",
            map.name, map.bounds.width, map.bounds.height, calibrated
        ));
    }
    out
}

fn format_map(map: &MapDescriptor) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", map.name));
    out.push_str(&format!("  Tiles:  {}\n", map.url));
    out.push_str(&format!(
        "  Bounds: {}x{}m\n",
        map.bounds.width, map.bounds.height
    ));
    match &map.calibration {
        Some(cal) => out.push_str(&format!(
            "  Heightmap: {}x{}px\n",
            cal.heightmap_dimensions[0], cal.heightmap_dimensions[1]
        )),
        None => out.push_str("  no calibration data\n"),
    }
    out
}

fn format_reports(reports: &[CalibrationReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&report.to_string());
        out.push_str("\n---\n");
    }
    out
}

fn format_ranges(config: &RangeConfig) -> String {
    let mut out = String::new();
    out.push_str("=== Range Circles ===\n");
    out.push_str(&format!(
        "  Mortar min:      {}m\n",
        config.mortar_min_distance
    ));
    out.push_str(&format!("  FOB build range: {}m\n", config.fob_build_range));
    out.push_str(&format!("  FOB spacing:     {}m\n", config.fob_min_distance));
    out.push_str(&format!("  Icon size:       {}px\n\n", config.icon_size));

    out.push_str("=== Ammo Variants ===\n");
    for v in &config.variants {
        out.push_str(&format!(
            "  {}: max {}m @ {}m/s\n",
            v.name, v.max_distance, v.velocity
        ));
    }
    out
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let dir = assets_dir(cli.assets);
    match &dir {
        Some(dir) => tracing::debug!(dir = %dir.display(), "Using assets directory"),
        None => tracing::debug!("Using built-in tables"),
    }
    let dir = dir.as_deref();

    let out = match cli.command {
        Command::List => format_list(&load_catalog(dir)?),
        Command::Show { name } => format_map(load_catalog(dir)?.resolve(&name)?),
        Command::Calibration { name: Some(name) } => {
            match load_catalog(dir)?.describe_calibration(&name)? {
                Some(report) => format_reports(&[report]),
                None => format!("{name}: no calibration data\n"),
            }
        }
        Command::Calibration { name: None } => {
            let reports = load_catalog(dir)?.calibration_reports();
            if reports.is_empty() {
                "no calibration data\n".to_string()
            } else {
                format_reports(&reports)
            }
        }
        Command::Ranges => format_ranges(&load_ranges(dir)?),
    };
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    print!("{}", run(cli)?);
    Ok(())
}
