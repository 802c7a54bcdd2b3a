//! Build the navigation graph and cover network of a level file.
//!
//! Usage:
//!   marga-build --level levels/courtyard.yaml
//!   marga-build --level levels/courtyard.yaml --config configs/default.yaml --fail-on-error

use std::path::{Path, PathBuf};

use clap::Parser;

use marga_nav::{NavConfig, PathBuilder, Severity, io::load_level};

/// Waypoint graph and cover network builder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level description (YAML)
    #[arg(short, long)]
    level: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "configs/default.yaml")]
    config: PathBuf,

    /// Exit with status 2 when the build reports errors
    #[arg(long)]
    fail_on_error: bool,

    /// Print statistics as YAML
    #[arg(long)]
    yaml: bool,
}

fn load_config(path: &Path) -> NavConfig {
    if !path.exists() {
        return NavConfig::default();
    }
    match NavConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}, using defaults", e);
            NavConfig::default()
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args.config);
    let (mut level, world) = match load_level(&args.level) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load level {}: {}", args.level.display(), e);
            std::process::exit(1);
        }
    };

    println!(
        "Loaded {}: {} waypoints, {} cover links",
        args.level.display(),
        level.len(),
        level.cover_link_ids().len()
    );

    let report = PathBuilder::new(config).build_paths(&mut level, &world);

    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            Severity::Info => println!("{}", diagnostic),
            _ => eprintln!("{}", diagnostic),
        }
    }

    if args.yaml {
        match serde_yaml::to_string(&report.stats) {
            Ok(text) => print!("{}", text),
            Err(e) => eprintln!("Failed to format statistics: {}", e),
        }
    } else {
        let stats = &report.stats;
        println!("\n=== Build Statistics ===");
        println!("Waypoints:        {}", stats.waypoints);
        println!(
            "Edges created:    {} standard, {} forced, {} special, {} long-range",
            stats.standard_edges, stats.forced_edges, stats.special_edges, stats.long_range_edges
        );
        println!(
            "Edges pruned:     {} basic, {} intersecting, {} angular",
            stats.pruned_basic, stats.pruned_intersect, stats.pruned_angular
        );
        println!("Surviving edges:  {}", stats.surviving_edges);
        println!("Networks:         {}", stats.networks);
        println!(
            "Cover links:      {} fire, {} exposed, {} danger",
            stats.fire_links, stats.exposed_fire_links, stats.danger_links
        );
    }

    let errors = report.errors().count();
    println!("\n{} errors, {} warnings", errors, report.warnings().count());
    if args.fail_on_error && errors > 0 {
        std::process::exit(2);
    }
}
