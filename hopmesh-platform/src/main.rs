// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simple front-end for building the routing tables of a mesh platform
//!
//! For example, run using:
//!   cargo run --bin hopmesh -- --platform
//! hopmesh-platform/demos/mesh_5x5.yaml --stdout --stdout-level debug
//!
//! or without a platform file:
//!   cargo run --bin hopmesh -- --columns 7 --rows 7 --max-num-hops 2
//! --dump-tables

use std::path::Path;

use anyhow::{Result, bail};
use clap::Parser;
use hopmesh_platform::MeshPlatform;
use hopmesh_platform::types::{MeshSection, PlatformConfig};
use hopmesh_routing::forwarding::ForwardingStrategy;
use hopmesh_track::builder::{TrackerConfig, setup_tracker};
use hopmesh_track::entity::toplevel;
use hopmesh_track::{Track, Tracker, info};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Application to build and inspect bounded-hop routing tables of a mesh")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Platform file. When not given, `--columns`, `--rows` and
    /// `--max-num-hops` are required.
    #[arg(long)]
    platform: Option<String>,

    /// Number of columns in the mesh.
    #[arg(long)]
    columns: Option<usize>,

    /// Number of rows in the mesh.
    #[arg(long)]
    rows: Option<usize>,

    /// Maximum number of hops a node may access memory directly.
    #[arg(long, allow_negative_numbers = true)]
    max_num_hops: Option<i64>,

    /// Seed for the random choices made while building the tables.
    #[arg(long)]
    seed: Option<u64>,

    /// How accesses beyond the hop budget are forwarded.
    #[arg(long, value_enum)]
    forwarding: Option<ForwardingStrategy>,

    /// Print the full routing table of every node.
    #[arg(long)]
    dump_tables: bool,

    /// Print the port every node sends an access to this address through.
    #[arg(long, value_parser = parse_address)]
    resolve: Option<u64>,
}

fn parse_address(s: &str) -> Result<u64, String> {
    let lowercase = s.to_lowercase().replace('_', "");
    let parsed = match lowercase.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => lowercase.parse(),
    };
    parsed.map_err(|e| format!("Unable to parse address {s}: {e}"))
}

fn setup_stdout_tracker(args: &Cli) -> Result<Tracker> {
    let config = TrackerConfig {
        enable: args.stdout,
        level: args.stdout_level,
        filter_regex: &args.stdout_filter_regex,
        file: None,
    };
    Ok(setup_tracker(&config)?)
}

/// Read the mesh section from `--platform`, if given, and apply any overrides
/// from the command line.
fn mesh_section(args: &Cli) -> Result<MeshSection> {
    let mut section = match &args.platform {
        Some(path) => {
            let s = std::fs::read_to_string(Path::new(path))?;
            let cfg: PlatformConfig = serde_yaml::from_str(&s)?;
            cfg.mesh
        }
        None => {
            let (Some(columns), Some(rows), Some(max_num_hops)) =
                (args.columns, args.rows, args.max_num_hops)
            else {
                bail!("--columns, --rows and --max-num-hops are required without --platform");
            };
            MeshSection {
                columns,
                rows,
                max_num_hops,
                ..MeshSection::default()
            }
        }
    };

    if let Some(columns) = args.columns {
        section.columns = columns;
    }
    if let Some(rows) = args.rows {
        section.rows = rows;
    }
    if let Some(max_num_hops) = args.max_num_hops {
        section.max_num_hops = max_num_hops;
    }
    section.seed = args.seed.or(section.seed);
    section.forwarding = args.forwarding.or(section.forwarding);
    Ok(section)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let tracker = setup_stdout_tracker(&args)?;

    let top = toplevel(&tracker, "top");
    let platform = MeshPlatform::build(&top, &mesh_section(&args)?)?;
    println!("Loaded platform:");
    println!("{platform}");

    let mut total_direct = 0;
    let mut total_forwarded = 0;
    for node in platform.nodes() {
        let table = node.router()?.table();
        let summary = table.summary();
        info!(node.entity() ; "{summary}");
        total_direct += summary.direct;
        total_forwarded += summary.forwarded;

        if args.dump_tables {
            println!("{table}");
        }
    }
    println!(
        "{} tables: {total_direct} direct entries, {total_forwarded} forwarded entries",
        platform.num_nodes()
    );

    if let Some(addr) = args.resolve {
        let owner = platform.address_map().owner_of(addr).map(|e| e.node);
        match owner {
            Some(owner) => println!("{addr:#x} belongs to node {owner}"),
            None => println!("{addr:#x} is not owned by any node"),
        }
        for node in platform.nodes() {
            match node.route(addr) {
                Ok(port) => println!("  from node {}: {port}", node.node()),
                Err(e) => println!("  from node {}: {e}", node.node()),
            }
        }
    }

    tracker.shutdown();
    Ok(())
}
