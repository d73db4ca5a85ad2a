// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `wire`: command-line tools for wire documents.
//!
//! - `normalize` rebuilds a document, runs the normalization rules and
//!   writes the derived wires back out.
//! - `nets` lists the nets of a document.
//! - `config` shows or resets the saved engine preferences.

mod doc;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wire_app_core::config::ConfigService;
use wire_app_core::prefs::{load_prefs, save_prefs, WirePrefs};
use wire_config_fs::FsConfigStore;
use wire_core::{ClusterId, EngineConfig, WireEngine};

use crate::doc::WireDoc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize schematic wire documents and inspect their nets")]
struct Cli {
    /// Preferences directory (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,
    /// Log more on stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild a document, normalize it and write the derived wires
    Normalize {
        /// Input document
        doc: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List the nets of a document
    Nets {
        /// Input document
        doc: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show or reset saved engine preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum ConfigAction {
    /// Print the preferences in effect
    Show,
    /// Restore and save the defaults
    Reset,
}

/// One row of `wire nets`.
#[derive(Debug, Serialize)]
struct NetRow {
    id: ClusterId,
    name: String,
    vertices: usize,
    edges: usize,
    pins: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let dir = cli.config_dir.as_deref();
    match cli.command {
        Command::Normalize { doc, output } => normalize(engine_config(dir), &doc, output.as_deref()),
        Command::Nets { doc, json } => nets(engine_config(dir), &doc, json),
        Command::Config { action } => config(&open_prefs(dir)?, action),
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn open_prefs(dir: Option<&Path>) -> Result<ConfigService<FsConfigStore>> {
    let store = match dir {
        Some(dir) => FsConfigStore::at(dir)?,
        None => FsConfigStore::new()?,
    };
    debug!(dir = %store.base().display(), "preferences store");
    Ok(ConfigService::new(store))
}

/// Engine settings from the saved preferences. Document commands still run
/// when the preferences cannot be read.
fn engine_config(dir: Option<&Path>) -> EngineConfig {
    let loaded = open_prefs(dir).and_then(|service| load_prefs(&service).map_err(Into::into));
    match loaded {
        Ok(prefs) => prefs.into(),
        Err(err) => {
            warn!(error = %err, "preferences unavailable; using defaults");
            EngineConfig::default()
        }
    }
}

fn build(config: EngineConfig, path: &Path) -> Result<(WireDoc, WireEngine)> {
    let doc = WireDoc::read(path)?;
    let mut engine = WireEngine::with_config(config);
    let report = engine.build(&doc.wires, &doc.pin_map());
    if report.skipped > 0 {
        warn!(skipped = report.skipped, "segments refer to pins missing from the pin table");
    }
    info!(loaded = report.loaded, nets = engine.nets().len(), "document built");
    Ok((doc, engine))
}

fn normalize(config: EngineConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let (doc, engine) = build(config, input)?;
    let normalized = WireDoc { pins: doc.pins, wires: engine.to_wires() };
    match output {
        Some(path) => {
            normalized.write(path)?;
            info!(path = %path.display(), "normalized document written");
        }
        None => writeln!(io::stdout().lock(), "{}", serde_json::to_string_pretty(&normalized)?)?,
    }
    Ok(())
}

fn nets(config: EngineConfig, input: &Path, json: bool) -> Result<()> {
    let (_, engine) = build(config, input)?;
    let rows: Vec<NetRow> = engine
        .nets()
        .into_iter()
        .map(|net| NetRow {
            id: net.id,
            pins: engine.pins_on_net(net.id).len(),
            name: net.name,
            vertices: net.vertex_count,
            edges: net.edge_count,
        })
        .collect();

    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["net", "name", "vertices", "edges", "pins"]);
    for row in &rows {
        table.add_row(vec![
            row.id.to_string(),
            row.name.clone(),
            row.vertices.to_string(),
            row.edges.to_string(),
            row.pins.to_string(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

fn config(service: &ConfigService<FsConfigStore>, action: ConfigAction) -> Result<()> {
    let prefs = match action {
        ConfigAction::Show => load_prefs(service)?,
        ConfigAction::Reset => {
            let defaults = WirePrefs::default();
            save_prefs(service, &defaults)?;
            info!(dir = %service.store().base().display(), "preferences reset");
            defaults
        }
    };
    writeln!(io::stdout().lock(), "{}", serde_json::to_string_pretty(&prefs)?)?;
    Ok(())
}
