//! Notesync - replays an editing session against an in-memory note store.
//!
//! # Usage
//!
//! ```bash
//! notesync session.json
//! notesync --debounce-ms 120 --pretty session.json
//! notesync --trace-log sync.log session.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use notesync::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use notesync::perf;
use notesync::replay::{self, Script};

/// Replays an editing session and prints what reached the note store
#[derive(Parser, Debug)]
#[command(name = "notesync", version, about, long_about = None)]
struct Cli {
    /// Session script (JSON)
    #[arg(value_name = "SCRIPT", required_unless_present_any = ["save", "clear"])]
    script: Option<PathBuf>,

    /// Quiet period before an edit settles
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Origin tag passed to every created note
    #[arg(long)]
    origin: Option<String>,

    /// Write a timeline of sync events to a file
    #[arg(long, value_name = "PATH")]
    trace_log: Option<PathBuf>,

    /// Log controller decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Log timing of the replay
    #[arg(long)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    // Initialize logging
    let level = if effective.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let mut filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    if effective.perf {
        filter = filter.add_directive("notesync::perf=info".parse()?);
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    perf::set_enabled(effective.perf);
    let trace_log_path = effective
        .trace_log
        .clone()
        .or_else(|| std::env::var_os("NOTESYNC_TRACE_LOG").map(PathBuf::from));
    if let Some(path) = &trace_log_path
        && let Err(err) = perf::open_timeline(path)
    {
        tracing::warn!(path = %path.display(), %err, "failed to initialize trace log");
    }

    let Some(script_path) = cli.script else {
        return Ok(());
    };
    let script = Script::load(&script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    let report = replay::run_script(&script, &effective.sync_config());
    match perf::close_timeline() {
        Ok(Some(events)) => tracing::debug!(events, "trace log written"),
        Ok(None) => {}
        Err(err) => tracing::warn!(%err, "failed to flush trace log"),
    }
    println!("{}", report.to_json(effective.pretty)?);

    if !report.errors.is_empty() {
        anyhow::bail!("{} store request(s) failed", report.errors.len());
    }
    Ok(())
}
