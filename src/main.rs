//! esm-hmr CLI
//!
//! Replays captured notification streams (`text/event-stream`) through the
//! HMR client runtime.

use clap::{Parser, Subcommand};
use esm_hmr::hmr::{ImportSpecifier, ModuleLoader, ModuleNamespace, ReloadReason};
use esm_hmr::protocol::Notification;
use esm_hmr::transport::{parse_event_stream, TransportEvent};
use esm_hmr::{
    Dispatch, HmrConfig, ModuleId, ModuleRegistry, RunSummary, UpdateCoordinator, VERSION,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "esm-hmr")]
#[command(
    author,
    version,
    about = "Client-side runtime for the ESM Hot Module Replacement protocol",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a captured event stream and print each notification
    Decode {
        /// Stream file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Replay a captured event stream through the update coordinator
    Simulate {
        /// Stream file (stdin when omitted)
        file: Option<PathBuf>,
        /// Module URL that self-accepts updates
        #[arg(long = "accept", value_name = "URL")]
        accept: Vec<String>,
        /// Module URL that declines updates
        #[arg(long = "decline", value_name = "URL")]
        decline: Vec<String>,
        /// JSON configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode { file } => run_decode(file.as_deref()),
        Commands::Simulate {
            file,
            accept,
            decline,
            config,
        } => run_simulate(file.as_deref(), accept, decline, config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    let mut text = String::new();
    match file {
        Some(path) => text = std::fs::read_to_string(path)?,
        None => {
            std::io::stdin().read_to_string(&mut text)?;
        }
    }
    Ok(text)
}

fn run_decode(file: Option<&Path>) -> anyhow::Result<()> {
    let text = read_input(file)?;
    for event in parse_event_stream(&text) {
        let TransportEvent::Message(payload) = event else {
            continue;
        };
        match Notification::decode(&payload) {
            Ok(notification) => println!("{}", serde_json::to_string(&notification)?),
            Err(e) => println!("# {} ({})", e, payload),
        }
    }
    Ok(())
}

/// Stands in for the browser's module loader
///
/// "Evaluating" a module re-acquires its hot context and registers the
/// behavior requested on the command line.
struct SimulatedLoader {
    registry: ModuleRegistry,
    accept: Vec<ModuleId>,
    decline: Vec<ModuleId>,
}

impl SimulatedLoader {
    fn evaluate(&self, id: &ModuleId) {
        let hot = self.registry.acquire(id.clone());
        if self.accept.contains(id) {
            hot.accept();
        }
        if self.decline.contains(id) {
            hot.decline();
        }
    }
}

impl ModuleLoader for SimulatedLoader {
    async fn import(&self, specifier: &ImportSpecifier) -> anyhow::Result<ModuleNamespace> {
        self.evaluate(&specifier.id);
        Ok(ModuleNamespace::new().with_export("specifier", specifier.url()))
    }
}

fn run_simulate(
    file: Option<&Path>,
    accept: Vec<String>,
    decline: Vec<String>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => HmrConfig::from_file(path)?,
        None => HmrConfig::default(),
    };
    let events = parse_event_stream(&read_input(file)?);

    let host = Rc::new(|reason: &ReloadReason| println!("  -> full reload ({})", reason));
    let registry = ModuleRegistry::with_config(host, &config)?;
    let resolve = |urls: Vec<String>| -> esm_hmr::Result<Vec<ModuleId>> {
        urls.iter().map(|url| registry.resolve_id(url)).collect()
    };
    let loader = SimulatedLoader {
        registry: registry.clone(),
        accept: resolve(accept)?,
        decline: resolve(decline)?,
    };

    // Initial page load
    for id in loader.accept.iter().chain(&loader.decline) {
        loader.evaluate(id);
    }

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let summary = runtime.block_on(async move {
        let mut coordinator = UpdateCoordinator::new(registry, loader, config);
        let mut summary = RunSummary::default();
        for event in std::iter::once(TransportEvent::Open).chain(events) {
            if let TransportEvent::Message(payload) = &event {
                println!("{}", payload);
            }
            let dispatch = coordinator.handle_event(event).await;
            if let Dispatch::Applied(result) = &dispatch {
                println!(
                    "  -> applied {} (disposed {}, accepted {}, re-imported {})",
                    result.module_id, result.disposed, result.accepted, result.reimported
                );
            }
            summary.record(&dispatch);
        }
        summary
    });

    println!(
        "esm-hmr {}: {} events, {} applied, {} reloads, {} ignored",
        VERSION, summary.events, summary.applied, summary.reloads, summary.ignored
    );
    Ok(())
}
