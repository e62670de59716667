//! varsave-svc — entry point.
//!
//! This binary connects to the external variable registry, resolves the
//! configured trigger variable, registers for "modified" notifications on
//! it, and then runs the trigger-listener loop for the life of the
//! process.  Each relevant notification produces exactly one atomic save
//! cycle writing the dirty variable set to the configured file.
//!
//! # Usage
//!
//! ```text
//! varsave-svc [OPTIONS]
//!
//! Options:
//!   -f, --file <PATH>       output configuration file [default: /tmp/usersettings.cfg]
//!   -t, --trigger <NAME>    trigger variable name [default: /sys/config/save]
//!       --socket <PATH>     registry server socket [default: /run/varregistry.sock]
//!   -v, --verbose           announce each save cycle
//!   -h, --help              print help
//! ```
//!
//! # Environment variable overrides
//!
//! The CLI defaults can also be overridden with environment variables.
//! CLI args take precedence when both are present.
//!
//! | Variable          | Default                  | Description              |
//! |-------------------|--------------------------|--------------------------|
//! | `VARSAVE_FILE`    | `/tmp/usersettings.cfg`  | Output file path         |
//! | `VARSAVE_TRIGGER` | `/sys/config/save`       | Trigger variable name    |
//! | `VARSAVE_SOCKET`  | `/run/varregistry.sock`  | Registry socket path     |
//!
//! # What happens at startup
//!
//! 1. `tracing_subscriber` is initialised; the log level is controlled by
//!    the `RUST_LOG` environment variable (default `info`).
//! 2. CLI arguments are parsed with `clap`.
//! 3. The registry socket is connected; failure here is fatal.
//! 4. The trigger variable name is resolved to a handle and a "modified"
//!    watch is registered for it; failure at either step is fatal — the
//!    listener never starts.
//! 5. The listener loop runs until the registry connection is lost or a
//!    termination signal (SIGINT/SIGTERM) arrives.  The signal path closes
//!    the registry connection and exits with status 1.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use varsave_svc::application::persist::PersistConfigUseCase;
use varsave_svc::application::registry::VariableRegistry;
use varsave_svc::application::trigger::TriggerListener;
use varsave_svc::infrastructure::registry::socket::SocketRegistry;
use varsave_svc::infrastructure::storage::AtomicConfigFile;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Variable save service.
///
/// Waits for a "modified" notification on the trigger variable and writes
/// every dirty registry variable to the output file, atomically.
#[derive(Debug, Parser)]
#[command(
    name = "varsave-svc",
    about = "Persists dirty registry variables to a configuration file on trigger",
    version
)]
struct Cli {
    /// Output configuration file.
    ///
    /// The file is published atomically: readers always see either the
    /// previous complete snapshot or the new one.
    #[arg(
        short = 'f',
        long = "file",
        default_value = "/tmp/usersettings.cfg",
        env = "VARSAVE_FILE"
    )]
    file: PathBuf,

    /// Trigger variable name.
    ///
    /// A save cycle runs each time this variable is modified.
    #[arg(
        short = 't',
        long = "trigger",
        default_value = "/sys/config/save",
        env = "VARSAVE_TRIGGER"
    )]
    trigger: String,

    /// Path of the variable registry server's Unix domain socket.
    #[arg(long, default_value = "/run/varregistry.sock", env = "VARSAVE_SOCKET")]
    socket: PathBuf,

    /// Announce each save cycle and its outcome.
    #[arg(short = 'v', long)]
    verbose: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        "varsave-svc starting — file={}, trigger={}",
        cli.file.display(),
        cli.trigger
    );

    // ── Registry setup: every failure here is fatal ───────────────────────────
    let mut registry = SocketRegistry::connect(&cli.socket)
        .await
        .with_context(|| format!("cannot open variable registry at {}", cli.socket.display()))?;

    let trigger = registry
        .find_variable(&cli.trigger)
        .await
        .with_context(|| format!("cannot find trigger variable: {}", cli.trigger))?;

    registry
        .watch_modified(trigger)
        .await
        .with_context(|| format!("notification request failed for {}", cli.trigger))?;

    let persister = PersistConfigUseCase::new(Arc::new(AtomicConfigFile::new(cli.file.clone())));
    let listener = TriggerListener::new(trigger, cli.trigger.clone(), cli.verbose);

    // SIGTERM stream (SIGINT is covered by ctrl_c below).
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("cannot install SIGTERM handler")?;

    info!("waiting for save triggers on {}", cli.trigger);

    // ── Main loop ─────────────────────────────────────────────────────────────
    //
    // The listener normally never returns; it parks in the registry event
    // wait between cycles.  The select resolves either when that wait fails
    // (registry gone — fatal) or when a termination signal arrives.
    let terminated = tokio::select! {
        result = listener.run(&mut registry, &persister) => {
            result.context("lost connection to variable registry")?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
        _ = sigterm.recv() => true,
    };

    if terminated {
        // Forced shutdown: release the registry connection and exit.  No
        // attempt is made to complete or roll back an in-flight cycle —
        // the temp-then-rename protocol already guarantees the canonical
        // file is sound.
        error!("abnormal termination of varsave-svc");
        registry.close().await;
        std::process::exit(1);
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_documented_values() {
        let cli = Cli::parse_from(["varsave-svc"]);
        assert_eq!(cli.file, PathBuf::from("/tmp/usersettings.cfg"));
        assert_eq!(cli.trigger, "/sys/config/save");
        assert_eq!(cli.socket, PathBuf::from("/run/varregistry.sock"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_short_file_option_overrides_default() {
        let cli = Cli::parse_from(["varsave-svc", "-f", "/etc/settings.cfg"]);
        assert_eq!(cli.file, PathBuf::from("/etc/settings.cfg"));
    }

    #[test]
    fn test_cli_short_trigger_option_overrides_default() {
        let cli = Cli::parse_from(["varsave-svc", "-t", "/sys/config/commit"]);
        assert_eq!(cli.trigger, "/sys/config/commit");
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["varsave-svc", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_socket_override() {
        let cli = Cli::parse_from(["varsave-svc", "--socket", "/tmp/reg.sock"]);
        assert_eq!(cli.socket, PathBuf::from("/tmp/reg.sock"));
    }
}
