use anyhow::Context;
use clap::{Parser, Subcommand};
use logkeep_core::config::Config;
use logkeep_core::digest::{SystemHealth, compose_digest, render_interactive, render_message};
use logkeep_core::ingest::{
    Diagnostic, IngestFailure, ingest_access, ingest_authfail, ingest_mail,
};
use logkeep_core::logging::{init_logging, stdout_is_interactive};
use logkeep_core::store::Store;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "logkeep",
    version,
    about = "Logkeep: server log ingestion and daily status digests"
)]
struct Cli {
    /// Path to the logkeep config file
    #[arg(short, long, default_value = "/etc/logkeep.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest web-server access-log lines from stdin
    Access,

    /// Ingest sshd authentication-failure lines from stdin
    Authfail,

    /// Ingest one delivered e-mail message from stdin
    Maillog,

    /// Compose and print the daily status digest
    Digest,
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("logkeep: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = Config::from_file(&cli.config).context("failed to load configuration")?;
    let store = Store::open(&cfg.database.path)?;
    tracing::debug!(database = %cfg.database.path.display(), "store opened");

    match cli.command {
        Command::Access => finish_ingest(ingest_access(&store, io::stdin().lock())),
        Command::Authfail => finish_ingest(ingest_authfail(&store, io::stdin().lock())),
        Command::Maillog => finish_ingest(ingest_mail(&store, io::stdin().lock())),
        Command::Digest => {
            let digest = compose_digest(&store, &cfg, &SystemHealth)?;
            if stdout_is_interactive() {
                println!("{}", render_interactive(&digest));
            } else {
                print!("{}", render_message(&digest, &cfg.digest.recipient));
            }
            Ok(())
        }
    }
}

/// On failure, write the single-line diagnostic record to stderr and exit
/// non-zero; nothing else is printed.
fn finish_ingest<T>(result: Result<T, IngestFailure>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(failure) => {
            Diagnostic::from_failure(&failure).emit(io::stderr().lock());
            std::process::exit(1);
        }
    }
}
