use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tapline_web::SessionTrace;
use tracing::info;

use crate::config::TaplineConfig;
use crate::error::{HarnessError, Result};
use crate::session::replay_list_session;

#[derive(Debug, Parser)]
#[command(
    name = "tapline",
    about = "Replay recorded pointer sessions through the tapline gesture engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSONL pointer trace and print what it produced.
    Replay(ReplayArgs),

    /// Print or check a configuration file.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Trace file (`tapline-trace-v1` JSONL).
    pub trace: PathBuf,

    /// TOML or JSON configuration; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print the default configuration as TOML.
    #[arg(long, conflicts_with = "check")]
    pub defaults: bool,

    /// Load and validate a configuration file.
    #[arg(long, value_name = "FILE")]
    pub check: Option<PathBuf>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

/// Run `cli`, writing command output to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(args, out),
        Commands::Config(args) => run_config(args, out),
    }
}

fn run_replay(args: ReplayArgs, out: &mut impl Write) -> Result<()> {
    if !args.trace.exists() {
        return Err(HarnessError::MissingPath { path: args.trace });
    }
    let config = match &args.config {
        Some(path) => TaplineConfig::load(path)?,
        None => TaplineConfig::default(),
    };
    let trace = SessionTrace::from_file(&args.trace)?;
    info!(trace = %args.trace.display(), records = trace.records.len(), "replaying trace");

    let report = replay_list_session(&trace, &config)?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        out.write_all(report.render_text().as_bytes())?;
    }
    Ok(())
}

fn run_config(args: ConfigArgs, out: &mut impl Write) -> Result<()> {
    match (args.defaults, args.check) {
        (true, _) => {
            out.write_all(TaplineConfig::default().to_toml_string()?.as_bytes())?;
        }
        (false, Some(path)) => {
            TaplineConfig::load(&path)?;
            writeln!(out, "{}: ok", path.display())?;
        }
        (false, None) => {
            return Err(HarnessError::invalid(
                "config needs --defaults or --check <FILE>",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands, ConfigArgs, execute};
    use crate::error::HarnessError;

    #[test]
    fn parses_replay_flags() {
        let cli = Cli::try_parse_from(["tapline", "replay", "s.jsonl", "--json", "--config", "c.toml"])
            .expect("parse");
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert!(args.json);
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("c.toml")));
    }

    #[test]
    fn defaults_and_check_conflict() {
        let result = Cli::try_parse_from(["tapline", "config", "--defaults", "--check", "x.toml"]);
        assert!(result.is_err());
    }

    #[test]
    fn config_without_mode_is_invalid_argument() {
        let mut out = Vec::new();
        let error = execute(
            Cli {
                command: Commands::Config(ConfigArgs {
                    defaults: false,
                    check: None,
                }),
            },
            &mut out,
        )
        .expect_err("needs a mode");
        assert!(matches!(error, HarnessError::InvalidArgument { .. }));
        assert_eq!(error.exit_code(), 64);
    }

    #[test]
    fn config_defaults_prints_toml() {
        let mut out = Vec::new();
        execute(
            Cli::try_parse_from(["tapline", "config", "--defaults"]).expect("parse"),
            &mut out,
        )
        .expect("run");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("[reorder]"));
        assert!(text.contains("activation_delay_ms = 120"));
    }
}
