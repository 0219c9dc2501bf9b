//! Rerecord - determinism and performance tester for emulation cores
//!
//! Loads a ROM described by a JSON test script, replays a move sequence
//! against it and prints timing plus a hash of work RAM.
//!
//! # Usage
//!
//! ```bash
//! # Plain replay
//! rerecord test.json moves.txt
//!
//! # Save/restore around every step, write the final hash
//! rerecord test.json moves.txt --cycle-type Rerecord --hash-output-file hash.txt
//!
//! # Spin all cores for two seconds before timing
//! rerecord test.json moves.txt --warmup
//! ```
//!
//! Set `RUST_LOG=debug` for per-phase logging.

mod run;

use anyhow::Result;
use clap::Parser;

use rerecord_core::ReplayError;

/// Rerecord - determinism and performance tester for emulation cores
#[derive(Parser)]
#[command(name = "rerecord")]
#[command(about = "Replay a move sequence and report a determinism hash")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    run: run::RunArgs,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    run::execute(cli.run).inspect_err(|err| {
        if let Some(replay) = err.downcast_ref::<ReplayError>() {
            tracing::error!(class = ?replay.class(), "run aborted");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rerecord_core::CycleType;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rerecord", "test.json", "moves.txt"]).unwrap();
        assert_eq!(cli.run.script_file, PathBuf::from("test.json"));
        assert_eq!(cli.run.sequence_file, PathBuf::from("moves.txt"));
        assert_eq!(cli.run.cycle_type, CycleType::Simple);
        assert_eq!(cli.run.hash_output_file, None);
        assert!(!cli.run.warmup);
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "rerecord",
            "test.json",
            "moves.txt",
            "--cycle-type",
            "Rerecord",
            "--hash-output-file",
            "hash.txt",
            "--warmup",
        ])
        .unwrap();
        assert_eq!(cli.run.cycle_type, CycleType::Rerecord);
        assert_eq!(cli.run.hash_output_file, Some(PathBuf::from("hash.txt")));
        assert!(cli.run.warmup);
    }

    #[test]
    fn test_camel_case_aliases() {
        let cli = Cli::try_parse_from([
            "rerecord",
            "test.json",
            "moves.txt",
            "--cycleType",
            "Rerecord",
            "--hashOutputFile",
            "hash.txt",
        ])
        .unwrap();
        assert_eq!(cli.run.cycle_type, CycleType::Rerecord);
        assert_eq!(cli.run.hash_output_file, Some(PathBuf::from("hash.txt")));
    }

    #[test]
    fn test_rejects_unknown_cycle_type() {
        assert!(
            Cli::try_parse_from(["rerecord", "a", "b", "--cycle-type", "Rewind"]).is_err()
        );
    }

    #[test]
    fn test_requires_both_files() {
        assert!(Cli::try_parse_from(["rerecord", "test.json"]).is_err());
    }
}
