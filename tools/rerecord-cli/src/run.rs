//! Replay command - load, replay, report
//!
//! Orchestrates: script → ROM and state → sequence → (warm-up) → replay

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use rerecord_core::{
    CycleType, HarnessConfig, ReferenceCore, ReplayHarness, ReplaySequence, RunReport,
    RunSummary, TestScript, WARMUP_DURATION, warm_up,
};

/// Arguments for a replay run
#[derive(Args)]
pub struct RunArgs {
    /// JSON test script (ROM, controllers, state options)
    pub script_file: PathBuf,

    /// Whitespace-separated move tokens
    pub sequence_file: PathBuf,

    /// Per-step cycle: Simple or Rerecord
    #[arg(long, alias = "cycleType", default_value = "Simple")]
    pub cycle_type: CycleType,

    /// Write the final state hash to this file
    #[arg(long, alias = "hashOutputFile")]
    pub hash_output_file: Option<PathBuf>,

    /// Busy-wait on every core for two seconds before timing
    #[arg(long)]
    pub warmup: bool,
}

/// Execute a replay run
pub fn execute(args: RunArgs) -> Result<()> {
    let script = TestScript::from_file(&args.script_file).with_context(|| {
        format!("Failed to load test script: {}", args.script_file.display())
    })?;

    let mut config = HarnessConfig::from_script(&script, args.cycle_type);
    if let Some(path) = &args.hash_output_file {
        config = config.with_hash_output_file(path);
    }

    let mut harness = ReplayHarness::new(ReferenceCore::new(), config);
    let summary = harness
        .load_files(&script.rom_file, script.initial_state_file.as_deref())
        .with_context(|| format!("Failed to load ROM: {}", script.rom_file.display()))?;

    let sequence = ReplaySequence::from_file(&args.sequence_file, harness.parser())
        .with_context(|| {
            format!(
                "Failed to load sequence file: {}",
                args.sequence_file.display()
            )
        })?;

    print_summary(&args, &summary, &sequence);

    if args.warmup {
        println!("Warming up...");
        warm_up(WARMUP_DURATION);
    }

    println!("Running...");
    let report = harness.run(&sequence).context("Replay failed")?;
    print_report(&report);

    if let Some(path) = &args.hash_output_file {
        println!("Hash written to: {}", path.display());
    }

    Ok(())
}

fn print_summary(args: &RunArgs, summary: &RunSummary, sequence: &ReplaySequence) {
    let disabled = if summary.disabled_blocks.is_empty() {
        "(none)".to_string()
    } else {
        summary.disabled_blocks.join(", ")
    };

    println!("=== Run Summary ===");
    println!("Script:          {}", args.script_file.display());
    println!("Cycle type:      {}", summary.cycle_type);
    println!("Emulation core:  {}", summary.core_name);
    println!("ROM SHA1:        {}", summary.rom_sha1);
    println!("Controller 1:    {}", summary.controllers[0]);
    println!("Controller 2:    {}", summary.controllers[1]);
    println!("Sequence file:   {}", args.sequence_file.display());
    println!("Sequence length: {}", sequence.len());
    println!("State size:      {} bytes", summary.state_size);
    println!("Disabled blocks: {}", disabled);

    match &summary.differential {
        Some(diff) => {
            println!("Differential:    enabled");
            println!("  Max differences: {}", diff.settings.max_differences);
            println!("  Compression:     {}", diff.settings.compress);
            println!("  Fixed size:      {} bytes", diff.fixed_size);
            println!("  Full size:       {} bytes", diff.full_size);
        }
        None => println!("Differential:    disabled"),
    }
    println!();
}

fn print_report(report: &RunReport) {
    println!();
    println!("=== Results ===");
    println!("Steps:        {}", report.steps);
    println!("Elapsed time: {:.3}s", report.elapsed.as_secs_f64());
    println!("Performance:  {:.0} inputs / s", report.inputs_per_second());
    if let Some(max) = report.max_differential_size {
        println!("Max differential state size: {} bytes", max);
    }
    println!("Final state hash: {}", report.fingerprint);
}
