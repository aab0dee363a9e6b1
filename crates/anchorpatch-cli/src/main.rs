mod config;

use anchorpatch_core::{parse, DiskFs, Executor, Operation, Outcome, Overlay, Report};
use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{load_config, Args};
use log::LevelFilter;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

/// `Ok(false)` when at least one operation failed.
fn run(args: &Args) -> Result<bool> {
    let config = load_config(args)?;
    let patch_content = read_patch(args)?;
    let operations = parse(&patch_content).context("Could not parse patch")?;

    if operations.is_empty() {
        println!("No operations found in the patch.");
        return Ok(true);
    }

    let disk = DiskFs::new(args.root.clone());
    let report = if args.dry_run {
        let mut executor = Executor::new(Overlay::new(disk), config);
        let report = executor.execute(&operations);
        let pending = executor.filesystem().changes().len();
        println!("\n[DRY RUN] {} file(s) would change, nothing was written.", pending);
        report
    } else {
        Executor::new(disk, config).execute(&operations)
    };

    print_report(&operations, &report, args.dry_run);
    Ok(report.all_applied())
}

fn read_patch(args: &Args) -> Result<String> {
    let content = if let Some(text) = &args.patch {
        text.clone()
    } else if let Some(path) = &args.patch_file {
        fs::read_to_string(path)
            .with_context(|| format!("Patch file not found at {:?}", path))?
    } else {
        if atty::is(atty::Stream::Stdin) {
            bail!("No patch file specified and no data piped from stdin.");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read patch from stdin")?;
        buffer
    };

    if content.trim().is_empty() {
        bail!("Empty patch content.");
    }
    Ok(content)
}

fn print_report(operations: &[Operation], report: &Report, dry_run: bool) {
    let tag = if dry_run { "DRY RUN" } else { "SUCCESS" };
    for (op, entry) in operations.iter().zip(&report.operations) {
        println!("{} {}", entry.kind, entry.describe_paths());
        match &entry.outcome {
            Outcome::Applied => match op {
                Operation::Update { hunks, .. } => {
                    println!("    [{tag}] {} hunk(s) applied.", hunks.len())
                }
                _ => println!("    [{tag}] Done."),
            },
            Outcome::Failed(e) => println!("    [FAILED] {}", e),
        }
    }

    println!("\n--- Summary ---");
    println!("Total operations:     {}", report.operations.len());
    println!("Successfully applied: {}", report.applied_count());
    println!("Failed to apply:      {}", report.failed_count());
}
