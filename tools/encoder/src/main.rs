//! Thin front-end over the `strictyaml` crate, with an interface compatible with the reference
//! test suite: StrictYAML in, structural form (or YAML, or performance statistics) out.

use std::io::Read;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

// The test suite only knows two exit codes (0 on success, 1 on any error) and reads everything,
// errors included, from stdout. Clap's built-in help and usage errors use their own exit codes
// and stderr, so both are handled by hand.
#[derive(Debug, Parser)]
#[command(name = "encoder")]
#[command(about = "StrictYAML decoder with a test-suite compatible interface")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Input file, or '-' to read from stdin
    input: Option<String>,

    /// Dump the parsed document back as YAML (default: structural form)
    #[arg(short = 'd')]
    dump_yaml: bool,

    /// Dump parsing and emission performance statistics instead of the document
    #[arg(short = 'n')]
    stats: bool,

    /// Print the help and exit
    #[arg(short = 'h', long = "help")]
    help: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.help {
        print_help();
        return ExitCode::FAILURE;
    }
    let Some(input) = cli.input.as_deref() else {
        println!(
            "Error: one and only one way to get the input text shall be provided ('-' or a filename)"
        );
        return ExitCode::FAILURE;
    };
    match run(&cli, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The test suite reads errors from stdout.
            println!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("This tool is a StrictYAML decoder with an interface compatible with the test suite.");
    println!("Syntax: encoder [options] [ YAML filename or '-' ]");
    println!("  Providing '-' as a filename reads the input from stdin.");
    println!();
    println!("Options:");
    println!(" -d    Dump on stdout the parsed document as YAML. Default is the structural form.");
    println!(" -n    Dump on stdout performance statistics on parsing and emission");
    println!(" -h    This help");
}

fn run(cli: &Cli, input_name: &str) -> Result<()> {
    let input = if input_name == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("unable to read from stdin")?;
        text
    } else {
        std::fs::read_to_string(input_name)
            .with_context(|| format!("unable to load the file '{input_name}'"))?
    };

    let rss_before = resident_bytes();
    let parse_start = Instant::now();
    let doc = strictyaml::parse(&input)?;
    let parse_time = parse_start.elapsed();
    let rss_after = resident_bytes();

    if cli.stats {
        let yaml_start = Instant::now();
        let _yaml = doc.as_yaml();
        let yaml_time = yaml_start.elapsed();

        let struct_start = Instant::now();
        let _structural = doc.as_structural(false);
        let struct_time = struct_start.elapsed();

        let bytes = input.len() as f64;
        println!("  Document   : {:.1} KB", 0.001 * bytes);
        println!(
            "  Load speed : {:.3} MB/s ({:.3} ms)",
            bytes / parse_time.as_micros().max(1) as f64,
            parse_time.as_secs_f64() * 1e3,
        );
        println!(
            "  Emit YAML  : {:.3} MB/s ({:.3} ms)",
            bytes / yaml_time.as_micros().max(1) as f64,
            yaml_time.as_secs_f64() * 1e3,
        );
        println!(
            "  Emit struct: {:.3} MB/s ({:.3} ms)",
            bytes / struct_time.as_micros().max(1) as f64,
            struct_time.as_secs_f64() * 1e3,
        );
        if let (Some(before), Some(after)) = (rss_before, rss_after) {
            let used = after.saturating_sub(before) as f64;
            println!(
                "  Mem factor : {:.1}x the input size ({:.1} MB)",
                used / bytes.max(1.0),
                1e-6 * used,
            );
        }
    } else if cli.dump_yaml {
        println!("{}", doc.as_yaml());
    } else {
        println!("{}", doc.as_structural(true));
    }
    Ok(())
}

/// Resident set size in bytes, when the platform exposes it.
#[cfg(target_os = "linux")]
fn resident_bytes() -> Option<u64> {
    const PAGE_SIZE: u64 = 4096;
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * PAGE_SIZE)
}

#[cfg(not(target_os = "linux"))]
fn resident_bytes() -> Option<u64> {
    None
}
