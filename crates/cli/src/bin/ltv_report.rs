use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ltv_ingest::InputFormat;
use ltv_runtime::{init_tracing, run_pipeline, PipelineConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ltv_report")]
#[command(about = "Rank customers by simple lifetime value", long_about = None)]
struct Args {
    /// Event log to ingest
    #[arg(short, long, default_value = "input/input.txt")]
    input: PathBuf,

    /// Where the `customer_id, LTV` report is written
    #[arg(short, long, default_value = "output/output.txt")]
    output: PathBuf,

    /// Number of top customers to report
    #[arg(short = 'n', long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    top_n: u64,

    /// Input layout: `framed` dictionary literals or `ndjson`
    #[arg(long, default_value_t = InputFormat::Framed)]
    format: InputFormat,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    run(args).map_err(|err| {
        error!("ltv_report failed: {err:#}");
        err
    })
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig {
        input_path: args.input,
        output_path: args.output,
        top_n: usize::try_from(args.top_n)?,
        format: args.format,
    };
    info!(?config, "ltv_report starting");

    let summary = run_pipeline(&config)?;
    info!(
        customers = summary.metrics.customers,
        written = summary.results.len(),
        "ltv_report finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_fails_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "ltv_report",
            "--input",
            dir.path().join("absent.txt").to_str().unwrap(),
            "--output",
            dir.path().join("out.txt").to_str().unwrap(),
        ]);

        let err = run(args).unwrap_err();
        assert!(format!("{err:#}").contains("absent.txt"));
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn top_n_must_be_positive() {
        assert!(Args::try_parse_from(["ltv_report", "--top-n", "0"]).is_err());
    }
}
