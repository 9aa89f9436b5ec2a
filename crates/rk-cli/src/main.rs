use anyhow::{bail, Result};
use log::LevelFilter;

use rk_cli::config::suite_from_matches;
use rk_cli::{build_cli, run, Operation, RunConfig, RunRecord};
use rk_tensor::CpuBackend;

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "error,rk=info",
        1 => "error,rk=debug",
        _ => "error,rk=trace",
    };
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("RK_LOG", default_filter))
        .init();
}

fn print_text(config: &RunConfig, record: &RunRecord) {
    match config.op {
        Operation::Matmul { .. } => {
            println!("Matrix multiplication execution completed on CPU.");
            println!("C[0][0] = {}", record.first_value);
        }
        Operation::Conv2d { .. } => {
            println!("CPU conv2d complete");
            println!("output[0][0] = {}", record.first_value);
        }
    }
    println!(
        "Completed in {:.3} ms (median of {} runs).",
        record.cpu_runtime_ms, record.reps
    );
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some((name @ ("matmul" | "conv2d"), sub)) => {
            let config = RunConfig::from_matches(name, sub)?;
            if !config.json {
                match config.op {
                    Operation::Matmul { n } => {
                        println!("Starting matrix multiplication of size {}x{}...", n, n)
                    }
                    Operation::Conv2d { n, k } => println!(
                        "Starting conv2d of a {}x{} input with a {}x{} kernel...",
                        n, n, k, k
                    ),
                }
            }
            let record = run(&config)?;
            if config.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_text(&config, &record);
            }
        }
        Some(("check", sub)) => {
            let suite = suite_from_matches(sub)?;
            let report = suite.run(&CpuBackend::new());
            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(()) => println!("ok      {}", outcome.name),
                    Err(e) => println!("FAILED  {}: {}", outcome.name, e),
                }
            }
            let failed = report.failures().count();
            if failed > 0 {
                bail!("{} of {} checks failed", failed, report.outcomes.len());
            }
            println!("all {} checks passed on '{}'", report.outcomes.len(), report.backend);
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}
