//! Standalone benchmark runner for the thspl property engine.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use thspl_bench::{BenchmarkSuite, default_benchmarks, run_scenario};
use thspl_core::timing::{enable_timing, query_timing};
use thspl_water::WaterEngine;

const RUNS: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Repo root is two levels up from the crate root.
    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();

    println!("thspl Benchmark Suite");
    println!("=====================\n");
    println!("Repo root: {}", repo_root.display());

    enable_timing();
    let engine = WaterEngine::bundled()?;
    println!("Table fingerprint: {}\n", engine.fingerprint());

    let benchmarks = default_benchmarks();
    println!(
        "Running {} benchmarks, {RUNS} runs each...\n",
        benchmarks.len()
    );

    let mut results = Vec::new();

    for (idx, scenario) in benchmarks.iter().enumerate() {
        print!("[{}/{}] {} ... ", idx + 1, benchmarks.len(), scenario.name);
        std::io::Write::flush(&mut std::io::stdout())?;

        match run_scenario(&engine, scenario, RUNS) {
            Ok(result) => {
                println!("OK ({:.4}s median)", result.aggregate.total_time_median_s);
                results.push(result);
            }
            Err(e) => {
                println!("FAILED");
                eprintln!("  Error: {}", e);
            }
        }
    }

    println!("\n=====================");
    println!("Benchmark Results Summary");
    println!("=====================\n");

    for result in &results {
        let agg = &result.aggregate;
        println!("{}", result.scenario.name);
        println!("  Workload: {:?}", result.scenario.workload);
        println!(
            "  Time:      {:.4}s (median), min: {:.4}s, max: {:.4}s",
            agg.total_time_median_s, agg.total_time_min_s, agg.total_time_max_s
        );
        println!("  Rate:      {:.3e} points/s (median)", agg.points_per_second_median);
        if agg.failures_total > 0 {
            println!("  Failures:  {} (total)", agg.failures_total);
        }
        if agg.clamped_total > 0 {
            println!("  Clamped:   {} (total)", agg.clamped_total);
        }
        println!();
    }

    query_timing::print_summary();

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();
    let baseline_json = serde_json::to_string_pretty(&BenchmarkSuite {
        timestamp: format!("timestamp_{}", timestamp),
        table_fingerprint: engine.fingerprint().to_string(),
        results,
    })?;

    let baseline_dir = repo_root.join("benchmarks");
    fs::create_dir_all(&baseline_dir)?;
    let baseline_path = baseline_dir.join("baseline.json");
    fs::write(&baseline_path, baseline_json)?;

    println!("Baseline saved to: {}", baseline_path.display());

    Ok(())
}
