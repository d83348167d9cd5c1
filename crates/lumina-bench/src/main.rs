use std::path::PathBuf;
use std::process;

use lumina_bench::report;
use lumina_bench::runner::BenchmarkRunner;
use lumina_bench::scenes;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut frame_count = 60u32;
    let mut preset = String::from("quality");
    let mut use_gpu = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--baseline" => {
                baseline_path = Some(PathBuf::from(flag_value(&args, &mut i)));
            }
            "--output" => {
                output_path = Some(PathBuf::from(flag_value(&args, &mut i)));
            }
            "--regression-threshold" => {
                regression_threshold = parse_flag(&args, &mut i, "--regression-threshold");
            }
            "--frames" => {
                frame_count = parse_flag(&args, &mut i, "--frames");
            }
            "--preset" => {
                preset = flag_value(&args, &mut i).to_string();
            }
            "--gpu" => use_gpu = true,
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                eprintln!("  --frames <n>                   Frames per scene (default: 60)");
                eprintln!("  --preset <fast|quality>        Kernel preset (default: quality)");
                eprintln!("  --gpu                          Time the wgpu light pass instead of the CPU evaluator");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match lumina_presets::load_builtin(&preset) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("Preset '{}' failed to load: {}", preset, e);
            process::exit(1);
        }
        None => {
            eprintln!(
                "Unknown preset '{}', expected one of {:?}",
                preset,
                lumina_presets::BUILTIN_PRESET_NAMES
            );
            process::exit(1);
        }
    };

    let mut runner = BenchmarkRunner::new(frame_count, &preset, config);
    if use_gpu {
        log::info!("Initializing GPU...");
        runner = match runner.with_gpu() {
            Ok(runner) => runner,
            Err(e) => {
                eprintln!("GPU initialization failed: {}", e);
                process::exit(1);
            }
        };
    }

    let mut results = Vec::new();
    for scene in &scenes::standard_scenes() {
        match runner.run_scene(scene) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("Scene '{}' failed: {}", scene.name, e);
                process::exit(1);
            }
        }
    }

    // Print markdown summary
    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    // Save output baseline
    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_timestamp(),
            results: results.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            eprintln!("Failed to save baseline {}: {}", path.display(), e);
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    // Compare against baseline
    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

fn flag_value<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(value) => value,
        None => {
            eprintln!("Missing value for {}", args[*i - 1]);
            process::exit(1);
        }
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], i: &mut usize, name: &str) -> T {
    let value = flag_value(args, i);
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {} value: {}", name, value);
        process::exit(1);
    })
}

/// Seconds since the Unix epoch, without pulling in a date crate.
fn run_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{}", secs)
}
