use std::path::Path;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Load a baseline from a JSON file. Returns None if the file doesn't exist.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Compare current results against a baseline. Returns a list of regressions
/// (scene name, percent change) where the threshold is exceeded. Scenes are
/// matched on name, backend and preset.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<(String, f64)> {
    let mut regressions = Vec::new();

    for result in current {
        if let Some(base) = baseline.results.iter().find(|b| {
            b.scene_name == result.scene_name
                && b.backend == result.backend
                && b.preset == result.preset
        }) {
            if base.timings.mean_ms <= 0.0 {
                continue;
            }
            let pct_change =
                (result.timings.mean_ms - base.timings.mean_ms) / base.timings.mean_ms * 100.0;
            if pct_change > threshold_pct {
                regressions.push((result.scene_name.clone(), pct_change));
            }
        }
    }

    regressions
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Backend | Preset | Occluders | Resolution | Mean (ms) | Median (ms) | P95 (ms) | P99 (ms) | Min (ms) | Max (ms) |\n");
    out.push_str("|-------|---------|--------|-----------|------------|-----------|-------------|----------|----------|----------|----------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {}x{} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
            r.scene_name,
            r.backend,
            r.preset,
            r.occluders,
            r.resolution[0],
            r.resolution[1],
            r.timings.mean_ms,
            r.timings.median_ms,
            r.timings.p95_ms,
            r.timings.p99_ms,
            r.timings.min_ms,
            r.timings.max_ms,
        ));
    }

    out
}

/// Format a comparison report showing regressions.
pub fn format_comparison(regressions: &[(String, f64)], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!(
            "All scenes within {:.0}% threshold. No regressions detected.\n",
            threshold_pct
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        "REGRESSIONS DETECTED (>{:.0}% threshold):\n",
        threshold_pct
    ));
    for (scene, pct) in regressions {
        out.push_str(&format!("  - {}: +{:.1}%\n", scene, pct));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::compute_timings;

    fn result(scene: &str, backend: &str, mean: f64) -> BenchmarkResult {
        BenchmarkResult {
            scene_name: scene.to_string(),
            backend: backend.to_string(),
            preset: "quality".to_string(),
            occluders: 16,
            resolution: [1280, 720],
            frame_count: 1,
            timings: compute_timings(&[mean]),
        }
    }

    #[test]
    fn test_compare_flags_regressions_over_threshold() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("sparse", "cpu", 10.0), result("dense", "cpu", 10.0)],
        };
        let current = vec![result("sparse", "cpu", 10.5), result("dense", "cpu", 12.0)];
        let regressions = compare(&current, &baseline, 10.0);
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].0, "dense");
        assert!((regressions[0].1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_ignores_other_backend() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("sparse", "gpu", 1.0)],
        };
        let current = vec![result("sparse", "cpu", 50.0)];
        assert!(compare(&current, &baseline, 10.0).is_empty());
    }

    #[test]
    fn test_format_markdown_has_row_per_result() {
        let md = format_markdown(&[result("empty", "cpu", 1.0), result("packed", "cpu", 2.0)]);
        assert_eq!(md.lines().count(), 4);
        assert!(md.contains("| packed | cpu | quality | 16 | 1280x720 | 2.00 |"));
    }

    #[test]
    fn test_format_comparison() {
        assert!(format_comparison(&[], 10.0).contains("No regressions"));
        let out = format_comparison(&[("dense".into(), 25.0)], 10.0);
        assert!(out.contains("dense: +25.0%"));
    }

    #[test]
    fn test_baseline_save_and_load() {
        let dir = std::env::temp_dir().join(format!("lumina-bench-{}", std::process::id()));
        let path = dir.join("baseline.json");
        let baseline = Baseline {
            timestamp: "bench-1".into(),
            results: vec![result("medium", "cpu", 3.0)],
        };
        save_baseline(&path, &baseline).unwrap();
        let loaded = load_baseline(&path).unwrap();
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].timings, baseline.results[0].timings);
        std::fs::remove_dir_all(&dir).ok();
        assert!(load_baseline(&path).is_none());
    }
}
