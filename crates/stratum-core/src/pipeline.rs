//! Sequential phase orchestrator with timing.

use log::info;
use std::collections::HashMap;
use std::time::Instant;

use crate::aggregate::Aggregate;
use crate::config::{AnalysisConfig, AnalysisInput, AnalysisResult};
use crate::naming::{load_namer, DisplayNamer};
use crate::output::build_result;
use crate::phases;

/// Phase labels for progress reporting.
const PHASE_LABELS: &[(&str, &str)] = &[
    ("graph", "Building module graph"),
    ("communities", "Detecting communities"),
    ("metrics", "Computing community metrics"),
    ("activity", "Measuring commit activity"),
    ("architecture", "Checking architecture rules"),
];

/// Progress callback type: (phase_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

/// Type alias for phase closures to keep signatures readable.
type PhaseFn<'a> = Box<dyn FnOnce(&AnalysisConfig, &mut Aggregate) + 'a>;

/// Wall-clock seconds spent in each phase.
pub type PhaseTimings = HashMap<String, f64>;

/// Run every phase over `input` and return the enriched aggregate.
///
/// The word-vector namer is loaded from `config.vectors_path` when set.
pub fn run_phases(
    config: &AnalysisConfig,
    input: &AnalysisInput,
    progress_callback: Option<ProgressCallback>,
) -> (Aggregate, PhaseTimings) {
    let namer = load_namer(config);
    run_phases_with_namer(config, input, namer.as_deref(), progress_callback)
}

/// Run every phase with an explicit community namer.
pub fn run_phases_with_namer(
    config: &AnalysisConfig,
    input: &AnalysisInput,
    namer: Option<&dyn DisplayNamer>,
    mut progress_callback: Option<ProgressCallback>,
) -> (Aggregate, PhaseTimings) {
    let mut agg = Aggregate::new();
    let mut timings = PhaseTimings::new();

    let phase_fns: Vec<(&str, PhaseFn)> = vec![
        (
            "graph",
            Box::new(|config, agg| phases::graph::run_graph_phase(config, &input.files, agg)),
        ),
        (
            "communities",
            Box::new(|config, agg| phases::communities::run_communities_phase(config, agg)),
        ),
        (
            "metrics",
            Box::new(|config, agg| phases::metrics::run_metrics_phase(config, agg, namer)),
        ),
        (
            "activity",
            Box::new(|config, agg| {
                phases::activity::run_activity_phase(config, &input.files, agg)
            }),
        ),
        (
            "architecture",
            Box::new(|config, agg| {
                phases::architecture::run_architecture_phase(config, &input.predictions, agg)
            }),
        ),
    ];

    for (name, phase_fn) in phase_fns {
        if let Some(ref mut cb) = progress_callback {
            let label = PHASE_LABELS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, l)| *l)
                .unwrap_or(name);
            cb(name, label);
        }

        let start = Instant::now();
        phase_fn(config, &mut agg);
        let elapsed = start.elapsed().as_secs_f64();
        info!("phase {name} finished in {:.1} ms", elapsed * 1000.0);
        timings.insert(name.to_string(), elapsed);
    }

    (agg, timings)
}

/// Execute the five-phase analysis pipeline and return the result.
pub fn run_pipeline(
    config: &AnalysisConfig,
    input: &AnalysisInput,
    progress_callback: Option<ProgressCallback>,
) -> AnalysisResult {
    let total_start = Instant::now();
    let (agg, timings) = run_phases(config, input, progress_callback);
    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    build_result(config, input, agg, &timings, total_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyzedFile, Dependency};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn input() -> AnalysisInput {
        AnalysisInput {
            files: vec![AnalyzedFile {
                path: "src/Http/Web/Home.php".to_string(),
                namespace: Some("App\\Http\\Web".to_string()),
                dependencies: vec![Dependency {
                    from: "App\\Http\\Web\\Home".to_string(),
                    to: "App\\Domain\\User\\Entity".to_string(),
                }],
                commits: None,
            }],
            predictions: Vec::new(),
        }
    }

    #[test]
    fn phases_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |phase, label| {
            sink.borrow_mut().push(format!("{phase}:{label}"));
        });
        let (agg, timings) = run_phases(&AnalysisConfig::default(), &input(), Some(callback));

        let names: Vec<String> = seen
            .borrow()
            .iter()
            .map(|s| s.split(':').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["graph", "communities", "metrics", "activity", "architecture"]
        );
        assert_eq!(timings.len(), 5);
        assert_eq!(agg.graph.edge_count(), 1);
        assert!(agg.community.is_some());
        assert!(agg.activity.is_some());
        assert!(agg.architecture.is_some());
    }

    #[test]
    fn empty_input_still_completes() {
        let result = run_pipeline(&AnalysisConfig::default(), &AnalysisInput::default(), None);
        assert!(result.graph.is_empty());
        assert!(result.community.is_none());
        assert_eq!(result.activity.map(|a| a.bus_factor), Some(0));
    }
}
