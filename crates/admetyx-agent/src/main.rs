//! Admetyx: molecular scoring and ADMET prediction engine.
//! Entry point for the command-line driver.
//!
//! Trains the models, screens the reference library and any structures given as
//! arguments, and prints the reports as JSON.

mod config;

use std::sync::Arc;

use admetyx_molecules::{reference_library, summarize, HeuristicDescriptorService, ModelStore, TARGETS};
use admetyx_ranker::{ScreeningEngine, ScreeningReport};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn trimmed(mut report: ScreeningReport, top_n: usize) -> ScreeningReport {
    if top_n > 0 {
        report.entries.truncate(top_n);
    }
    report
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("admetyx=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Admetyx starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match config::Config::load()? {
        Some(c) => {
            info!("Configuration loaded. Seed: {}", c.seed());
            c
        }
        None => {
            warn!("No admetyx.toml found; using built-in defaults.");
            config::Config::default()
        }
    };
    let structures: Vec<String> = std::env::args().skip(1).collect();

    let engine = Arc::new(ScreeningEngine::with_store(
        config.engine.clone(),
        Arc::new(HeuristicDescriptorService::new()),
        Arc::new(ModelStore::new()),
    )?);

    // Training is CPU-bound; keep it off the async workers
    let seed = config.seed();
    let trainer = Arc::clone(&engine);
    let models = tokio::task::spawn_blocking(move || trainer.train_models(seed)).await??;
    info!(
        "Models ready: seed {}, CV accuracy {:.4}",
        models.seed,
        models.classifier.cv_accuracy()
    );

    let library = reference_library();
    let summary = summarize(&library);

    let library_report = if config.run.screen_library {
        let compounds = library.iter().map(|e| e.compound.clone()).collect::<Vec<_>>();
        let screener = Arc::clone(&engine);
        let report = tokio::task::spawn_blocking(move || screener.screen_library(&compounds)).await??;
        Some(trimmed(report, config.run.top_n))
    } else {
        None
    };

    let submitted_report = if structures.is_empty() {
        None
    } else {
        let screener = Arc::clone(&engine);
        let report = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = structures.iter().map(String::as_str).collect();
            screener.screen_structures(&refs)
        })
        .await??;
        for failure in &report.failures {
            warn!("Skipped '{}': {}", failure.smiles, failure.message);
        }
        Some(trimmed(report, config.run.top_n))
    };

    let output = json!({
        "model": {
            "seed": models.seed,
            "cv_accuracy": models.classifier.cv_accuracy(),
            "feature_importance": models.classifier.feature_importance(),
        },
        "target_families": TARGETS,
        "library_summary": summary,
        "library": library_report,
        "submitted": submitted_report,
    });
    let text = if config.run.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");

    Ok(())
}
