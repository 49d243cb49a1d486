//! High-level pipeline: orchestrates collect → validate → merge → resolve.
//!
//! This module provides the top-level orchestration for one generation run:
//!   - Invokes every enabled source adapter concurrently (they are
//!     independent and side-effect-free with respect to each other)
//!   - Validates each output against the adapter's declared category
//!   - Merges the surviving per-source aggregates in configuration order
//!   - Resolves cross-references and returns the queryable result
//!   - Aggregates a per-run report of what succeeded and failed
//!
//! # Error Handling
//! A single failing source never aborts the run: its error is recorded in
//! the [`RunReport`] and the merge proceeds over whichever sources
//! succeeded. The merged aggregate is always internally consistent, even
//! when incomplete.
//!
//! # Callable From
//! - The generation driver (CLI or service) and integration tests
//! - Expects concrete (async) [`SourceAdapter`] implementations
//!
//! # Navigation
//! - Main entrypoint: [`collect`]
//! - Supporting types: [`ConfiguredSource`], [`CollectionOutcome`],
//!   [`RunReport`]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::SourceConfig;
use crate::contract::{validate_output, RawDocument, SourceAdapter, SourceOutput};
use crate::error::{MergeWarning, SourceError, SourceFailure};
use crate::merge;
use crate::model::ProjectData;
use crate::query::ResolvedProject;
use crate::resolve::{self, ResolveConfig};

/// One configured source: the adapter plus its opaque configuration.
#[derive(Clone)]
pub struct ConfiguredSource {
    pub config: SourceConfig,
    pub adapter: Arc<dyn SourceAdapter>,
}

impl ConfiguredSource {
    pub fn new(config: SourceConfig, adapter: Arc<dyn SourceAdapter>) -> Self {
        Self { config, adapter }
    }
}

/// Run-level status: per-source errors and merge warnings, never raised as
/// failures of the run itself. The consumer decides whether partial data is
/// acceptable.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source_errors: Vec<SourceError>,
    pub warnings: Vec<MergeWarning>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.source_errors.is_empty() && self.warnings.is_empty()
    }
}

/// Everything one generation run produces for the rendering stage.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub project: ResolvedProject,
    /// Raw documents from file-based sources, in configuration order.
    pub documents: Vec<RawDocument>,
    pub report: RunReport,
}

/// Collect from all configured sources and produce the resolved aggregate.
///
/// Sources are invoked concurrently; results are consumed in configuration
/// order so the merge stays deterministic.
pub async fn collect(
    sources: &[ConfiguredSource],
    resolve_config: &ResolveConfig,
) -> CollectionOutcome {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(
        run_id = %run_id,
        sources = sources.len(),
        "[COLLECT] Starting collection run"
    );

    let enabled: Vec<&ConfiguredSource> = sources
        .iter()
        .filter(|source| {
            if !source.config.enabled {
                info!(source = %source.config.name, "[COLLECT] Source disabled, skipping");
            }
            source.config.enabled
        })
        .collect();

    let collections = enabled.iter().map(|source| async move {
        info!(
            source = %source.config.name,
            adapter = %source.adapter.display_name(),
            category = %source.adapter.category(),
            "[COLLECT] Invoking adapter"
        );
        source.adapter.collect(&source.config).await
    });
    let results = join_all(collections).await;

    let mut source_errors = Vec::new();
    let mut projects: Vec<ProjectData> = Vec::new();
    let mut documents: Vec<RawDocument> = Vec::new();

    for (source, result) in enabled.iter().zip(results) {
        let source_type = source.adapter.source_type();
        match result {
            Ok(output) => match validate_output(source.adapter.category(), &output) {
                Ok(()) => match output {
                    SourceOutput::Project(data) => {
                        info!(
                            source = %source.config.name,
                            functional = data.has_functional_data(),
                            technical = data.has_technical_data(),
                            "[COLLECT] Source collected"
                        );
                        projects.push(data);
                    }
                    SourceOutput::Documents(docs) => {
                        info!(
                            source = %source.config.name,
                            documents = docs.len(),
                            "[COLLECT] Source collected raw documents"
                        );
                        documents.extend(docs);
                    }
                },
                Err(violation) => {
                    error!(
                        source = %source.config.name,
                        error = %violation,
                        "[COLLECT][ERROR] Contract violation, dropping source contribution"
                    );
                    source_errors.push(SourceError {
                        source: source.config.name.clone(),
                        source_type,
                        failure: SourceFailure::Contract(violation),
                    });
                }
            },
            Err(adapter_error) => {
                error!(
                    source = %source.config.name,
                    error = %adapter_error,
                    "[COLLECT][ERROR] Adapter failed"
                );
                source_errors.push(SourceError {
                    source: source.config.name.clone(),
                    source_type,
                    failure: SourceFailure::Adapter(adapter_error.to_string()),
                });
            }
        }
    }

    let merge::MergeOutcome { data, warnings } = merge::merge(projects);
    let project = resolve::resolve(data, resolve_config);

    let finished_at = Utc::now();
    info!(
        run_id = %run_id,
        errors = source_errors.len(),
        warnings = warnings.len(),
        documents = documents.len(),
        "[COLLECT] Collection run finished"
    );

    CollectionOutcome {
        project,
        documents,
        report: RunReport {
            run_id,
            started_at,
            finished_at,
            source_errors,
            warnings,
        },
    }
}
