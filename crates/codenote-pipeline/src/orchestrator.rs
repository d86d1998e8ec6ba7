//! Per-file pipeline orchestration
//!
//! Each file moves through read, chunk, annotate, reassemble and write.
//! Chunks within a file are strictly sequential; up to `jobs` files are in
//! flight at once. A failure is absorbed at the narrowest scope that can
//! contain it and never aborts the run.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use codenote_chunking::{
    normalize_response, AnnotationResult, Chunk, ChunkOutcome, Chunker, FallbackPolicy, FileEntry,
    Reassembler, SourceUnit,
};
use codenote_ollama::{AnnotationRequest, AnnotationService, PromptEnvelope};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::CodenoteConfig,
    error::Result,
    output::{ArtifactWriter, OutputNaming},
    report::{FileReport, FileStage, FileState, RunSummary},
    retry::RetryPolicy,
};

const CANCELLED_REASON: &str = "cancelled";
const EMPTY_FILE_EXPLANATION: &str = "_Empty file._";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Write one annotated artifact per source file.
    Annotate,
    /// Collect a per-file explanation; nothing is written per file.
    Explain,
}

/// Progress hooks. All methods default to doing nothing.
pub trait PipelineObserver: Send + Sync {
    fn file_started(&self, _path: &Path, _chunks: usize) {}

    fn chunk_finished(&self, _path: &Path, _done: usize, _total: usize) {}

    fn file_finished(&self, _report: &FileReport) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// What a dry run would do for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub language_hint: String,
    pub chunks: usize,
    /// Chunks that would actually be sent (empty chunks pass through).
    pub requests: usize,
    pub artifact: Option<PathBuf>,
    pub error: Option<String>,
}

pub struct FilePipeline {
    service: Arc<dyn AnnotationService>,
    model: String,
    mode: PipelineMode,
    chunker: Chunker,
    reassembler: Reassembler,
    envelope: PromptEnvelope,
    retry: RetryPolicy,
    naming: Option<OutputNaming>,
    writer: ArtifactWriter,
    cancel: CancellationToken,
    jobs: usize,
    observer: Arc<dyn PipelineObserver>,
}

impl FilePipeline {
    /// Pipeline that writes an annotated artifact per file.
    ///
    /// `model` should be the name the availability gate resolved.
    pub fn annotate(
        service: Arc<dyn AnnotationService>,
        model: impl Into<String>,
        config: &CodenoteConfig,
        naming: OutputNaming,
    ) -> Result<Self> {
        let mut pipeline = Self::build(service, model.into(), PipelineMode::Annotate, config)?;
        pipeline.naming = Some(naming);
        Ok(pipeline)
    }

    /// Pipeline that collects explanations instead of writing artifacts.
    pub fn explain(
        service: Arc<dyn AnnotationService>,
        model: impl Into<String>,
        config: &CodenoteConfig,
    ) -> Result<Self> {
        Self::build(service, model.into(), PipelineMode::Explain, config)
    }

    fn build(
        service: Arc<dyn AnnotationService>,
        model: String,
        mode: PipelineMode,
        config: &CodenoteConfig,
    ) -> Result<Self> {
        let envelope = match mode {
            PipelineMode::Annotate => config.annotate_envelope(),
            PipelineMode::Explain => config.explain_envelope(),
        };

        Ok(Self {
            service,
            model,
            mode,
            chunker: Chunker::new(config.max_chunk_size)?,
            reassembler: Reassembler::new(config.on_chunk_failure),
            envelope,
            retry: config.retry_policy(),
            naming: None,
            writer: ArtifactWriter::new(),
            cancel: CancellationToken::new(),
            jobs: config.jobs.max(1),
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Process every entry, returning reports in input order.
    pub async fn run(&self, entries: &[FileEntry]) -> RunSummary {
        info!(
            files = entries.len(),
            jobs = self.jobs,
            mode = ?self.mode,
            "Starting pipeline"
        );

        let pending: Vec<_> = entries.iter().map(|entry| self.run_entry(entry)).collect();
        let outcomes: Vec<(PathBuf, Option<FileReport>)> = stream::iter(pending)
            .buffered(self.jobs)
            .collect()
            .await;

        let mut summary = RunSummary {
            cancelled: self.cancel.is_cancelled(),
            ..RunSummary::default()
        };
        for (path, report) in outcomes {
            match report {
                Some(report) => summary.reports.push(report),
                None => summary.skipped.push(path),
            }
        }

        info!(
            processed = summary.reports.len(),
            failed = summary.failed().count(),
            skipped = summary.skipped.len(),
            "Pipeline finished"
        );
        summary
    }

    /// `None` when cancellation arrived before the entry was started.
    async fn run_entry(&self, entry: &FileEntry) -> (PathBuf, Option<FileReport>) {
        if self.cancel.is_cancelled() {
            return (entry.path.clone(), None);
        }
        let report = self.process_file(&entry.path).await;
        self.observer.file_finished(&report);
        (entry.path.clone(), Some(report))
    }

    /// Run one file to a terminal state. Never returns an error: every
    /// failure is recorded in the report.
    pub async fn process_file(&self, path: &Path) -> FileReport {
        let mut report = FileReport::new(path);

        let unit = match SourceUnit::load(path).await {
            Ok(unit) => unit,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read file");
                return report.fail(FileStage::Read, e);
            }
        };
        report.state = FileState::Read;

        let chunks = self.chunker.chunk(&unit.content);
        let total = chunks.len();
        report.chunks = total;
        report.state = FileState::Chunked { total };
        debug!(path = %path.display(), chunks = total, "Chunked file");
        self.observer.file_started(path, total);

        let mut results: Vec<AnnotationResult<'_>> = Vec::with_capacity(total);
        for chunk in chunks {
            if self.cancel.is_cancelled() {
                info!(path = %path.display(), "Abandoning file after cancellation");
                return report.fail(FileStage::Annotate, CANCELLED_REASON);
            }
            report.state = FileState::Annotating {
                done: results.len(),
                total,
            };

            let result = self.annotate_chunk(&unit, chunk).await;
            let failed = !result.is_success();
            results.push(result);
            self.observer.chunk_finished(path, results.len(), total);

            if failed && self.reassembler.policy() == FallbackPolicy::FailFile {
                break;
            }
        }

        match self.mode {
            PipelineMode::Annotate => self.finish_annotation(report, &results).await,
            PipelineMode::Explain => self.finish_explanation(report, &results),
        }
    }

    async fn annotate_chunk<'a>(&self, unit: &SourceUnit, chunk: Chunk<'a>) -> AnnotationResult<'a> {
        if chunk.is_empty() {
            return AnnotationResult::unchanged(chunk);
        }

        let request = AnnotationRequest {
            text: chunk.text,
            model: &self.model,
            language_hint: &unit.language_hint,
            envelope: self.envelope,
        };

        match self.retry.run(|| self.service.annotate(request)).await {
            Ok(response) => {
                let text = match self.mode {
                    PipelineMode::Annotate => normalize_response(chunk.text, &response),
                    PipelineMode::Explain => response.trim().to_string(),
                };
                AnnotationResult::annotated(chunk, text)
            }
            Err(e) => {
                warn!(
                    path = %unit.path.display(),
                    chunk = chunk.sequence,
                    start_line = chunk.start_line,
                    error = %e,
                    "Chunk annotation failed"
                );
                AnnotationResult::failed(chunk, e.to_string())
            }
        }
    }

    async fn finish_annotation(
        &self,
        mut report: FileReport,
        results: &[AnnotationResult<'_>],
    ) -> FileReport {
        let reassembled = match self.reassembler.reassemble(results) {
            Ok(reassembled) => reassembled,
            Err(e) => return report.fail(FileStage::Reassemble, e),
        };
        report.fallback_chunks = reassembled.fallbacks;
        report.state = FileState::Reassembled;

        let Some(naming) = &self.naming else {
            return report;
        };
        let artifact = naming.artifact_path(&report.path);
        if let Err(e) = self.writer.write(&artifact, &reassembled.body).await {
            warn!(error = %e, "Failed to write artifact");
            return report.fail(FileStage::Write, e);
        }

        info!(
            source = %report.path.display(),
            artifact = %artifact.display(),
            fallbacks = report.fallback_chunks.len(),
            "Wrote annotated file"
        );
        report.state = FileState::Written { artifact };
        report
    }

    fn finish_explanation(&self, mut report: FileReport, results: &[AnnotationResult<'_>]) -> FileReport {
        let mut ordered: Vec<&AnnotationResult<'_>> = results.iter().collect();
        ordered.sort_by_key(|result| result.chunk.sequence);

        let mut parts = Vec::with_capacity(ordered.len());
        for result in ordered {
            match &result.outcome {
                ChunkOutcome::Annotated(text) => parts.push(text.as_str()),
                ChunkOutcome::Unchanged => {}
                ChunkOutcome::Failed { reason } => {
                    if self.reassembler.policy() == FallbackPolicy::FailFile {
                        return report.fail(
                            FileStage::Reassemble,
                            format!("chunk {} failed: {}", result.chunk.sequence, reason),
                        );
                    }
                    report.fallback_chunks.push(result.chunk.sequence);
                }
            }
        }

        if parts.is_empty() {
            if !report.fallback_chunks.is_empty() {
                return report.fail(FileStage::Annotate, "no chunk could be explained");
            }
            parts.push(EMPTY_FILE_EXPLANATION);
        }

        report.explanation = Some(parts.join("\n\n"));
        report.state = FileState::Reassembled;
        report
    }

    /// Read and chunk each entry without contacting the service.
    pub async fn plan(&self, entries: &[FileEntry]) -> Vec<PlannedFile> {
        let mut planned = Vec::with_capacity(entries.len());

        for entry in entries {
            let artifact = self
                .naming
                .as_ref()
                .map(|naming| naming.artifact_path(&entry.path));

            match SourceUnit::load(&entry.path).await {
                Ok(unit) => {
                    let chunks = self.chunker.chunk(&unit.content);
                    planned.push(PlannedFile {
                        path: entry.path.clone(),
                        language_hint: unit.language_hint.clone(),
                        chunks: chunks.len(),
                        requests: chunks.iter().filter(|c| !c.is_empty()).count(),
                        artifact,
                        error: None,
                    });
                }
                Err(e) => planned.push(PlannedFile {
                    path: entry.path.clone(),
                    language_hint: String::new(),
                    chunks: 0,
                    requests: 0,
                    artifact: None,
                    error: Some(e.to_string()),
                }),
            }
        }

        planned
    }
}
