use extract::EntityMention;
use graph::GraphView;
use ingest::InputSource;
use serde::Serialize;
use tracing::Instrument;

use crate::error::ProcessError;
use crate::metrics::TimedOperation;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A raw form submission; `input_type` selects which field is used.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub input_type: String,
    pub text: Option<String>,
    pub url: Option<String>,
    pub pdf: Option<UploadedFile>,
}

impl Submission {
    /// Pick the source named by `input_type`. An unknown type behaves like
    /// an empty text box.
    pub fn into_source(self) -> Result<InputSource, ProcessError> {
        match self.input_type.as_str() {
            "text" => Ok(InputSource::Text(self.text.unwrap_or_default())),
            "url" => match self.url {
                Some(url) if !url.trim().is_empty() => Ok(InputSource::Url(url)),
                _ => Err(ProcessError::EmptyUrl),
            },
            "pdf" => match self.pdf {
                Some(file) if !file.filename.is_empty() => Ok(InputSource::Pdf {
                    filename: file.filename,
                    bytes: file.bytes,
                }),
                _ => Err(ProcessError::NoPdf),
            },
            _ => Ok(InputSource::Text(String::new())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub title: Option<String>,
    pub entities: Vec<EntityMention>,
    pub graph: GraphView,
    pub graph_filename: String,
}

/// Ingest, parse, extract, build and render one submission.
pub async fn process(state: &AppState, submission: Submission) -> Result<ProcessOutcome, ProcessError> {
    let _guard = state.pipeline.lock().await;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("process", %request_id, input = %submission.input_type);

    let result = run(state, submission).instrument(span.clone()).await;

    state.metrics.record_request(result.is_ok());
    span.in_scope(|| match &result {
        Ok(outcome) => tracing::info!(
            entities = outcome.entities.len(),
            nodes = outcome.graph.nodes.len(),
            edges = outcome.graph.edges.len(),
            file = %outcome.graph_filename,
            "Submission processed"
        ),
        Err(e) => tracing::warn!(kind = e.kind(), error = %e, "Submission failed"),
    });

    result
}

async fn run(state: &AppState, submission: Submission) -> Result<ProcessOutcome, ProcessError> {
    let source = submission.into_source()?;
    tracing::debug!(source = source.kind(), "Ingesting");

    let timer = TimedOperation::start();
    let ingested = state
        .ingestor
        .ingest(source)
        .await
        .map_err(ProcessError::Ingest)?;
    state.metrics.record_ingest(timer.elapsed());

    if ingested.text.trim().is_empty() {
        return Err(ProcessError::EmptyText);
    }

    let timer = TimedOperation::start();
    let extraction = state
        .extractor
        .extract_from_text(&ingested.text)
        .await
        .map_err(ProcessError::Extract)?;
    state.metrics.record_extract(
        timer.elapsed(),
        extraction.entities.len(),
        extraction.relations.len(),
    );

    let timer = TimedOperation::start();
    let graph = graph::build_graph(&extraction);
    let graph_filename = state
        .renderer
        .render(&graph)
        .await
        .map_err(ProcessError::Render)?;
    state.metrics.record_render(timer.elapsed(), graph.edges.len());

    Ok(ProcessOutcome {
        title: ingested.title,
        entities: extraction.entities,
        graph,
        graph_filename,
    })
}
