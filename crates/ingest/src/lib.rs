pub mod article;
pub mod reader;
pub mod uploads;

pub use article::{Article, ArticleFetcher, extract_article};
pub use reader::PdfReader;
pub use uploads::{UploadStore, secure_filename};

use anyhow::{Context, Result};

/// Where a document's text comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Text(String),
    Url(String),
    Pdf { filename: String, bytes: Vec<u8> },
}

impl InputSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Url(_) => "url",
            Self::Pdf { .. } => "pdf",
        }
    }
}

/// Plain text plus whatever the source told us about itself.
#[derive(Debug, Clone)]
pub struct IngestedText {
    pub text: String,
    pub title: Option<String>,
}

/// Turns any input source into plain text.
pub struct Ingestor {
    fetcher: ArticleFetcher,
    uploads: UploadStore,
}

impl Ingestor {
    pub fn new(fetcher: ArticleFetcher, uploads: UploadStore) -> Self {
        Self { fetcher, uploads }
    }

    pub async fn ingest(&self, source: InputSource) -> Result<IngestedText> {
        match source {
            InputSource::Text(text) => Ok(IngestedText { text, title: None }),
            InputSource::Url(url) => {
                let article = self.fetcher.fetch(&url).await?;
                Ok(IngestedText {
                    text: article.text,
                    title: article.title,
                })
            }
            InputSource::Pdf { filename, bytes } => {
                let path = self
                    .uploads
                    .save(&filename, &bytes)
                    .await
                    .context("Failed to store uploaded PDF")?;
                let text = PdfReader::read_pdf(&path).await;
                Ok(IngestedText {
                    text,
                    title: Some(filename),
                })
            }
        }
    }
}
