use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::parse::{DocJson, ParsedDocument};

/// Sentence segmentation, entity recognition and dependency parsing.
#[async_trait]
pub trait DependencyParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<ParsedDocument>;

    /// Cheap reachability check for health endpoints.
    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

/// Client for an HTTP service wrapping a spaCy pipeline.
///
/// `POST {base_url}/parse` with `{"text": ..., "model": ...}` must answer
/// with the document's `Doc.to_json()` output.
#[derive(Clone)]
pub struct SpacyClient {
    base_url: String,
    model: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

impl SpacyClient {
    pub fn new(base_url: String, model: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build parser HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DependencyParser for SpacyClient {
    async fn parse(&self, text: &str) -> Result<ParsedDocument> {
        let url = format!("{}/parse", self.base_url);

        let request = ParseRequest {
            text,
            model: self.model.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to parser service")?;

        if !response.status().is_success() {
            anyhow::bail!("Parser request failed: {}", response.status());
        }

        let doc: DocJson = response
            .json()
            .await
            .context("Failed to decode parser response")?;

        tracing::debug!(
            tokens = doc.tokens.len(),
            sentences = doc.sents.len(),
            entities = doc.ents.len(),
            "Parsed document"
        );

        ParsedDocument::from_json(doc).context("Parser returned a malformed document")
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .context("Parser service unreachable")?;

        if !response.status().is_success() {
            anyhow::bail!("Parser service returned {}", response.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SpacyClient {
        SpacyClient::new(server.uri(), Some("en_core_web_sm".into()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_parse_decodes_doc_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .and(body_partial_json(json!({"text": "Bob runs.", "model": "en_core_web_sm"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "Bob runs.",
                "ents": [{"start": 0, "end": 3, "label": "PERSON"}],
                "sents": [{"start": 0, "end": 9}],
                "tokens": [
                    {"id": 0, "start": 0, "end": 3, "pos": "PROPN", "tag": "NNP", "dep": "nsubj", "head": 1, "lemma": "Bob"},
                    {"id": 1, "start": 4, "end": 8, "pos": "VERB", "tag": "VBZ", "dep": "ROOT", "head": 1, "lemma": "run"},
                    {"id": 2, "start": 8, "end": 9, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 1, "lemma": "."}
                ]
            })))
            .mount(&server)
            .await;

        let doc = client(&server).parse("Bob runs.").await.unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.token(1).lemma(), "run");
        assert_eq!(doc.entities()[0].label, "PERSON");
    }

    #[tokio::test]
    async fn test_parse_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).parse("anything").await.unwrap_err();
        assert!(err.to_string().contains("Parser request failed"));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(client(&server).health().await.is_ok());
    }
}
