use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::builder::GraphView;

pub const DEFAULT_GRAPH_FILENAME: &str = "knowledge_graph.html";

const VIS_NETWORK_URL: &str = "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

/// How rendered graph files are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// One constant file name, overwritten by every request.
    #[default]
    Fixed,
    /// A fresh `<stem>-<uuid>.html` per request.
    PerRequest,
}

/// Writes graphs as self-contained vis-network pages.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    output_dir: PathBuf,
    filename: String,
    naming: ArtifactNaming,
}

impl HtmlRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, naming: ArtifactNaming) -> Self {
        Self {
            output_dir: output_dir.into(),
            filename: DEFAULT_GRAPH_FILENAME.to_string(),
            naming,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Name of the next artifact.
    pub fn artifact_name(&self) -> String {
        match self.naming {
            ArtifactNaming::Fixed => self.filename.clone(),
            ArtifactNaming::PerRequest => {
                let stem = self.filename.strip_suffix(".html").unwrap_or(&self.filename);
                format!("{}-{}.html", stem, uuid::Uuid::new_v4())
            }
        }
    }

    /// Write the page and return its file name (relative to the output dir).
    pub async fn render(&self, graph: &GraphView) -> Result<String> {
        let name = self.artifact_name();
        let path = self.output_dir.join(&name);
        let html = render_html(graph)?;

        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("Failed to write graph to {:?}", path))?;

        tracing::info!(
            file = %name,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Rendered graph"
        );
        Ok(name)
    }
}

/// Serialize for embedding inside a `<script>` block.
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("Failed to serialize graph")?;
    Ok(json.replace("</", "<\\/"))
}

pub fn render_html(graph: &GraphView) -> Result<String> {
    let nodes = script_json(&graph.nodes)?;
    let edges = script_json(&graph.edges)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="{vis}"></script>
<style>
  #graph {{ width: 100%; height: 750px; background-color: #ffffff; border: 1px solid lightgray; }}
</style>
</head>
<body>
<div id="graph"></div>
<script>
  var nodes = new vis.DataSet({nodes});
  var edges = new vis.DataSet({edges});
  var options = {{
    nodes: {{ shape: "dot", font: {{ color: "black" }} }},
    edges: {{ arrows: {{ to: {{ enabled: true }} }}, font: {{ align: "middle" }} }},
    physics: {{ stabilization: {{ iterations: 200 }} }}
  }};
  var network = new vis.Network(document.getElementById("graph"), {{ nodes: nodes, edges: edges }}, options);
</script>
</body>
</html>
"#,
        vis = VIS_NETWORK_URL,
        nodes = nodes,
        edges = edges,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{GraphEdge, GraphNode};

    fn sample() -> GraphView {
        GraphView {
            nodes: vec![
                GraphNode {
                    id: "Acme".into(),
                    label: "Acme".into(),
                    color: "#FFA07A".into(),
                    size: 20,
                },
                GraphNode {
                    id: "</script>".into(),
                    label: "</script>".into(),
                    color: "#D3D3D3".into(),
                    size: 20,
                },
            ],
            edges: vec![GraphEdge {
                from: "Acme".into(),
                to: "</script>".into(),
                label: "developed".into(),
                verb: "develop".into(),
                width: 2,
            }],
        }
    }

    #[test]
    fn test_render_html_embeds_graph() {
        let html = render_html(&sample()).unwrap();

        assert!(html.contains(r#""label":"Acme""#));
        assert!(html.contains(r#""label":"developed""#));
        assert!(html.contains("vis-network"));
        // Labels cannot close the script block.
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[tokio::test]
    async fn test_fixed_name_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = HtmlRenderer::new(dir.path(), ArtifactNaming::Fixed);

        let first = renderer.render(&sample()).await.unwrap();
        let second = renderer.render(&GraphView::default()).await.unwrap();

        assert_eq!(first, DEFAULT_GRAPH_FILENAME);
        assert_eq!(first, second);
        let written = std::fs::read_to_string(dir.path().join(&first)).unwrap();
        assert!(!written.contains("Acme"));
    }

    #[tokio::test]
    async fn test_per_request_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = HtmlRenderer::new(dir.path(), ArtifactNaming::PerRequest).with_filename("graph.html");

        let first = renderer.render(&sample()).await.unwrap();
        let second = renderer.render(&sample()).await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("graph-") && first.ends_with(".html"));
        assert!(dir.path().join(&second).exists());
    }
}
