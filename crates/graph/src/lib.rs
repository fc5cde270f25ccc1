pub mod builder;
pub mod render;
pub mod style;

pub use builder::{GraphBuilder, GraphEdge, GraphNode, GraphView};
pub use render::{ArtifactNaming, DEFAULT_GRAPH_FILENAME, HtmlRenderer, render_html};
pub use style::{color_for_label, display_verb};

use extract::ExtractionResult;

/// Accumulate every relation of a document, in extraction order.
pub fn build_graph(extraction: &ExtractionResult) -> GraphView {
    let mut builder = GraphBuilder::new(&extraction.index);
    builder.extend(&extraction.relations);

    tracing::debug!(
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        "Built graph"
    );
    builder.view()
}
