use extract::{EntityIndex, Triple};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::style::{EDGE_WIDTH, NODE_SIZE, color_for_label, display_verb};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub color: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    /// Display caption.
    pub label: String,
    /// Raw verb lemma; part of the edge identity.
    pub verb: String,
    pub width: u32,
}

/// Renderable snapshot of a built graph, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Accumulates one document's relations into a deduplicated directed graph.
pub struct GraphBuilder<'a> {
    index: &'a EntityIndex,
    graph: DiGraph<GraphNode, GraphEdge>,
    node_ids: HashMap<String, NodeIndex>,
    edge_keys: HashSet<(String, String, String)>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(index: &'a EntityIndex) -> Self {
        Self {
            index,
            graph: DiGraph::new(),
            node_ids: HashMap::new(),
            edge_keys: HashSet::new(),
        }
    }

    /// Insert a node for `label` unless it already exists.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.node_ids.get(label) {
            return idx;
        }

        let idx = self.graph.add_node(GraphNode {
            id: label.to_string(),
            label: label.to_string(),
            color: color_for_label(label, self.index).to_string(),
            size: NODE_SIZE,
        });
        self.node_ids.insert(label.to_string(), idx);
        idx
    }

    /// Add both endpoints, then the edge unless (subject, object, verb) was
    /// seen before. Returns whether a new edge was created.
    pub fn add_relation(&mut self, subject: &str, verb: &str, object: &str) -> bool {
        let source = self.add_node(subject);
        let target = self.add_node(object);

        let key = (subject.to_string(), object.to_string(), verb.to_string());
        if self.edge_keys.contains(&key) {
            return false;
        }

        self.graph.add_edge(
            source,
            target,
            GraphEdge {
                from: subject.to_string(),
                to: object.to_string(),
                label: display_verb(verb).to_string(),
                verb: verb.to_string(),
                width: EDGE_WIDTH,
            },
        );
        self.edge_keys.insert(key);
        true
    }

    pub fn extend<'t>(&mut self, relations: impl IntoIterator<Item = &'t Triple>) {
        for triple in relations {
            self.add_relation(&triple.subject, &triple.verb, &triple.object);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.raw_edges().iter().map(|edge| &edge.weight)
    }

    pub fn view(&self) -> GraphView {
        GraphView {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }
}
