use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::GraphError;

/// Structural role of a node in the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// A database or other page container.
	Container,
	Page,
	/// A leaf property of a page or database.
	Property,
}

impl NodeKind {
	pub const ALL: [NodeKind; 3] = [NodeKind::Container, NodeKind::Page, NodeKind::Property];

	pub fn label(self) -> &'static str {
		match self {
			NodeKind::Container => "Database",
			NodeKind::Page => "Page",
			NodeKind::Property => "Property",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
	/// A direct relation property between two pages.
	Direct,
	/// A mention or link from page content.
	Reference,
	Dependency,
	/// Parent/child nesting.
	Containment,
}

impl EdgeKind {
	pub const ALL: [EdgeKind; 4] = [
		EdgeKind::Direct,
		EdgeKind::Reference,
		EdgeKind::Dependency,
		EdgeKind::Containment,
	];

	pub fn label(self) -> &'static str {
		match self {
			EdgeKind::Direct => "Relation",
			EdgeKind::Reference => "Reference",
			EdgeKind::Dependency => "Dependency",
			EdgeKind::Containment => "Contains",
		}
	}

	pub fn is_dashed(self) -> bool {
		self == EdgeKind::Reference
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub kind: NodeKind,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default = "default_size")]
	pub size: f64,
	#[serde(default)]
	pub secondary_type: Option<String>,
	#[serde(default)]
	pub parent: Option<String>,
}

fn default_size() -> f64 {
	1.0
}

impl GraphNode {
	/// Size hint, always positive.
	pub fn size(&self) -> f64 {
		if self.size.is_finite() && self.size > 0.0 {
			self.size
		} else {
			default_size()
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
	#[serde(default = "default_strength")]
	pub strength: f64,
	#[serde(default)]
	pub label: Option<String>,
}

fn default_strength() -> f64 {
	0.5
}

impl GraphEdge {
	/// Strength clamped to `[0, 1]`.
	pub fn strength(&self) -> f64 {
		if self.strength.is_finite() {
			self.strength.clamp(0.0, 1.0)
		} else {
			0.0
		}
	}
}

/// One immutable snapshot of the graph handed to the view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Copy of the snapshot with duplicate node ids and dangling edges removed,
	/// strengths clamped and sizes made positive.
	pub fn sanitized(&self) -> GraphData {
		let mut seen: HashSet<&str> = HashSet::new();
		let mut nodes = Vec::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if seen.insert(node.id.as_str()) {
				nodes.push(GraphNode {
					size: node.size(),
					..node.clone()
				});
			}
		}

		let edges: Vec<GraphEdge> = self
			.edges
			.iter()
			.filter(|edge| {
				seen.contains(edge.source.as_str()) && seen.contains(edge.target.as_str())
			})
			.map(|edge| GraphEdge {
				strength: edge.strength(),
				..edge.clone()
			})
			.collect();

		let dropped_nodes = self.nodes.len() - nodes.len();
		let dropped_edges = self.edges.len() - edges.len();
		if dropped_nodes > 0 || dropped_edges > 0 {
			debug!(
				"sanitized graph: dropped {} duplicate nodes, {} dangling edges",
				dropped_nodes, dropped_edges
			);
		}

		GraphData { nodes, edges }
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|node| node.id == id)
	}

	/// Ids one hop away from `id` over edges whose endpoints both exist.
	pub fn neighbors(&self, id: &str) -> Vec<&str> {
		let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
		let mut seen = HashSet::new();
		let mut out = Vec::new();
		for edge in &self.edges {
			let (source, target) = (edge.source.as_str(), edge.target.as_str());
			let other = match (source == id, target == id) {
				(true, false) => target,
				(false, true) => source,
				_ => continue,
			};
			if ids.contains(source) && ids.contains(target) && seen.insert(other) {
				out.push(other);
			}
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.to_uppercase(),
			kind: NodeKind::Page,
			category: "notes".into(),
			description: None,
			size: 1.0,
			secondary_type: None,
			parent: None,
		}
	}

	fn edge(source: &str, target: &str, strength: f64) -> GraphEdge {
		GraphEdge {
			source: source.into(),
			target: target.into(),
			kind: EdgeKind::Direct,
			strength,
			label: None,
		}
	}

	#[test]
	fn sanitize_drops_dangling_edges() {
		let data = GraphData {
			nodes: vec![node("a"), node("b")],
			edges: vec![edge("a", "b", 0.5), edge("a", "ghost", 0.5), edge("ghost", "b", 0.5)],
		};
		let clean = data.sanitized();
		assert_eq!(clean.edges.len(), 1);
		assert!(clean
			.edges
			.iter()
			.all(|e| clean.node(&e.source).is_some() && clean.node(&e.target).is_some()));
	}

	#[test]
	fn sanitize_clamps_strength_and_size() {
		let mut tiny = node("a");
		tiny.size = -3.0;
		let mut nan = node("b");
		nan.size = f64::NAN;
		let data = GraphData {
			nodes: vec![tiny, nan],
			edges: vec![
				edge("a", "b", 4.0),
				edge("b", "a", -1.0),
				edge("a", "a", f64::NAN),
			],
		};
		let clean = data.sanitized();
		assert!(clean.nodes.iter().all(|n| n.size > 0.0));
		let strengths: Vec<f64> = clean.edges.iter().map(|e| e.strength).collect();
		assert_eq!(strengths, vec![1.0, 0.0, 0.0]);
	}

	#[test]
	fn sanitize_keeps_first_duplicate_id() {
		let mut dup = node("a");
		dup.name = "second".into();
		let data = GraphData {
			nodes: vec![node("a"), dup],
			edges: vec![],
		};
		let clean = data.sanitized();
		assert_eq!(clean.nodes.len(), 1);
		assert_eq!(clean.nodes[0].name, "A");
	}

	#[test]
	fn neighbors_are_one_hop_and_unique() {
		let data = GraphData {
			nodes: vec![node("a"), node("b"), node("c"), node("d")],
			edges: vec![
				edge("a", "b", 0.5),
				edge("c", "a", 0.5),
				edge("b", "a", 0.5),
				edge("c", "d", 0.5),
				edge("a", "missing", 0.5),
			],
		};
		let mut around_a = data.neighbors("a");
		around_a.sort();
		assert_eq!(around_a, vec!["b", "c"]);
	}

	#[test]
	fn neighbors_ignore_self_loops() {
		let data = GraphData {
			nodes: vec![node("a"), node("b")],
			edges: vec![edge("a", "a", 1.0), edge("b", "a", 0.5), edge("a", "b", 0.5)],
		};
		assert_eq!(data.neighbors("a"), vec!["b"]);
		assert_eq!(data.neighbors("b"), vec!["a"]);
	}

	#[test]
	fn parses_snapshot_with_defaults() {
		let json = r#"{
			"nodes": [
				{ "id": "db", "name": "Projects", "kind": "container", "category": "database" },
				{ "id": "p1", "name": "Launch", "kind": "page", "size": 3 }
			],
			"edges": [
				{ "source": "db", "target": "p1", "kind": "containment" }
			]
		}"#;
		let data = GraphData::from_json(json).unwrap();
		assert_eq!(data.nodes[1].category, "");
		assert_eq!(data.nodes[1].size, 3.0);
		assert_eq!(data.edges[0].kind, EdgeKind::Containment);
		assert_eq!(data.edges[0].strength, 0.5);
	}

	#[test]
	fn rejects_unknown_kind() {
		let json = r#"{ "nodes": [ { "id": "x", "name": "X", "kind": "galaxy" } ] }"#;
		assert!(matches!(GraphData::from_json(json), Err(GraphError::Parse(_))));
	}
}
