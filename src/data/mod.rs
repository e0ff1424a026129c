//! Bundled sample workspace shown before any real data is connected.

use log::error;

use crate::components::knowledge_graph::GraphData;

const SAMPLE_WORKSPACE: &str = include_str!("sample_workspace.json");

/// Parse the bundled sample; a broken bundle yields an empty graph.
pub fn sample_graph() -> GraphData {
	GraphData::from_json(SAMPLE_WORKSPACE).unwrap_or_else(|err| {
		error!("sample workspace unusable: {}", err);
		GraphData::default()
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_is_clean() {
		let data = sample_graph();
		assert!(!data.nodes.is_empty());
		assert_eq!(data.sanitized(), data);
	}
}
