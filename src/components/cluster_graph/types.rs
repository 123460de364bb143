use std::collections::{BTreeSet, HashMap};

use log::warn;
use serde::Deserialize;

use crate::error::VizError;

/// One topic cluster as supplied by the data loader.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNode {
	/// Stable slug, also the palette key.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Papers in the cluster; drives the node radius.
	#[serde(default)]
	pub paper_count: u32,
	/// Most frequent task tags, most common first.
	#[serde(default)]
	pub top_task_tags: Vec<String>,
	/// Most frequent modalities, most common first.
	#[serde(default)]
	pub top_modalities: Vec<String>,
	/// Ids of the member papers.
	#[serde(default)]
	pub paper_ids: BTreeSet<String>,
}

/// Shared-paper overlap between two clusters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLink {
	/// Id of one endpoint cluster.
	pub source: String,
	/// Id of the other endpoint cluster.
	pub target: String,
	/// Papers in both clusters; drives the link width.
	#[serde(default)]
	pub shared_count: u32,
	/// Ids of the shared papers.
	#[serde(default)]
	pub shared_paper_ids: BTreeSet<String>,
}

/// Everything the graph view draws. Loading one replaces the previous layout.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ClusterGraphSnapshot {
	/// Clusters, in arena order.
	#[serde(default)]
	pub nodes: Vec<ClusterNode>,
	/// Overlaps between clusters; malformed ones are dropped on load.
	#[serde(default)]
	pub links: Vec<ClusterLink>,
}

/// A link whose endpoints resolved to arena slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveLink {
	/// Slot of the source node.
	pub source: usize,
	/// Slot of the target node.
	pub target: usize,
	/// Copied from [`ClusterLink::shared_count`].
	pub shared_count: u32,
}

/// Node arena and link set after dropping malformed references.
#[derive(Clone, Debug, Default)]
pub struct ResolvedGraph {
	/// Unique nodes; a node's slot is its position here.
	pub nodes: Vec<ClusterNode>,
	/// Links whose endpoints both resolved.
	pub links: Vec<ActiveLink>,
	/// Node id to slot.
	pub index: HashMap<String, usize>,
	/// Links discarded as dangling or self-referencing.
	pub dropped_links: usize,
}

impl ClusterGraphSnapshot {
	/// Decode a snapshot from the host's JSON payload.
	pub fn from_json(json: &str) -> Result<Self, VizError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Resolve ids to slots. Duplicate node ids keep their first occurrence;
	/// links with a missing or self-referencing endpoint are dropped.
	pub fn resolve(&self) -> ResolvedGraph {
		let mut resolved = ResolvedGraph::default();
		for node in &self.nodes {
			if resolved.index.contains_key(&node.id) {
				warn!("duplicate cluster id {:?}, keeping the first", node.id);
				continue;
			}
			resolved.index.insert(node.id.clone(), resolved.nodes.len());
			resolved.nodes.push(node.clone());
		}

		for link in &self.links {
			match (
				resolved.index.get(&link.source),
				resolved.index.get(&link.target),
			) {
				(Some(&source), Some(&target)) if source != target => {
					resolved.links.push(ActiveLink {
						source,
						target,
						shared_count: link.shared_count,
					});
				}
				_ => resolved.dropped_links += 1,
			}
		}
		if resolved.dropped_links > 0 {
			warn!(
				"dropped {} link(s) with dangling or self-referencing endpoints",
				resolved.dropped_links
			);
		}
		resolved
	}
}

/// Notifications the graph view sends to its host.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// A node was clicked on the canvas or picked from the legend.
	NodeSelected(ClusterNode),
	/// The hovered node changed; `None` when nothing is hovered.
	HoverChanged(Option<ClusterNode>),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_camel_case_payload() {
		let snapshot = ClusterGraphSnapshot::from_json(
			r#"{
				"nodes": [
					{"id": "agents-tool-use", "name": "Agents / Tool Use", "paperCount": 4,
					 "topTaskTags": ["Planning"], "topModalities": ["text"], "paperIds": ["a", "b", "a"]}
				],
				"links": []
			}"#,
		)
		.unwrap();
		let node = &snapshot.nodes[0];
		assert_eq!(node.paper_count, 4);
		assert_eq!(node.top_task_tags, vec!["Planning".to_string()]);
		assert_eq!(node.paper_ids.len(), 2);
	}

	#[test]
	fn rejects_malformed_json() {
		let err = ClusterGraphSnapshot::from_json("{\"nodes\": 3}").unwrap_err();
		assert!(matches!(err, VizError::Decode(_)));
	}

	#[test]
	fn dangling_links_are_dropped_without_touching_nodes() {
		let snapshot: ClusterGraphSnapshot = serde_json::from_value(serde_json::json!({
			"nodes": [
				{"id": "a", "name": "A", "paperCount": 3},
				{"id": "b", "name": "B", "paperCount": 1}
			],
			"links": [
				{"source": "a", "target": "b", "sharedCount": 2},
				{"source": "a", "target": "ghost", "sharedCount": 5},
				{"source": "b", "target": "b", "sharedCount": 1}
			]
		}))
		.unwrap();

		let resolved = snapshot.resolve();
		assert_eq!(resolved.nodes.len(), 2);
		assert_eq!(resolved.dropped_links, 2);
		assert_eq!(
			resolved.links,
			vec![ActiveLink {
				source: 0,
				target: 1,
				shared_count: 2
			}]
		);
	}

	#[test]
	fn duplicate_ids_keep_first() {
		let snapshot = ClusterGraphSnapshot {
			nodes: vec![
				ClusterNode {
					id: "a".into(),
					name: "first".into(),
					..Default::default()
				},
				ClusterNode {
					id: "a".into(),
					name: "second".into(),
					..Default::default()
				},
			],
			links: vec![],
		};
		let resolved = snapshot.resolve();
		assert_eq!(resolved.nodes.len(), 1);
		assert_eq!(resolved.nodes[0].name, "first");
	}
}
