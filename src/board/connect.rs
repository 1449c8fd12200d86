//! User-drawn link to typed, styled edge.

use serde::{Deserialize, Serialize};

use super::model::{Edge, EdgeData, Relationship};

/// A completed drag from `source`'s output handle to `target`'s input handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
	pub source: String,
	pub target: String,
}

impl Connection {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// Links must join two different nodes; any variant pair is allowed.
	pub fn is_link(&self) -> bool {
		!self.source.is_empty() && !self.target.is_empty() && self.source != self.target
	}
}

/// Hands out edge ids that stay unique even for parallel edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeIds {
	next: u64,
}

impl EdgeIds {
	/// Continue numbering after whatever a loaded document already used.
	pub fn after(edges: &[Edge]) -> Self {
		let next = edges
			.iter()
			.filter_map(|e| e.id.rsplit('-').next()?.parse::<u64>().ok())
			.max()
			.map_or(0, |n| n.saturating_add(1));
		Self { next }
	}

	pub fn next_for(&mut self, connection: &Connection, taken: impl Fn(&str) -> bool) -> String {
		loop {
			let id = format!("edge-{}-{}-{}", connection.source, connection.target, self.next);
			self.next = self.next.wrapping_add(1);
			if !taken(&id) {
				return id;
			}
		}
	}
}

/// The edge appended for a new connection: default relationship, no notes,
/// animated arrow-terminated stroke.
pub fn edge_for(connection: &Connection, id: String) -> Edge {
	Edge::styled(
		id,
		connection.source.clone(),
		connection.target.clone(),
		EdgeData {
			relationship: Relationship::default(),
			notes: None,
		},
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::model::{EDGE_COLOR, EdgeStyle};

	#[test]
	fn default_edge_is_animated_arrow() {
		let edge = edge_for(&Connection::new("evidence-1", "suspect-2"), "e".into());
		assert!(edge.animated);
		assert_eq!(edge.edge_type, "smoothstep");
		assert_eq!(edge.marker_end.unwrap().color.as_deref(), Some(EDGE_COLOR));
		assert_eq!(edge.style, EdgeStyle::default());
		assert_eq!(edge.data.relationship, Relationship::RelatedTo);
	}

	#[test]
	fn self_links_are_not_connections() {
		assert!(!Connection::new("evidence-1", "evidence-1").is_link());
		assert!(Connection::new("case-1", "evidence-1").is_link());
	}

	#[test]
	fn ids_skip_taken_and_continue_after_loaded() {
		let conn = Connection::new("a", "b");
		let mut ids = EdgeIds::default();
		let first = ids.next_for(&conn, |id| id == "edge-a-b-0");
		assert_eq!(first, "edge-a-b-1");

		let loaded = vec![edge_for(&conn, "edge-a-b-7".into()), edge_for(&conn, "reactflow__edge-ab".into())];
		let mut ids = EdgeIds::after(&loaded);
		assert_eq!(ids.next_for(&conn, |_| false), "edge-a-b-8");
	}

	#[test]
	fn largest_loaded_suffix_does_not_overflow() {
		let conn = Connection::new("a", "b");
		let loaded = vec![edge_for(&conn, format!("edge-a-b-{}", u64::MAX))];
		let mut ids = EdgeIds::after(&loaded);
		assert_eq!(ids.next_for(&conn, |id| id.ends_with(&u64::MAX.to_string())), "edge-a-b-0");
	}
}
