//! Palette drag to positioned node.
//!
//! Drag start writes a [`DragPayload`] into the native drag transfer under
//! [`TRANSFER_TYPE`]; the drop reads it back, converts the pointer from
//! canvas-relative screen space into document space and builds one node.
//! Anything missing or malformed at drop time means no drop happened.

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{EvidenceRecord, Node, NodeVariant, Position, SuspectRecord, Viewport};
use crate::error::BoardResult;

pub const TRANSFER_TYPE: &str = "application/x-investigation-node";

/// `{ nodeType, data }` carried through the drag transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", content = "data", rename_all = "lowercase")]
pub enum DragPayload {
	Evidence(EvidenceRecord),
	Suspect(SuspectRecord),
}

impl DragPayload {
	pub fn to_transfer(&self) -> BoardResult<String> {
		Ok(serde_json::to_string(self)?)
	}

	pub fn from_transfer(raw: &str) -> Option<Self> {
		serde_json::from_str(raw)
			.map_err(|err| debug!("Ignoring malformed drag payload: {err}"))
			.ok()
	}

	pub fn node_id(&self) -> String {
		match self {
			DragPayload::Evidence(e) => NodeVariant::Evidence.node_id(e.id),
			DragPayload::Suspect(s) => NodeVariant::Suspect.node_id(s.id),
		}
	}

	pub fn into_node(self, position: Position) -> Node {
		match self {
			DragPayload::Evidence(e) => Node::evidence(&e, position),
			DragPayload::Suspect(s) => Node::suspect(&s, position),
		}
	}
}

/// Turn a drop at canvas-relative `(sx, sy)` into a node, if the transfer
/// carried a usable payload.
pub fn resolve_drop(raw: Option<&str>, sx: f64, sy: f64, viewport: &Viewport) -> Option<Node> {
	let raw = raw.filter(|r| !r.trim().is_empty())?;
	let payload = DragPayload::from_transfer(raw)?;
	Some(payload.into_node(viewport.to_document(sx, sy)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::model::NodeKind;

	fn knife() -> DragPayload {
		DragPayload::Evidence(EvidenceRecord {
			id: 12,
			title: "Knife".into(),
			evidence_type: "biological".into(),
			description: String::new(),
			recorded_by: "Cole Phelps".into(),
			created_date: "2024-03-01".into(),
		})
	}

	#[test]
	fn transfer_uses_node_type_and_data() {
		let raw = knife().to_transfer().unwrap();
		let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
		assert_eq!(value["nodeType"], "evidence");
		assert_eq!(value["data"]["title"], "Knife");
		assert_eq!(DragPayload::from_transfer(&raw), Some(knife()));
	}

	#[test]
	fn drop_translates_into_document_space() {
		let raw = knife().to_transfer().unwrap();
		let viewport = Viewport {
			x: 20.0,
			y: 10.0,
			zoom: 0.5,
		};
		let node = resolve_drop(Some(&raw), 95.0, 110.0, &viewport).unwrap();
		assert_eq!(node.id, "evidence-12");
		assert_eq!(node.position, Position::new(150.0, 200.0));
		assert!(matches!(node.kind, NodeKind::Evidence(ref d) if d.title == "Knife"));
	}

	#[test]
	fn missing_or_malformed_payload_is_no_drop() {
		let viewport = Viewport::default();
		assert!(resolve_drop(None, 0.0, 0.0, &viewport).is_none());
		assert!(resolve_drop(Some(""), 0.0, 0.0, &viewport).is_none());
		assert!(resolve_drop(Some("{\"nodeType\":\"case\",\"data\":{}}"), 0.0, 0.0, &viewport).is_none());
		assert!(resolve_drop(Some("not json"), 0.0, 0.0, &viewport).is_none());
	}

	#[test]
	fn suspect_payload_keeps_days() {
		let payload = DragPayload::Suspect(SuspectRecord {
			id: 3,
			name: "Ray Pinker".into(),
			national_id: "0012".into(),
			status: "Arrested".into(),
			days_under_investigation: Some(9),
		});
		assert_eq!(payload.node_id(), "suspect-3");
		let node = payload.into_node(Position::default());
		assert!(matches!(node.kind, NodeKind::Suspect(ref d) if d.days_under_investigation == Some(9)));
	}
}
