//! Graph document model: nodes, edges, viewport and the persisted board.
//!
//! The JSON layout matches what earlier clients stored in `board_data`, so
//! documents round-trip between them. Reading is lenient: a missing or
//! `null` document is an empty board and broken entries are skipped.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backend identifier of a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub u64);

/// Backend identifier of a board document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(pub u64);

impl fmt::Display for CaseId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl fmt::Display for BoardId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A point in document (canvas) units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Pan offset and zoom factor of the canvas.
///
/// `screen = document * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
		}
	}
}

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

impl Viewport {
	/// Inverse transform of a canvas-relative screen point.
	pub fn to_document(&self, sx: f64, sy: f64) -> Position {
		Position {
			x: (sx - self.x) / self.zoom,
			y: (sy - self.y) / self.zoom,
		}
	}

	pub fn to_screen(&self, p: Position) -> (f64, f64) {
		(p.x * self.zoom + self.x, p.y * self.zoom + self.y)
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = zoom / self.zoom;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.zoom = zoom;
	}
}

/// Evidence projection returned by the evidence listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
	pub id: u64,
	pub title: String,
	pub evidence_type: String,
	#[serde(default)]
	pub description: String,
	pub recorded_by: String,
	#[serde(default)]
	pub created_date: String,
}

/// Suspect projection returned by the suspect listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuspectRecord {
	pub id: u64,
	pub name: String,
	#[serde(default)]
	pub national_id: String,
	pub status: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub days_under_investigation: Option<u32>,
}

/// Case summary used for the pinned case node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
	pub id: u64,
	pub title: String,
	pub severity: String,
	pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceNodeData {
	pub evidence_id: u64,
	pub title: String,
	pub evidence_type: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub recorded_by: String,
	#[serde(default)]
	pub created_date: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspectNodeData {
	pub suspect_id: u64,
	pub name: String,
	#[serde(default)]
	pub national_id: String,
	pub status: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub days_under_investigation: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseNodeData {
	pub case_id: u64,
	pub title: String,
	pub severity: String,
	pub status: String,
}

/// The closed set of node variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeVariant {
	Evidence,
	Suspect,
	Case,
}

impl NodeVariant {
	pub fn as_str(self) -> &'static str {
		match self {
			NodeVariant::Evidence => "evidence",
			NodeVariant::Suspect => "suspect",
			NodeVariant::Case => "case",
		}
	}

	/// Provenance-encoding identifier, e.g. `evidence-42`.
	pub fn node_id(self, source_id: u64) -> String {
		format!("{}-{}", self.as_str(), source_id)
	}
}

/// Variant payload, serialized as `"type"` plus `"data"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum NodeKind {
	Evidence(EvidenceNodeData),
	Suspect(SuspectNodeData),
	Case(CaseNodeData),
}

impl NodeKind {
	pub fn variant(&self) -> NodeVariant {
		match self {
			NodeKind::Evidence(_) => NodeVariant::Evidence,
			NodeKind::Suspect(_) => NodeVariant::Suspect,
			NodeKind::Case(_) => NodeVariant::Case,
		}
	}

	pub fn source_id(&self) -> u64 {
		match self {
			NodeKind::Evidence(d) => d.evidence_id,
			NodeKind::Suspect(d) => d.suspect_id,
			NodeKind::Case(d) => d.case_id,
		}
	}

	/// Headline text shown on the node card.
	pub fn title(&self) -> &str {
		match self {
			NodeKind::Evidence(d) => &d.title,
			NodeKind::Suspect(d) => &d.name,
			NodeKind::Case(d) => &d.title,
		}
	}
}

/// A positioned vertex on the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: String,
	pub position: Position,
	#[serde(flatten)]
	pub kind: NodeKind,
}

impl Node {
	pub fn evidence(record: &EvidenceRecord, position: Position) -> Self {
		Self {
			id: NodeVariant::Evidence.node_id(record.id),
			position,
			kind: NodeKind::Evidence(EvidenceNodeData {
				evidence_id: record.id,
				title: record.title.clone(),
				evidence_type: record.evidence_type.clone(),
				description: record.description.clone(),
				recorded_by: record.recorded_by.clone(),
				created_date: record.created_date.clone(),
			}),
		}
	}

	pub fn suspect(record: &SuspectRecord, position: Position) -> Self {
		Self {
			id: NodeVariant::Suspect.node_id(record.id),
			position,
			kind: NodeKind::Suspect(SuspectNodeData {
				suspect_id: record.id,
				name: record.name.clone(),
				national_id: record.national_id.clone(),
				status: record.status.clone(),
				days_under_investigation: record.days_under_investigation,
			}),
		}
	}

	pub fn case(record: &CaseRecord, position: Position) -> Self {
		Self {
			id: NodeVariant::Case.node_id(record.id),
			position,
			kind: NodeKind::Case(CaseNodeData {
				case_id: record.id,
				title: record.title.clone(),
				severity: record.severity.clone(),
				status: record.status.clone(),
			}),
		}
	}

	pub fn variant(&self) -> NodeVariant {
		self.kind.variant()
	}
}

/// Typed meaning of a connection between two nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
	#[default]
	RelatedTo,
	Contradicts,
	Supports,
	Timeline,
	#[serde(other)]
	Other,
}

impl Relationship {
	pub const ALL: [Relationship; 5] = [
		Relationship::RelatedTo,
		Relationship::Contradicts,
		Relationship::Supports,
		Relationship::Timeline,
		Relationship::Other,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Relationship::RelatedTo => "related_to",
			Relationship::Contradicts => "contradicts",
			Relationship::Supports => "supports",
			Relationship::Timeline => "timeline",
			Relationship::Other => "other",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Relationship::RelatedTo => "Related To",
			Relationship::Contradicts => "Contradicts",
			Relationship::Supports => "Supports",
			Relationship::Timeline => "Timeline",
			Relationship::Other => "Other",
		}
	}

	pub fn parse(tag: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|r| r.as_str() == tag)
			.unwrap_or(Relationship::Other)
	}
}

pub const EDGE_COLOR: &str = "#4fc3f7";
pub const EDGE_WIDTH: f64 = 2.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeStyle {
	pub stroke: String,
	pub stroke_width: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			stroke: EDGE_COLOR.into(),
			stroke_width: EDGE_WIDTH,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeMarker {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
}

impl Default for EdgeMarker {
	fn default() -> Self {
		Self {
			kind: "arrowclosed".into(),
			color: Some(EDGE_COLOR.into()),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeData {
	pub relationship: Relationship,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

fn default_edge_type() -> String {
	"smoothstep".into()
}

fn default_animated() -> bool {
	true
}

/// A directed, styled connection between two node ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type", default = "default_edge_type")]
	pub edge_type: String,
	#[serde(default = "default_animated")]
	pub animated: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub marker_end: Option<EdgeMarker>,
	#[serde(default)]
	pub style: EdgeStyle,
	#[serde(default)]
	pub data: EdgeData,
}

impl Edge {
	/// Edge with the default animated, arrow-terminated style.
	pub fn styled(id: String, source: String, target: String, data: EdgeData) -> Self {
		Self {
			id,
			source,
			target,
			edge_type: default_edge_type(),
			animated: true,
			marker_end: Some(EdgeMarker::default()),
			style: EdgeStyle::default(),
			data,
		}
	}

	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

/// The persisted `board_data` document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BoardData {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub viewport: Option<Viewport>,
}

impl BoardData {
	/// Read a stored document, skipping entries that do not parse.
	pub fn from_value(value: Value) -> Self {
		let Value::Object(mut doc) = value else {
			if !value.is_null() {
				warn!("board_data is not an object; starting from an empty board");
			}
			return Self::default();
		};

		let mut seen = HashSet::new();
		let nodes: Vec<Node> = entries(doc.remove("nodes"), "node")
			.into_iter()
			.filter(|n: &Node| {
				let fresh = seen.insert(n.id.clone());
				if !fresh {
					warn!("Dropping duplicate node id {}", n.id);
				}
				fresh
			})
			.collect();

		let edges = entries(doc.remove("edges"), "edge")
			.into_iter()
			.filter(|e: &Edge| {
				let linked = seen.contains(&e.source) && seen.contains(&e.target);
				if !linked {
					warn!("Dropping edge {} with a missing endpoint", e.id);
				}
				linked
			})
			.collect();

		let viewport = doc
			.remove("viewport")
			.and_then(|v| serde_json::from_value::<Viewport>(v).ok())
			.filter(|v| v.zoom > 0.0);

		Self {
			nodes,
			edges,
			viewport,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

fn entries<T: for<'de> Deserialize<'de>>(list: Option<Value>, what: &str) -> Vec<T> {
	let Some(Value::Array(items)) = list else {
		return Vec::new();
	};
	items
		.into_iter()
		.filter_map(|item| match serde_json::from_value(item) {
			Ok(parsed) => Some(parsed),
			Err(err) => {
				warn!("Skipping unreadable {what}: {err}");
				None
			}
		})
		.collect()
}

impl<'de> Deserialize<'de> for BoardData {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Option::<Value>::deserialize(deserializer)?;
		Ok(Self::from_value(value.unwrap_or(Value::Null)))
	}
}

/// Minimal user reference carried on a board.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
	pub id: u64,
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub full_name: String,
}

impl UserSummary {
	pub fn display_name(&self) -> &str {
		if !self.full_name.is_empty() {
			&self.full_name
		} else if !self.username.is_empty() {
			&self.username
		} else {
			"Unknown"
		}
	}
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
	let raw = Option::<String>::deserialize(deserializer)?;
	Ok(raw.and_then(|s| {
		DateTime::parse_from_rfc3339(&s)
			.map(|t| t.with_timezone(&Utc))
			.map_err(|err| warn!("Ignoring unreadable timestamp {s:?}: {err}"))
			.ok()
	}))
}

/// Board listings nest the case as an object; older payloads carry the bare id.
fn case_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CaseId, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum CaseRef {
		Id(u64),
		Nested { id: u64 },
	}
	Ok(match CaseRef::deserialize(deserializer)? {
		CaseRef::Id(id) | CaseRef::Nested { id } => CaseId(id),
	})
}

/// One board document per case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
	pub id: BoardId,
	#[serde(deserialize_with = "case_ref")]
	pub case: CaseId,
	#[serde(default)]
	pub board_data: BoardData,
	#[serde(default, deserialize_with = "lenient_timestamp")]
	pub last_modified: Option<DateTime<Utc>>,
	#[serde(default)]
	pub last_modified_by: Option<UserSummary>,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn knife() -> EvidenceRecord {
		EvidenceRecord {
			id: 12,
			title: "Knife".into(),
			evidence_type: "biological".into(),
			description: "Found in the kitchen".into(),
			recorded_by: "Cole Phelps".into(),
			created_date: "2024-03-01".into(),
		}
	}

	#[test]
	fn node_ids_encode_provenance() {
		let node = Node::evidence(&knife(), Position::new(1.0, 2.0));
		assert_eq!(node.id, "evidence-12");
		assert_eq!(node.variant(), NodeVariant::Evidence);
		assert_eq!(node.kind.title(), "Knife");
	}

	#[test]
	fn node_serializes_as_type_and_data() {
		let node = Node::evidence(&knife(), Position::new(150.0, 200.0));
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["id"], "evidence-12");
		assert_eq!(value["type"], "evidence");
		assert_eq!(value["position"], json!({"x": 150.0, "y": 200.0}));
		assert_eq!(value["data"]["evidenceId"], 12);
		assert_eq!(value["data"]["recordedBy"], "Cole Phelps");
	}

	#[test]
	fn nodes_from_older_clients_ignore_extra_keys() {
		let value = json!({
			"id": "suspect-3",
			"type": "suspect",
			"position": {"x": 10, "y": 20},
			"positionAbsolute": {"x": 10, "y": 20},
			"width": 180,
			"selected": false,
			"data": {"suspectId": 3, "name": "Ray Pinker", "nationalId": "991", "status": "Arrested"}
		});
		let node: Node = serde_json::from_value(value).unwrap();
		assert_eq!(node.id, "suspect-3");
		assert!(matches!(node.kind, NodeKind::Suspect(ref d) if d.days_under_investigation.is_none()));
	}

	#[test]
	fn missing_or_null_document_is_empty() {
		assert!(BoardData::from_value(Value::Null).is_empty());
		assert!(BoardData::from_value(json!({})).is_empty());
		let board: Board = serde_json::from_value(json!({"id": 1, "case": 7, "board_data": null})).unwrap();
		assert!(board.board_data.is_empty());
		assert!(board.board_data.viewport.is_none());
	}

	#[test]
	fn broken_entries_are_skipped() {
		let data = BoardData::from_value(json!({
			"nodes": [
				{"id": "evidence-1", "type": "evidence", "position": {"x": 0, "y": 0},
				 "data": {"evidenceId": 1, "title": "Glove", "evidenceType": "other"}},
				{"id": "mystery-1", "type": "mystery", "position": {"x": 0, "y": 0}, "data": {}},
				{"id": "evidence-1", "type": "evidence", "position": {"x": 5, "y": 5},
				 "data": {"evidenceId": 1, "title": "Glove", "evidenceType": "other"}}
			],
			"edges": [
				{"id": "e1", "source": "evidence-1", "target": "mystery-1"},
				{"id": "e2", "source": "evidence-1", "target": "evidence-1"}
			],
			"viewport": {"x": 3, "y": 4, "zoom": 1.5}
		}));
		assert_eq!(data.nodes.len(), 1);
		assert_eq!(data.nodes[0].position, Position::new(0.0, 0.0));
		assert_eq!(data.edges.len(), 1);
		assert_eq!(data.edges[0].id, "e2");
		assert_eq!(data.viewport, Some(Viewport { x: 3.0, y: 4.0, zoom: 1.5 }));
	}

	#[test]
	fn bare_edges_get_default_style() {
		let edge: Edge = serde_json::from_value(json!({
			"id": "e", "source": "a", "target": "b", "type": "red"
		}))
		.unwrap();
		assert!(edge.animated);
		assert_eq!(edge.style, EdgeStyle::default());
		assert_eq!(edge.data.relationship, Relationship::RelatedTo);
	}

	#[test]
	fn unknown_relationship_reads_as_other() {
		let data: EdgeData = serde_json::from_value(json!({"relationship": "alibi"})).unwrap();
		assert_eq!(data.relationship, Relationship::Other);
		assert_eq!(Relationship::parse("supports"), Relationship::Supports);
	}

	#[test]
	fn viewport_transform_inverts() {
		let viewport = Viewport {
			x: 40.0,
			y: -25.0,
			zoom: 2.0,
		};
		let p = viewport.to_document(340.0, 375.0);
		assert_eq!(p, Position::new(150.0, 200.0));
		assert_eq!(viewport.to_screen(p), (340.0, 375.0));
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut viewport = Viewport::default();
		let before = viewport.to_document(100.0, 50.0);
		viewport.zoom_at(100.0, 50.0, 2.0);
		assert_eq!(viewport.to_document(100.0, 50.0), before);
		viewport.zoom_at(0.0, 0.0, 100.0);
		assert_eq!(viewport.zoom, MAX_ZOOM);
	}

	#[test]
	fn board_timestamps_are_lenient() {
		let board: Board = serde_json::from_value(json!({
			"id": 4, "case": 7, "board_data": {"nodes": []},
			"last_modified": "2024-05-02T10:11:12.123456Z",
			"last_modified_by": {"id": 2, "username": "cphelps", "full_name": ""}
		}))
		.unwrap();
		assert!(board.last_modified.is_some());
		assert_eq!(board.last_modified_by.unwrap().display_name(), "cphelps");

		let board: Board =
			serde_json::from_value(json!({"id": 4, "case": 7, "last_modified": "yesterday"})).unwrap();
		assert!(board.last_modified.is_none());
	}

	#[test]
	fn board_case_may_be_nested() {
		let board: Board = serde_json::from_value(json!({
			"id": 4, "case": {"id": 7, "title": "The Red Lipstick Murder", "status": "open"}
		}))
		.unwrap();
		assert_eq!(board.case, CaseId(7));
	}
}
