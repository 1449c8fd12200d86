//! Graph state container for one board-editing session.
//!
//! `BoardStore` is the only owner of the node and edge lists. The canvas,
//! sidebar and toolbar read it and ask for changes through
//! [`BoardStore::dispatch`]; async work (loading, saving) is split into a
//! `begin_*` call that hands out a ticket and a `finish_*` call that applies
//! the result, so completions from a superseded session are dropped.
//!
//! ```text
//! Empty -> Loading -> Ready(clean) <-> Ready(dirty) -> Saving -> Ready(..)
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::connect::{Connection, EdgeIds, edge_for};
use super::model::{
	Board, BoardData, BoardId, CaseId, Edge, EvidenceRecord, Node, NodeKind, Position,
	Relationship, SuspectRecord, Viewport,
};
use super::permission::Access;
use crate::error::BoardResult;

/// Rewrite saved evidence and suspect cards from the current listings so
/// renamed or retyped records show their present values. Ids and positions
/// are kept; nodes with no matching record are left as saved.
fn refresh_records(nodes: &mut [Node], evidence: &[EvidenceRecord], suspects: &[SuspectRecord]) {
	for node in nodes.iter_mut() {
		let fresh = match &node.kind {
			NodeKind::Evidence(d) => evidence
				.iter()
				.find(|r| r.id == d.evidence_id)
				.map(|r| Node::evidence(r, node.position).kind),
			NodeKind::Suspect(d) => suspects
				.iter()
				.find(|r| r.id == d.suspect_id)
				.map(|r| Node::suspect(r, node.position).kind),
			NodeKind::Case(_) => None,
		};
		if let Some(kind) = fresh {
			node.kind = kind;
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	#[default]
	Empty,
	Loading,
	Ready,
}

/// A mutation requested by the canvas, sidebar or toolbar.
#[derive(Clone, Debug, PartialEq)]
pub enum BoardIntent {
	Instantiate(Node),
	Connect(Connection),
	MoveNode { id: String, position: Position },
	RemoveNode(String),
	RemoveEdge(String),
	RelabelEdge {
		id: String,
		relationship: Relationship,
		notes: Option<String>,
	},
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
	ReadOnly,
	NotReady,
	Duplicate(String),
	UnknownNode(String),
	UnknownEdge(String),
	SelfLink,
	Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
	Applied,
	Rejected(Rejection),
}

impl Outcome {
	pub fn applied(&self) -> bool {
		*self == Outcome::Applied
	}
}

/// Identifies the session a load was started in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
	session: u64,
	case_id: CaseId,
}

impl LoadTicket {
	pub fn case_id(&self) -> CaseId {
		self.case_id
	}
}

/// Everything fetched for a session, ready to be applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadOutcome {
	pub board: Option<Board>,
	pub evidence: Vec<EvidenceRecord>,
	pub suspects: Vec<SuspectRecord>,
	pub error: Option<String>,
}

/// Identifies the session and graph revision a save snapshot was taken at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveTicket {
	session: u64,
	revision: u64,
}

/// A whole-document snapshot to push to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
	pub ticket: SaveTicket,
	pub case_id: CaseId,
	pub board_id: Option<BoardId>,
	pub data: BoardData,
}

/// What the toolbar shows next to the save button.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncStatus {
	Idle,
	Loading,
	Saving,
	SaveFailed(String),
	Unsaved,
	Saved(DateTime<Utc>),
}

#[derive(Clone, Debug, Default)]
pub struct BoardStore {
	phase: Phase,
	case_id: Option<CaseId>,
	board: Option<Board>,
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	evidence_items: Vec<EvidenceRecord>,
	suspects: Vec<SuspectRecord>,
	saving: bool,
	error: Option<String>,
	save_error: Option<String>,
	dirty: bool,
	last_saved: Option<DateTime<Utc>>,
	session: u64,
	revision: u64,
	edge_ids: EdgeIds,
}

impl BoardStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn loading(&self) -> bool {
		self.phase == Phase::Loading
	}

	pub fn saving(&self) -> bool {
		self.saving
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn case_id(&self) -> Option<CaseId> {
		self.case_id
	}

	pub fn board(&self) -> Option<&Board> {
		self.board.as_ref()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	pub fn evidence_items(&self) -> &[EvidenceRecord] {
		&self.evidence_items
	}

	pub fn suspects(&self) -> &[SuspectRecord] {
		&self.suspects
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn save_error(&self) -> Option<&str> {
		self.save_error.as_deref()
	}

	pub fn last_saved(&self) -> Option<DateTime<Utc>> {
		self.last_saved
	}

	/// Viewport stored with the loaded document, if any.
	pub fn saved_viewport(&self) -> Option<Viewport> {
		self.board.as_ref().and_then(|b| b.board_data.viewport)
	}

	/// Start a fresh session for `case_id`, dropping whatever was loaded.
	pub fn begin_load(&mut self, case_id: CaseId) -> LoadTicket {
		self.reset();
		self.phase = Phase::Loading;
		self.case_id = Some(case_id);
		info!("Loading board for case {case_id}");
		LoadTicket {
			session: self.session,
			case_id,
		}
	}

	/// Apply fetched data. Returns false if the session moved on meanwhile.
	pub fn finish_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> bool {
		if ticket.session != self.session || self.phase != Phase::Loading {
			debug!("Discarding stale load for case {}", ticket.case_id);
			return false;
		}
		let LoadOutcome {
			board,
			evidence,
			suspects,
			error,
		} = outcome;

		if let Some(board) = &board {
			self.nodes = board.board_data.nodes.clone();
			self.edges = board.board_data.edges.clone();
			self.last_saved = board.last_modified;
			refresh_records(&mut self.nodes, &evidence, &suspects);
		}
		if let Some(err) = &error {
			warn!("Board for case {} loaded with errors: {err}", ticket.case_id);
		}
		self.edge_ids = EdgeIds::after(&self.edges);
		self.board = board;
		self.evidence_items = evidence;
		self.suspects = suspects;
		self.error = error;
		self.dirty = false;
		self.phase = Phase::Ready;
		true
	}

	/// Apply one mutation. Read-only access and unready sessions never mutate.
	pub fn dispatch(&mut self, intent: BoardIntent, access: Access) -> Outcome {
		if !access.can_edit() {
			debug!("Read-only session ignored {intent:?}");
			return Outcome::Rejected(Rejection::ReadOnly);
		}
		if self.phase != Phase::Ready {
			return Outcome::Rejected(Rejection::NotReady);
		}
		let outcome = match intent {
			BoardIntent::Instantiate(node) => self.instantiate(node),
			BoardIntent::Connect(connection) => self.connect(connection),
			BoardIntent::MoveNode { id, position } => self.move_node(&id, position),
			BoardIntent::RemoveNode(id) => self.remove_node(&id),
			BoardIntent::RemoveEdge(id) => self.remove_edge(&id),
			BoardIntent::RelabelEdge {
				id,
				relationship,
				notes,
			} => self.relabel_edge(&id, relationship, notes),
		};
		if outcome.applied() {
			self.dirty = true;
			self.revision += 1;
		}
		outcome
	}

	fn instantiate(&mut self, node: Node) -> Outcome {
		if self.node(&node.id).is_some() {
			return Outcome::Rejected(Rejection::Duplicate(node.id));
		}
		self.nodes.push(node);
		Outcome::Applied
	}

	fn connect(&mut self, connection: Connection) -> Outcome {
		if !connection.is_link() {
			return Outcome::Rejected(Rejection::SelfLink);
		}
		for end in [&connection.source, &connection.target] {
			if self.node(end).is_none() {
				return Outcome::Rejected(Rejection::UnknownNode(end.clone()));
			}
		}
		let edges = &self.edges;
		let id = self
			.edge_ids
			.next_for(&connection, |id| edges.iter().any(|e| e.id == id));
		self.edges.push(edge_for(&connection, id));
		Outcome::Applied
	}

	fn move_node(&mut self, id: &str, position: Position) -> Outcome {
		let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
			return Outcome::Rejected(Rejection::UnknownNode(id.to_string()));
		};
		if node.position == position {
			return Outcome::Rejected(Rejection::Unchanged);
		}
		node.position = position;
		Outcome::Applied
	}

	fn remove_node(&mut self, id: &str) -> Outcome {
		let before = self.nodes.len();
		self.nodes.retain(|n| n.id != id);
		if self.nodes.len() == before {
			return Outcome::Rejected(Rejection::UnknownNode(id.to_string()));
		}
		self.edges.retain(|e| !e.touches(id));
		Outcome::Applied
	}

	fn remove_edge(&mut self, id: &str) -> Outcome {
		let before = self.edges.len();
		self.edges.retain(|e| e.id != id);
		if self.edges.len() == before {
			return Outcome::Rejected(Rejection::UnknownEdge(id.to_string()));
		}
		Outcome::Applied
	}

	fn relabel_edge(&mut self, id: &str, relationship: Relationship, notes: Option<String>) -> Outcome {
		let notes = notes.filter(|n| !n.trim().is_empty());
		let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
			return Outcome::Rejected(Rejection::UnknownEdge(id.to_string()));
		};
		if edge.data.relationship == relationship && edge.data.notes == notes {
			return Outcome::Rejected(Rejection::Unchanged);
		}
		edge.data.relationship = relationship;
		edge.data.notes = notes;
		Outcome::Applied
	}

	/// Save is allowed when ready, dirty, editable and not already saving.
	pub fn can_save(&self, access: Access) -> bool {
		access.can_edit() && self.phase == Phase::Ready && self.dirty && !self.saving
	}

	/// Snapshot the graph for saving and enter the saving state.
	pub fn begin_save(&mut self, access: Access, viewport: Option<Viewport>) -> Option<SaveRequest> {
		if !self.can_save(access) {
			return None;
		}
		let case_id = self.case_id?;
		self.saving = true;
		self.save_error = None;
		Some(SaveRequest {
			ticket: SaveTicket {
				session: self.session,
				revision: self.revision,
			},
			case_id,
			board_id: self.board.as_ref().map(|b| b.id),
			data: BoardData {
				nodes: self.nodes.clone(),
				edges: self.edges.clone(),
				viewport,
			},
		})
	}

	/// Apply a save result. Failure keeps the graph dirty for the next try;
	/// success clears dirty only if nothing changed while it was in flight.
	pub fn finish_save(&mut self, ticket: SaveTicket, result: BoardResult<Board>, now: DateTime<Utc>) -> bool {
		if ticket.session != self.session {
			debug!("Discarding save result from a closed session");
			return false;
		}
		self.saving = false;
		match result {
			Ok(board) => {
				info!("Board {} saved for case {}", board.id, board.case);
				self.board = Some(board);
				self.last_saved = Some(now);
				if self.revision == ticket.revision {
					self.dirty = false;
				}
			}
			Err(err) => {
				warn!("Board save failed: {err}");
				self.save_error = Some(err.user_message());
			}
		}
		true
	}

	pub fn dismiss_errors(&mut self) {
		self.error = None;
		self.save_error = None;
	}

	/// Leave the board: back to empty, unsaved edits discarded.
	pub fn clear(&mut self) {
		if self.dirty {
			info!("Discarding unsaved board edits");
		}
		self.reset();
	}

	fn reset(&mut self) {
		let session = self.session + 1;
		*self = Self {
			session,
			..Self::default()
		};
	}

	pub fn status(&self) -> SyncStatus {
		if self.phase == Phase::Loading {
			SyncStatus::Loading
		} else if self.saving {
			SyncStatus::Saving
		} else if let Some(err) = &self.save_error {
			SyncStatus::SaveFailed(err.clone())
		} else if self.dirty {
			SyncStatus::Unsaved
		} else if let Some(at) = self.last_saved {
			SyncStatus::Saved(at)
		} else {
			SyncStatus::Idle
		}
	}
}
