use crate::board::model::{Edge, Node, Position, Viewport, MAX_ZOOM};

pub const CARD_WIDTH: f64 = 200.0;
pub const CARD_HEIGHT: f64 = 86.0;
pub const CARD_RADIUS: f64 = 8.0;
pub const HANDLE_RADIUS: f64 = 6.0;
/// Handle and edge hit slop, in screen pixels.
pub const HIT_SLOP: f64 = 6.0;

/// What the user has picked on the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
	Node(String),
	Edge(String),
}

/// What lies under a canvas point, topmost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
	Output(String),
	Input(String),
	Node(String),
	Edge(String),
	Background,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	pub current: Position,
}

impl DragState {
	pub fn moved(&self) -> bool {
		self.node_id.is_some() && self.current != self.node_start
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub viewport_start_x: f64,
	pub viewport_start_y: f64,
}

/// A connection being drawn from an output handle.
#[derive(Clone, Debug, Default)]
pub struct LinkState {
	pub source: Option<String>,
	pub cursor: Position,
}

/// Input handle sits on the left edge, output on the right.
pub fn input_anchor(p: Position) -> Position {
	Position::new(p.x, p.y + CARD_HEIGHT / 2.0)
}

pub fn output_anchor(p: Position) -> Position {
	Position::new(p.x + CARD_WIDTH, p.y + CARD_HEIGHT / 2.0)
}

fn distance(a: Position, b: Position) -> f64 {
	((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 < f64::EPSILON {
		return distance(p, a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	distance(p, Position::new(a.x + t * dx, a.y + t * dy))
}

/// Canvas-side mirror of the store's graph plus interaction state.
///
/// The graph lists are replaced wholesale whenever the store changes; the
/// only local deviation is the position of a node being dragged.
#[derive(Clone, Debug, Default)]
pub struct CanvasState {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub drag: DragState,
	pub pan: PanState,
	pub link: LinkState,
	pub hover: Option<String>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasState {
	pub fn sync(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		if let Some(id) = &self.drag.node_id {
			if !nodes.iter().any(|n| &n.id == id) {
				self.drag = DragState::default();
			}
		}
		if let Some(id) = &self.link.source {
			if !nodes.iter().any(|n| &n.id == id) {
				self.link = LinkState::default();
			}
		}
		self.nodes = nodes;
		self.edges = edges;
	}

	/// Where `node` is drawn right now.
	pub fn position_of(&self, node: &Node) -> Position {
		match &self.drag.node_id {
			Some(id) if *id == node.id => self.drag.current,
			_ => node.position,
		}
	}

	pub fn node_position(&self, id: &str) -> Option<Position> {
		self.nodes.iter().find(|n| n.id == id).map(|n| self.position_of(n))
	}

	/// Move a node locally until the store catches up.
	pub fn place(&mut self, id: &str, position: Position) {
		if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
			node.position = position;
		}
	}

	pub fn hit(&self, sx: f64, sy: f64, viewport: &Viewport, handles: bool) -> Hit {
		let p = viewport.to_document(sx, sy);
		let slop = HIT_SLOP / viewport.zoom;

		// Last drawn is on top.
		for node in self.nodes.iter().rev() {
			let at = self.position_of(node);
			if handles {
				if distance(p, output_anchor(at)) <= HANDLE_RADIUS + slop {
					return Hit::Output(node.id.clone());
				}
				if distance(p, input_anchor(at)) <= HANDLE_RADIUS + slop {
					return Hit::Input(node.id.clone());
				}
			}
			if p.x >= at.x && p.x <= at.x + CARD_WIDTH && p.y >= at.y && p.y <= at.y + CARD_HEIGHT {
				return Hit::Node(node.id.clone());
			}
		}

		for edge in self.edges.iter().rev() {
			let (Some(from), Some(to)) = (self.node_position(&edge.source), self.node_position(&edge.target)) else {
				continue;
			};
			if distance_to_segment(p, output_anchor(from), input_anchor(to)) <= slop {
				return Hit::Edge(edge.id.clone());
			}
		}
		Hit::Background
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Viewport that shows every node with `margin` pixels to spare.
pub fn fit_viewport(nodes: &[Node], width: f64, height: f64, margin: f64) -> Viewport {
	if nodes.is_empty() || width <= 0.0 || height <= 0.0 {
		return Viewport::default();
	}
	let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
	let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
	for node in nodes {
		min_x = min_x.min(node.position.x);
		min_y = min_y.min(node.position.y);
		max_x = max_x.max(node.position.x + CARD_WIDTH);
		max_y = max_y.max(node.position.y + CARD_HEIGHT);
	}
	let (span_x, span_y) = (max_x - min_x, max_y - min_y);
	let zoom = ((width - 2.0 * margin) / span_x)
		.min((height - 2.0 * margin) / span_y)
		.clamp(0.1, MAX_ZOOM.min(1.5));
	Viewport {
		x: (width - span_x * zoom) / 2.0 - min_x * zoom,
		y: (height - span_y * zoom) / 2.0 - min_y * zoom,
		zoom,
	}
}

/// Clip `text` to `max` characters with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_string();
	}
	let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
	clipped.push('…');
	clipped
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::connect::{edge_for, Connection};
	use crate::board::model::{EvidenceRecord, SuspectRecord};

	fn state() -> CanvasState {
		let knife = EvidenceRecord {
			id: 12,
			title: "Knife".into(),
			evidence_type: "biological".into(),
			description: String::new(),
			recorded_by: "Cole Phelps".into(),
			created_date: String::new(),
		};
		let pinker = SuspectRecord {
			id: 3,
			name: "Ray Pinker".into(),
			national_id: String::new(),
			status: "Arrested".into(),
			days_under_investigation: None,
		};
		let mut state = CanvasState::default();
		state.sync(
			vec![
				Node::evidence(&knife, Position::new(0.0, 0.0)),
				Node::suspect(&pinker, Position::new(400.0, 0.0)),
			],
			vec![edge_for(&Connection::new("evidence-12", "suspect-3"), "edge-1".into())],
		);
		state
	}

	#[test]
	fn hits_prefer_handles_then_cards_then_edges() {
		let s = state();
		let v = Viewport::default();
		assert_eq!(s.hit(CARD_WIDTH, CARD_HEIGHT / 2.0, &v, true), Hit::Output("evidence-12".into()));
		assert_eq!(s.hit(CARD_WIDTH, CARD_HEIGHT / 2.0, &v, false), Hit::Node("evidence-12".into()));
		assert_eq!(s.hit(400.0, CARD_HEIGHT / 2.0, &v, true), Hit::Input("suspect-3".into()));
		assert_eq!(s.hit(300.0, CARD_HEIGHT / 2.0 + 2.0, &v, true), Hit::Edge("edge-1".into()));
		assert_eq!(s.hit(300.0, 300.0, &v, true), Hit::Background);
	}

	#[test]
	fn hits_follow_the_viewport() {
		let s = state();
		let v = Viewport {
			x: 100.0,
			y: 50.0,
			zoom: 2.0,
		};
		assert_eq!(s.hit(110.0, 60.0, &v, true), Hit::Node("evidence-12".into()));
		assert_eq!(s.hit(90.0, 40.0, &v, true), Hit::Background);
	}

	#[test]
	fn dragged_node_draws_at_drag_position() {
		let mut s = state();
		s.drag.node_id = Some("evidence-12".into());
		s.drag.current = Position::new(50.0, 60.0);
		assert_eq!(s.node_position("evidence-12"), Some(Position::new(50.0, 60.0)));
		assert!(s.drag.moved());

		let nodes = s.nodes[1..].to_vec();
		s.sync(nodes, Vec::new());
		assert!(s.drag.node_id.is_none());
	}

	#[test]
	fn segment_distance_clamps_to_ends() {
		let (a, b) = (Position::new(0.0, 0.0), Position::new(10.0, 0.0));
		assert_eq!(distance_to_segment(Position::new(5.0, 3.0), a, b), 3.0);
		assert_eq!(distance_to_segment(Position::new(13.0, 4.0), a, b), 5.0);
		assert_eq!(distance_to_segment(Position::new(3.0, 4.0), a, a), 5.0);
	}

	#[test]
	fn fit_centers_all_cards() {
		let s = state();
		let v = fit_viewport(&s.nodes, 1000.0, 600.0, 40.0);
		let (left, top) = v.to_screen(Position::new(0.0, 0.0));
		let (right, bottom) = v.to_screen(Position::new(400.0 + CARD_WIDTH, CARD_HEIGHT));
		assert!(left >= 40.0 - 1e-9 && right <= 960.0 + 1e-9);
		assert!((left + right - 1000.0).abs() < 1e-9);
		assert!((top + bottom - 600.0).abs() < 1e-9);
		assert_eq!(fit_viewport(&[], 1000.0, 600.0, 40.0), Viewport::default());
	}

	#[test]
	fn truncate_marks_clipped_text() {
		assert_eq!(truncate("Knife", 10), "Knife");
		assert_eq!(truncate("Bloody kitchen knife", 8), "Bloody …");
	}
}
