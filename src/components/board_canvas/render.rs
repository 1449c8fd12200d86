use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{
	CARD_HEIGHT, CARD_RADIUS, CARD_WIDTH, CanvasState, HANDLE_RADIUS, Selection, input_anchor, output_anchor, truncate,
};
use crate::board::model::{EDGE_COLOR, Edge, Position, Relationship, Viewport};
use crate::board::style::{Card, card_for};

const BACKGROUND: &str = "#0b1320";
const GRID_DOT: &str = "rgba(120, 144, 156, 0.25)";
const GRID_STEP: f64 = 24.0;

/// Everything a frame needs besides the canvas state itself.
pub struct Frame<'a> {
	pub viewport: &'a Viewport,
	pub selection: Option<&'a Selection>,
	pub read_only: bool,
}

pub fn render(state: &CanvasState, frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let v = frame.viewport;
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(v.x, v.y);
	let _ = ctx.scale(v.zoom, v.zoom);
	draw_grid(state, v, ctx);
	draw_edges(state, frame, ctx);
	draw_link_preview(state, v, ctx);
	draw_nodes(state, frame, ctx);
	ctx.restore();

	if state.nodes.is_empty() {
		ctx.set_fill_style_str("rgba(176, 190, 197, 0.6)");
		ctx.set_font("14px sans-serif");
		ctx.set_text_align("center");
		let hint = if frame.read_only {
			"This board is empty"
		} else {
			"Drag evidence or suspects from the sidebar onto the board"
		};
		let _ = ctx.fill_text(hint, state.width / 2.0, state.height / 2.0);
		ctx.set_text_align("start");
	}
}

fn draw_grid(state: &CanvasState, v: &Viewport, ctx: &CanvasRenderingContext2d) {
	if v.zoom < 0.3 {
		return;
	}
	let top_left = v.to_document(0.0, 0.0);
	let bottom_right = v.to_document(state.width, state.height);
	let size = 1.5 / v.zoom;
	ctx.set_fill_style_str(GRID_DOT);
	let mut x = (top_left.x / GRID_STEP).floor() * GRID_STEP;
	while x <= bottom_right.x {
		let mut y = (top_left.y / GRID_STEP).floor() * GRID_STEP;
		while y <= bottom_right.y {
			ctx.fill_rect(x, y, size, size);
			y += GRID_STEP;
		}
		x += GRID_STEP;
	}
}

fn arrow_head(ctx: &CanvasRenderingContext2d, tip: Position, ux: f64, uy: f64, size: f64) {
	let (back_x, back_y) = (tip.x - ux * size, tip.y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edge(state: &CanvasState, edge: &Edge, selected: bool, ctx: &CanvasRenderingContext2d, k: f64) {
	let (Some(from), Some(to)) = (state.node_position(&edge.source), state.node_position(&edge.target)) else {
		return;
	};
	let (a, b) = (output_anchor(from), input_anchor(to));
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let arrow_size = 10.0;
	let width = if selected {
		edge.style.stroke_width * 2.0
	} else {
		edge.style.stroke_width
	};

	ctx.set_stroke_style_str(&edge.style.stroke);
	ctx.set_line_width(width);
	if edge.animated {
		let (dash, gap) = (8.0, 4.0);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(-(state.flow_time * 30.0) % (dash + gap));
	}
	ctx.begin_path();
	ctx.move_to(a.x, a.y);
	ctx.line_to(b.x - ux * arrow_size, b.y - uy * arrow_size);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if edge.marker_end.is_some() {
		let color = edge
			.marker_end
			.as_ref()
			.and_then(|m| m.color.as_deref())
			.unwrap_or(edge.style.stroke.as_str());
		ctx.set_fill_style_str(color);
		arrow_head(ctx, b, ux, uy, arrow_size);
	}

	let label = match (&edge.data.relationship, &edge.data.notes) {
		(Relationship::RelatedTo, None) => None,
		(relationship, None) => Some(relationship.label().to_string()),
		(relationship, Some(notes)) => Some(format!("{}: {}", relationship.label(), truncate(notes, 24))),
	};
	if let Some(label) = label {
		ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.75)));
		ctx.set_text_align("center");
		ctx.set_fill_style_str("#e1f5fe");
		let _ = ctx.fill_text(&label, (a.x + b.x) / 2.0, (a.y + b.y) / 2.0 - 6.0);
		ctx.set_text_align("start");
	}
}

fn draw_edges(state: &CanvasState, frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	for edge in &state.edges {
		let selected = matches!(frame.selection, Some(Selection::Edge(id)) if *id == edge.id);
		draw_edge(state, edge, selected, ctx, frame.viewport.zoom);
	}
}

fn draw_link_preview(state: &CanvasState, v: &Viewport, ctx: &CanvasRenderingContext2d) {
	let Some(from) = state.link.source.as_deref().and_then(|id| state.node_position(id)) else {
		return;
	};
	let a = output_anchor(from);
	let b = state.link.cursor;
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_global_alpha(0.6);
	ctx.set_line_width(2.0 / v.zoom);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0)));
	ctx.begin_path();
	ctx.move_to(a.x, a.y);
	ctx.line_to(b.x, b.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_handle(ctx: &CanvasRenderingContext2d, at: Position, accent: &str) {
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, HANDLE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill();
	ctx.set_stroke_style_str(accent);
	ctx.set_line_width(2.0);
	ctx.stroke();
}

fn draw_card(ctx: &CanvasRenderingContext2d, at: Position, card: &Card, highlight: Option<&str>, handles: bool) {
	let (x, y) = (at.x, at.y);
	rounded_rect(ctx, x, y, CARD_WIDTH, CARD_HEIGHT, CARD_RADIUS);
	ctx.set_fill_style_str(card.background);
	ctx.fill();
	ctx.set_stroke_style_str(highlight.unwrap_or(card.accent));
	ctx.set_line_width(if highlight.is_some() { 3.0 } else { 1.5 });
	ctx.stroke();

	ctx.set_fill_style_str(card.accent);
	ctx.fill_rect(x + CARD_RADIUS, y, CARD_WIDTH - 2.0 * CARD_RADIUS, 3.0);

	ctx.set_font("bold 10px sans-serif");
	let _ = ctx.fill_text(&card.badge.to_uppercase(), x + 12.0, y + 20.0);

	ctx.set_fill_style_str("#eceff1");
	ctx.set_font("bold 14px sans-serif");
	let _ = ctx.fill_text(&truncate(&card.title, 24), x + 12.0, y + 40.0);

	ctx.set_fill_style_str("#b0bec5");
	ctx.set_font("11px sans-serif");
	let _ = ctx.fill_text(&truncate(&card.subtitle, 30), x + 12.0, y + 58.0);

	if let Some(footer) = &card.footer {
		ctx.set_fill_style_str("#78909c");
		ctx.set_font("10px sans-serif");
		let _ = ctx.fill_text(&truncate(footer, 32), x + 12.0, y + 76.0);
	}

	if handles {
		draw_handle(ctx, input_anchor(at), card.accent);
		draw_handle(ctx, output_anchor(at), card.accent);
	}
}

fn draw_nodes(state: &CanvasState, frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	for node in &state.nodes {
		let selected = matches!(frame.selection, Some(Selection::Node(id)) if *id == node.id);
		let hovered = state.hover.as_deref() == Some(node.id.as_str());
		let highlight = if selected {
			Some("#ffffff")
		} else if hovered {
			Some("#cfd8dc")
		} else {
			None
		};
		let card = card_for(node);
		draw_card(ctx, state.position_of(node), &card, highlight, !frame.read_only);
	}
}
