use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::render::{self, Frame};
use super::state::{CanvasState, DragState, Hit, LinkState, PanState, Selection};
use crate::board::connect::Connection;
use crate::board::drag::{TRANSFER_TYPE, resolve_drop};
use crate::board::model::{Edge, Node, Position, Viewport};
use crate::board::store::BoardIntent;

/// Canvas-relative coordinates of a pointer event.
fn local_point(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn fit_to_parent(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0));
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	(w, h)
}

fn set_cursor(canvas_ref: NodeRef<Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get_untracked() {
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

/// Board surface: draws the store's graph and turns pointer work into
/// [`BoardIntent`]s. It never edits the graph itself.
#[component]
pub fn BoardCanvas(
	#[prop(into)] nodes: Signal<Vec<Node>>,
	#[prop(into)] edges: Signal<Vec<Edge>>,
	#[prop(into)] read_only: Signal<bool>,
	viewport: RwSignal<Viewport>,
	selection: RwSignal<Option<Selection>>,
	canvas_ref: NodeRef<Canvas>,
	on_intent: Callback<BoardIntent>,
) -> impl IntoView {
	let state: Rc<RefCell<CanvasState>> = Rc::new(RefCell::new(CanvasState::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) = (state.clone(), animate.clone(), resize_cb.clone());

	let state_sync = state.clone();
	Effect::new(move |_| {
		let (nodes, edges) = (nodes.get(), edges.get());
		state_sync.borrow_mut().sync(nodes, edges);
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable; board will not render");
			return;
		};
		let (w, h) = fit_to_parent(&canvas);
		state_init.borrow_mut().resize(w, h);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = fit_to_parent(&canvas_resize);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, resize_inner) =
			(state_init.clone(), animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			// Unmounted: stop the loop and detach the resize listener.
			if !canvas.is_connected() {
				if let Some(ref cb) = *resize_inner.borrow() {
					let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				return;
			}
			let (Some(v), Some(selected), Some(read_only)) = (
				viewport.try_get_untracked(),
				selection.try_get_untracked(),
				read_only.try_get_untracked(),
			) else {
				return;
			};
			{
				let mut s = state_anim.borrow_mut();
				s.tick(0.016);
				let frame = Frame {
					viewport: &v,
					selection: selected.as_ref(),
					read_only,
				};
				render::render(&s, &frame, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let v = viewport.get_untracked();
		let editable = !read_only.get_untracked();
		let mut s = state_md.borrow_mut();
		let hit = s.hit(x, y, &v, editable);
		match hit {
			Hit::Output(id) => {
				s.link = LinkState {
					source: Some(id),
					cursor: v.to_document(x, y),
				};
			}
			Hit::Node(id) | Hit::Input(id) => {
				if editable {
					let start = s.node_position(&id).unwrap_or_default();
					s.drag = DragState {
						node_id: Some(id.clone()),
						start_x: x,
						start_y: y,
						node_start: start,
						current: start,
					};
				}
				selection.set(Some(Selection::Node(id)));
			}
			Hit::Edge(id) => selection.set(Some(Selection::Edge(id))),
			Hit::Background => {
				selection.set(None);
				s.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					viewport_start_x: v.x,
					viewport_start_y: v.y,
				};
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let v = viewport.get_untracked();
		let editable = !read_only.get_untracked();
		let mut s = state_mm.borrow_mut();

		if s.drag.node_id.is_some() {
			s.drag.current = Position::new(
				s.drag.node_start.x + (x - s.drag.start_x) / v.zoom,
				s.drag.node_start.y + (y - s.drag.start_y) / v.zoom,
			);
		} else if s.link.source.is_some() {
			s.link.cursor = v.to_document(x, y);
		} else if s.pan.active {
			let (nx, ny) = (
				s.pan.viewport_start_x + (x - s.pan.start_x),
				s.pan.viewport_start_y + (y - s.pan.start_y),
			);
			viewport.update(|v| {
				v.x = nx;
				v.y = ny;
			});
		} else {
			let hit = s.hit(x, y, &v, editable);
			let (hover, cursor) = match hit {
				Hit::Output(id) | Hit::Input(id) => (Some(id), "crosshair"),
				Hit::Node(id) => (Some(id), if editable { "move" } else { "pointer" }),
				Hit::Edge(_) => (None, "pointer"),
				Hit::Background => (None, "grab"),
			};
			s.hover = hover;
			set_cursor(canvas_ref, cursor);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let point = local_point(canvas_ref, &ev);
		let v = viewport.get_untracked();
		let (moved, link) = {
			let mut s = state_mu.borrow_mut();
			let drag = std::mem::take(&mut s.drag);
			let link = std::mem::take(&mut s.link);
			s.pan.active = false;

			let moved = match (&drag.node_id, drag.moved()) {
				(Some(id), true) => {
					s.place(id, drag.current);
					Some((id.clone(), drag.current))
				}
				_ => None,
			};
			let target = match (link.source.is_some(), point) {
				(true, Some((x, y))) => match s.hit(x, y, &v, true) {
					Hit::Input(id) | Hit::Node(id) | Hit::Output(id) => Some(id),
					Hit::Edge(_) | Hit::Background => None,
				},
				_ => None,
			};
			(moved, link.source.zip(target))
		};

		if let Some((id, position)) = moved {
			on_intent.run(BoardIntent::MoveNode { id, position });
		}
		if let Some((source, target)) = link {
			on_intent.run(BoardIntent::Connect(Connection::new(source, target)));
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut s = state_ml.borrow_mut();
		s.drag = DragState::default();
		s.link = LinkState::default();
		s.pan.active = false;
		s.hover = None;
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		viewport.update(|v| v.zoom_at(x, y, factor));
	};

	let on_keydown = move |ev: KeyboardEvent| {
		if read_only.get_untracked() || !matches!(ev.key().as_str(), "Delete" | "Backspace") {
			return;
		}
		let Some(selected) = selection.get_untracked() else {
			return;
		};
		ev.prevent_default();
		selection.set(None);
		on_intent.run(match selected {
			Selection::Node(id) => BoardIntent::RemoveNode(id),
			Selection::Edge(id) => BoardIntent::RemoveEdge(id),
		});
	};

	let on_dragover = move |ev: DragEvent| {
		if read_only.get_untracked() {
			return;
		}
		ev.prevent_default();
		if let Some(transfer) = ev.data_transfer() {
			transfer.set_drop_effect("copy");
		}
	};

	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		if read_only.get_untracked() {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let raw = ev.data_transfer().and_then(|t| t.get_data(TRANSFER_TYPE).ok());
		match resolve_drop(raw.as_deref(), x, y, &viewport.get_untracked()) {
			Some(node) => on_intent.run(BoardIntent::Instantiate(node)),
			None => debug!("Drop without a board payload ignored"),
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="board-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:keydown=on_keydown
			on:dragover=on_dragover
			on:drop=on_drop
			style="display: block; cursor: grab; outline: none;"
		/>
	}
}
