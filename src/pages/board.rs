//! The board page: one case's graph, its palette and persistence wiring.

use leptos::html::Canvas;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use log::{info, warn};

use crate::board::export;
use crate::board::http::HttpBackend;
use crate::board::model::{CaseId, Edge, Node, Viewport};
use crate::board::permission::{Access, Actor};
use crate::board::store::{BoardIntent, BoardStore, Outcome, Rejection};
use crate::board::sync::{Autosave, BoardBackend, StoreCell, Synchronizer};
use crate::components::board_canvas::{BoardCanvas, Selection, fit_viewport};
use crate::components::edge_inspector::EdgeInspector;
use crate::components::notice::{Notice, NoticeBar, NoticeLevel, show_notice};
use crate::components::sidebar::Sidebar;
use crate::components::toolbar::Toolbar;
use crate::config::BoardConfig;
use crate::pages::not_found::NotFound;

const FIT_MARGIN: f64 = 40.0;

impl StoreCell for RwSignal<BoardStore> {
	fn apply<R>(&self, f: impl FnOnce(&mut BoardStore) -> R) -> Option<R> {
		self.try_update(f)
	}
}

fn canvas_size(canvas_ref: NodeRef<Canvas>) -> (f64, f64) {
	canvas_ref
		.get_untracked()
		.map(|c| (c.width() as f64, c.height() as f64))
		.unwrap_or((800.0, 600.0))
}

/// Run one intent through the store and report rejections worth a notice.
fn apply_intent(store: RwSignal<BoardStore>, access: Access, notice: RwSignal<Option<Notice>>, intent: BoardIntent) {
	let Some(outcome) = store.try_update(|s| s.dispatch(intent, access)) else {
		return;
	};
	match outcome {
		Outcome::Rejected(Rejection::Duplicate(id)) => {
			let title = store
				.try_with_untracked(|s| s.node(&id).map(|n| n.kind.title().to_string()))
				.flatten()
				.unwrap_or(id);
			show_notice(notice, NoticeLevel::Info, format!("\"{title}\" is already on the board"));
		}
		Outcome::Rejected(Rejection::ReadOnly) => {
			show_notice(notice, NoticeLevel::Info, "This board is read-only for your role");
		}
		_ => {}
	}
}

#[component]
pub fn BoardPage() -> impl IntoView {
	let config = use_context::<BoardConfig>().unwrap_or_default();
	let actor = use_context::<RwSignal<Option<Actor>>>().unwrap_or_else(|| RwSignal::new(None));
	let params = use_params_map();
	let case_id = Memo::new(move |_| {
		params.with(|p| p.get("case_id").and_then(|raw| raw.parse::<u64>().ok()).map(CaseId))
	});

	let editor_roles = config.editor_roles.clone();
	let access = Memo::new(move |_| actor.with(|a| Access::for_actor(a.as_ref(), &editor_roles)));
	let read_only = Signal::derive(move || !access.get().can_edit());

	let store = RwSignal::new(BoardStore::new());
	let sync = StoredValue::new_local(Synchronizer::new(HttpBackend::from_config(&config)));
	let viewport = RwSignal::new(Viewport::default());
	let selection = RwSignal::new(None::<Selection>);
	let notice = RwSignal::new(None::<Notice>);
	let canvas_ref = NodeRef::<Canvas>::new();

	let nodes = Memo::new(move |_| store.with(|s| s.nodes().to_vec()));
	let edges = Memo::new(move |_| store.with(|s| s.edges().to_vec()));
	let evidence = Memo::new(move |_| store.with(|s| s.evidence_items().to_vec()));
	let suspects = Memo::new(move |_| store.with(|s| s.suspects().to_vec()));
	let loading = Memo::new(move |_| store.with(|s| s.loading()));
	let status = Memo::new(move |_| store.with(|s| s.status()));
	let can_save = Memo::new(move |_| {
		let access = access.get();
		store.with(|s| s.can_save(access))
	});
	let load_error = Memo::new(move |_| store.with(|s| s.error().map(str::to_string)));
	let save_error = Memo::new(move |_| store.with(|s| s.save_error().map(str::to_string)));
	let selected_edge = Signal::derive(move || match selection.get() {
		Some(Selection::Edge(id)) => store.with(|s| s.edge(&id).cloned()),
		_ => None,
	});

	// Load whenever the routed case changes.
	Effect::new(move |_| {
		let Some(id) = case_id.get() else {
			return;
		};
		selection.set(None);
		viewport.set(Viewport::default());
		let Some(sync) = sync.try_get_value() else {
			return;
		};
		spawn_local(async move {
			sync.load_into(&store, id).await;
			if let Some(saved) = store.try_with_untracked(|s| s.saved_viewport()).flatten() {
				viewport.try_set(saved);
			}
		});
	});

	Effect::new(move |_| {
		if let Some(err) = save_error.get() {
			show_notice(notice, NoticeLevel::Error, format!("Save failed: {err}"));
		}
	});

	let autosave = Autosave::new(config.autosave_interval());
	let tick = move || {
		let (Some(access), Some(v), Some(sync)) = (
			access.try_get_untracked(),
			viewport.try_get_untracked(),
			sync.try_get_value(),
		) else {
			return;
		};
		spawn_local(async move {
			autosave.tick(&sync, &store, access, Some(v)).await;
		});
	};
	match set_interval_with_handle(tick, autosave.interval()) {
		Ok(handle) => on_cleanup(move || handle.clear()),
		Err(err) => warn!("Autosave disabled, could not start timer: {err:?}"),
	}
	on_cleanup(move || {
		info!("Leaving board page");
		store.try_update(BoardStore::clear);
	});

	let on_intent = Callback::new(move |intent: BoardIntent| {
		apply_intent(store, access.get_untracked(), notice, intent);
	});

	let on_save = Callback::new(move |()| {
		let Some(sync) = sync.try_get_value() else {
			return;
		};
		let (access, v) = (access.get_untracked(), viewport.get_untracked());
		spawn_local(async move {
			sync.save_from(&store, access, Some(v)).await;
		});
	});

	let export_prefix = config.export_file_prefix.clone();
	let on_export = Callback::new(move |()| {
		let (Some(id), Some(canvas)) = (case_id.get_untracked(), canvas_ref.get_untracked()) else {
			return;
		};
		if let Err(err) = export::export_png(&canvas, &export::file_name(&export_prefix, id)) {
			warn!("Export failed: {err}");
			show_notice(notice, NoticeLevel::Error, err.user_message());
		}
	});

	let on_pin_case = Callback::new(move |()| {
		let (Some(id), Some(sync)) = (case_id.get_untracked(), sync.try_get_value()) else {
			return;
		};
		let (w, h) = canvas_size(canvas_ref);
		let centre = viewport.get_untracked().to_document(w / 2.0, h / 2.0);
		let access = access.get_untracked();
		spawn_local(async move {
			match sync.backend().case_summary(id).await {
				Ok(record) => apply_intent(store, access, notice, BoardIntent::Instantiate(Node::case(&record, centre))),
				Err(err) => show_notice(
					notice,
					NoticeLevel::Error,
					format!("Could not load the case summary: {}", err.user_message()),
				),
			}
		});
	});

	let on_zoom = Callback::new(move |factor: f64| {
		let (w, h) = canvas_size(canvas_ref);
		viewport.update(|v| v.zoom_at(w / 2.0, h / 2.0, factor));
	});

	let on_fit = Callback::new(move |()| {
		let (w, h) = canvas_size(canvas_ref);
		viewport.set(nodes.with_untracked(|n| fit_viewport(n, w, h, FIT_MARGIN)));
	});

	let on_close_inspector = Callback::new(move |()| selection.set(None));

	let title = Signal::derive(move || match case_id.get() {
		Some(id) => format!("Investigation Board · Case #{id}"),
		None => "Investigation Board".into(),
	});
	let zoom = Signal::derive(move || viewport.with(|v| v.zoom));
	let node_list: Signal<Vec<Node>> = nodes.into();
	let edge_list: Signal<Vec<Edge>> = edges.into();

	view! {
		<Show when=move || case_id.get().is_some() fallback=|| view! { <NotFound /> }>
			<div class="board-page">
				<Toolbar
					title=title
					status=status
					can_save=can_save
					read_only=read_only
					zoom=zoom
					on_save=on_save
					on_export=on_export
					on_pin_case=on_pin_case
					on_zoom=on_zoom
					on_fit=on_fit
				/>
				{move || {
					load_error
						.get()
						.map(|err| {
							view! {
								<div class="board-error" role="alert">
									<span>{err}</span>
									<button on:click=move |_| store.update(|s| s.dismiss_errors())>"Dismiss"</button>
								</div>
							}
						})
				}}
				<div class="board-body">
					<Sidebar
						evidence=evidence
						suspects=suspects
						nodes=node_list
						loading=loading
						read_only=read_only
					/>
					<div class="board-surface">
						<BoardCanvas
							nodes=node_list
							edges=edge_list
							read_only=read_only
							viewport=viewport
							selection=selection
							canvas_ref=canvas_ref
							on_intent=on_intent
						/>
						<EdgeInspector
							edge=selected_edge
							read_only=read_only
							on_intent=on_intent
							on_close=on_close_inspector
						/>
					</div>
				</div>
				<NoticeBar notice=notice />
			</div>
		</Show>
	}
}
