use leptos::prelude::*;
use log::warn;
use web_sys::DragEvent;

use crate::board::catalog::{CatalogEntry, CatalogFilter, CatalogGroup, GroupView, build_view};
use crate::board::drag::TRANSFER_TYPE;
use crate::board::model::{EvidenceRecord, Node, SuspectRecord};

fn catalog_entry(entry: CatalogEntry, read_only: Signal<bool>) -> impl IntoView {
	let item = entry.item;
	let payload = item.payload();
	let on_dragstart = move |ev: DragEvent| {
		if read_only.get_untracked() {
			ev.prevent_default();
			return;
		}
		let Some(transfer) = ev.data_transfer() else {
			return;
		};
		match payload.to_transfer() {
			Ok(raw) => {
				let _ = transfer.set_data(TRANSFER_TYPE, &raw);
				transfer.set_effect_allowed("copy");
			}
			Err(err) => warn!("Could not start drag: {err}"),
		}
	};

	let class = if entry.on_board {
		"catalog-item on-board"
	} else {
		"catalog-item"
	};
	let accent = format!("border-left-color: {}", item.accent());
	let description = item.description().map(str::to_string);

	view! {
		<div
			class=class
			class:disabled=move || read_only.get()
			draggable=move || if read_only.get() { "false" } else { "true" }
			style=accent
			on:dragstart=on_dragstart
		>
			<div class="catalog-title">{item.title().to_string()}</div>
			<div class="catalog-detail">{item.detail()}</div>
			{description.map(|d| view! { <div class="catalog-description">{d}</div> })}
			{entry.on_board.then(|| view! { <span class="catalog-badge">"On board"</span> })}
		</div>
	}
}

fn catalog_group(group: GroupView, filter: RwSignal<CatalogFilter>, read_only: Signal<bool>) -> impl IntoView {
	let which = group.group;
	let toggle = move |_| {
		filter.update(|f| match which {
			CatalogGroup::Evidence => f.evidence_collapsed = !f.evidence_collapsed,
			CatalogGroup::Suspects => f.suspects_collapsed = !f.suspects_collapsed,
		})
	};

	let body = (!group.collapsed).then(|| {
		let skeletons = (0..group.skeleton_rows)
			.map(|_| view! { <div class="catalog-skeleton" /> })
			.collect_view();
		let empty = group
			.empty_message
			.map(|m| view! { <p class="catalog-empty">{m}</p> });
		let entries = group
			.entries
			.into_iter()
			.map(|e| catalog_entry(e, read_only))
			.collect_view();
		view! { <div class="catalog-items">{skeletons} {empty} {entries}</div> }
	});

	view! {
		<section class="catalog-group">
			<button class="catalog-heading" on:click=toggle>
				<span class="catalog-chevron">{if group.collapsed { "▸" } else { "▾" }}</span>
				<span>{group.heading}</span>
			</button>
			{body}
		</section>
	}
}

/// Searchable palette of the case's evidence and suspects.
#[component]
pub fn Sidebar(
	#[prop(into)] evidence: Signal<Vec<EvidenceRecord>>,
	#[prop(into)] suspects: Signal<Vec<SuspectRecord>>,
	#[prop(into)] nodes: Signal<Vec<Node>>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] read_only: Signal<bool>,
) -> impl IntoView {
	let filter = RwSignal::new(CatalogFilter::default());
	let catalog = Memo::new(move |_| {
		let loading = loading.get();
		filter.with(|f| {
			evidence.with(|e| suspects.with(|s| nodes.with(|n| build_view(e, s, n, f, loading))))
		})
	});

	view! {
		<aside class="board-sidebar">
			<input
				class="sidebar-search"
				type="search"
				placeholder="Search evidence or suspects"
				prop:value=move || filter.with(|f| f.search.clone())
				on:input=move |ev| filter.update(|f| f.search = event_target_value(&ev))
			/>
			{move || {
				read_only
					.get()
					.then(|| view! { <p class="sidebar-hint">"Read-only: items cannot be placed"</p> })
			}}
			{move || {
				let view = catalog.get();
				(
					catalog_group(view.evidence, filter, read_only),
					catalog_group(view.suspects, filter, read_only),
				)
			}}
		</aside>
	}
}
