use chrono::Local;
use leptos::prelude::*;

use crate::board::store::SyncStatus;

/// Short status text shown beside the save button.
pub fn status_label(status: &SyncStatus) -> String {
	match status {
		SyncStatus::Idle => String::new(),
		SyncStatus::Loading => "Loading board…".into(),
		SyncStatus::Saving => "Saving…".into(),
		SyncStatus::SaveFailed(_) => "Save failed".into(),
		SyncStatus::Unsaved => "Unsaved changes".into(),
		SyncStatus::Saved(at) => format!("Saved at {}", at.with_timezone(&Local).format("%H:%M")),
	}
}

#[component]
pub fn Toolbar(
	#[prop(into)] title: Signal<String>,
	#[prop(into)] status: Signal<SyncStatus>,
	#[prop(into)] can_save: Signal<bool>,
	#[prop(into)] read_only: Signal<bool>,
	#[prop(into)] zoom: Signal<f64>,
	on_save: Callback<()>,
	on_export: Callback<()>,
	on_pin_case: Callback<()>,
	on_zoom: Callback<f64>,
	on_fit: Callback<()>,
) -> impl IntoView {
	let status_class = move || match status.get() {
		SyncStatus::SaveFailed(_) => "toolbar-status error",
		SyncStatus::Unsaved => "toolbar-status dirty",
		_ => "toolbar-status",
	};

	view! {
		<header class="board-toolbar">
			<h1 class="toolbar-title">{title}</h1>
			{move || read_only.get().then(|| view! { <span class="read-only-badge">"Read-only"</span> })}
			<span class=status_class>{move || status.with(status_label)}</span>
			<div class="toolbar-actions">
				<button on:click=move |_| on_zoom.run(1.0 / 1.2) title="Zoom out">
					"−"
				</button>
				<span class="toolbar-zoom">{move || format!("{:.0}%", zoom.get() * 100.0)}</span>
				<button on:click=move |_| on_zoom.run(1.2) title="Zoom in">
					"+"
				</button>
				<button on:click=move |_| on_fit.run(()) title="Fit board to view">
					"Fit"
				</button>
				<button on:click=move |_| on_pin_case.run(()) disabled=move || read_only.get()>
					"Pin case"
				</button>
				<button on:click=move |_| on_export.run(())>"Export PNG"</button>
				<button class="primary" on:click=move |_| on_save.run(()) disabled=move || !can_save.get()>
					{move || if matches!(status.get(), SyncStatus::Saving) { "Saving…" } else { "Save" }}
				</button>
			</div>
		</header>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn labels_follow_sync_state() {
		assert_eq!(status_label(&SyncStatus::Idle), "");
		assert_eq!(status_label(&SyncStatus::Unsaved), "Unsaved changes");
		assert_eq!(status_label(&SyncStatus::SaveFailed("offline".into())), "Save failed");
		assert!(status_label(&SyncStatus::Saved(chrono::Utc::now())).starts_with("Saved at "));
	}
}
