//! Transient, dismissible notifications.

use std::time::Duration;

use leptos::prelude::*;

/// Info notices hide themselves after this long; errors wait for a click.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
	Info,
	Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
	pub id: u64,
	pub level: NoticeLevel,
	pub message: String,
}

/// Replace the current notice. Safe to call after the page is gone.
pub fn show_notice(slot: RwSignal<Option<Notice>>, level: NoticeLevel, message: impl Into<String>) {
	let message = message.into();
	let Some(id) = slot.try_update(|current| {
		let id = current.as_ref().map_or(1, |n| n.id + 1);
		*current = Some(Notice { id, level, message });
		id
	}) else {
		return;
	};
	if level == NoticeLevel::Info {
		set_timeout(
			move || {
				slot.try_update(|current| {
					if current.as_ref().is_some_and(|n| n.id == id) {
						*current = None;
					}
				});
			},
			NOTICE_TTL,
		);
	}
}

#[component]
pub fn NoticeBar(notice: RwSignal<Option<Notice>>) -> impl IntoView {
	move || {
		notice.get().map(|n| {
			let class = match n.level {
				NoticeLevel::Info => "notice notice-info",
				NoticeLevel::Error => "notice notice-error",
			};
			view! {
				<div class=class role="status">
					<span>{n.message}</span>
					<button class="notice-dismiss" on:click=move |_| notice.set(None)>
						"×"
					</button>
				</div>
			}
		})
	}
}
