//! Sidebar palette: evidence and suspects the investigator can drag in.

use std::collections::HashSet;

use super::drag::DragPayload;
use super::model::{EvidenceRecord, Node, NodeVariant, SuspectRecord};
use super::style::{evidence_accent, suspect_accent};

/// Skeleton rows shown per group while the listings load.
pub const SKELETON_ROWS: usize = 3;

/// A read-only palette entry.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogItem {
	Evidence(EvidenceRecord),
	Suspect(SuspectRecord),
}

impl CatalogItem {
	/// Id the item gets once it is dropped on the board.
	pub fn node_id(&self) -> String {
		match self {
			CatalogItem::Evidence(e) => NodeVariant::Evidence.node_id(e.id),
			CatalogItem::Suspect(s) => NodeVariant::Suspect.node_id(s.id),
		}
	}

	pub fn title(&self) -> &str {
		match self {
			CatalogItem::Evidence(e) => &e.title,
			CatalogItem::Suspect(s) => &s.name,
		}
	}

	/// Type/status line under the title.
	pub fn detail(&self) -> String {
		match self {
			CatalogItem::Evidence(e) => format!("{} · {}", evidence_accent(&e.evidence_type).1, e.recorded_by),
			CatalogItem::Suspect(s) => match s.days_under_investigation {
				Some(days) if days > 0 => format!("{} · {days}d", s.status),
				_ => s.status.clone(),
			},
		}
	}

	pub fn description(&self) -> Option<&str> {
		match self {
			CatalogItem::Evidence(e) if !e.description.is_empty() => Some(&e.description),
			_ => None,
		}
	}

	pub fn accent(&self) -> &'static str {
		match self {
			CatalogItem::Evidence(e) => evidence_accent(&e.evidence_type).0,
			CatalogItem::Suspect(s) => suspect_accent(&s.status).0,
		}
	}

	/// What the drag transfer carries for this item.
	pub fn payload(&self) -> DragPayload {
		match self {
			CatalogItem::Evidence(e) => DragPayload::Evidence(e.clone()),
			CatalogItem::Suspect(s) => DragPayload::Suspect(s.clone()),
		}
	}
}

/// Search text and collapse flags, owned by the sidebar component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogFilter {
	pub search: String,
	pub evidence_collapsed: bool,
	pub suspects_collapsed: bool,
}

impl CatalogFilter {
	fn needle(&self) -> String {
		self.search.trim().to_lowercase()
	}

	pub fn matches_evidence(&self, item: &EvidenceRecord) -> bool {
		let needle = self.needle();
		needle.is_empty()
			|| item.title.to_lowercase().contains(&needle)
			|| item.evidence_type.to_lowercase().contains(&needle)
	}

	pub fn matches_suspect(&self, item: &SuspectRecord) -> bool {
		let needle = self.needle();
		needle.is_empty() || item.name.to_lowercase().contains(&needle)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogGroup {
	Evidence,
	Suspects,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
	pub item: CatalogItem,
	pub on_board: bool,
}

/// View model of one collapsible group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupView {
	pub group: CatalogGroup,
	pub heading: String,
	pub count: usize,
	pub collapsed: bool,
	pub skeleton_rows: usize,
	pub entries: Vec<CatalogEntry>,
	pub empty_message: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogView {
	pub evidence: GroupView,
	pub suspects: GroupView,
}

fn group(
	group: CatalogGroup,
	name: &str,
	empty: &'static str,
	collapsed: bool,
	loading: bool,
	entries: Vec<CatalogEntry>,
) -> GroupView {
	GroupView {
		group,
		heading: format!("{} ({})", name, entries.len()),
		count: entries.len(),
		collapsed,
		skeleton_rows: if loading { SKELETON_ROWS } else { 0 },
		empty_message: (!loading && entries.is_empty()).then_some(empty),
		entries: if loading { Vec::new() } else { entries },
	}
}

/// Filter and group the listings for the sidebar.
pub fn build_view(
	evidence: &[EvidenceRecord],
	suspects: &[SuspectRecord],
	nodes: &[Node],
	filter: &CatalogFilter,
	loading: bool,
) -> CatalogView {
	let placed: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let entry = |item: CatalogItem| CatalogEntry {
		on_board: placed.contains(item.node_id().as_str()),
		item,
	};

	let evidence_entries = evidence
		.iter()
		.filter(|e| filter.matches_evidence(e))
		.map(|e| entry(CatalogItem::Evidence(e.clone())))
		.collect();
	let suspect_entries = suspects
		.iter()
		.filter(|s| filter.matches_suspect(s))
		.map(|s| entry(CatalogItem::Suspect(s.clone())))
		.collect();

	CatalogView {
		evidence: group(
			CatalogGroup::Evidence,
			"EVIDENCE",
			"No evidence found",
			filter.evidence_collapsed,
			loading,
			evidence_entries,
		),
		suspects: group(
			CatalogGroup::Suspects,
			"SUSPECTS",
			"No suspects found",
			filter.suspects_collapsed,
			loading,
			suspect_entries,
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::model::Position;

	fn evidence() -> Vec<EvidenceRecord> {
		vec![
			EvidenceRecord {
				id: 12,
				title: "Knife".into(),
				evidence_type: "biological".into(),
				description: String::new(),
				recorded_by: "Cole Phelps".into(),
				created_date: String::new(),
			},
			EvidenceRecord {
				id: 13,
				title: "Pawn ticket".into(),
				evidence_type: "other".into(),
				description: "Hock shop on Main".into(),
				recorded_by: "Cole Phelps".into(),
				created_date: String::new(),
			},
		]
	}

	fn suspects() -> Vec<SuspectRecord> {
		vec![SuspectRecord {
			id: 3,
			name: "Ray Pinker".into(),
			national_id: "0012".into(),
			status: "Under Investigation".into(),
			days_under_investigation: Some(4),
		}]
	}

	#[test]
	fn search_is_case_insensitive_on_title_and_type() {
		let filter = CatalogFilter {
			search: "  KNI ".into(),
			..Default::default()
		};
		let view = build_view(&evidence(), &suspects(), &[], &filter, false);
		assert_eq!(view.evidence.count, 1);
		assert_eq!(view.evidence.heading, "EVIDENCE (1)");
		assert_eq!(view.suspects.count, 0);
		assert_eq!(view.suspects.empty_message, Some("No suspects found"));

		let by_type = CatalogFilter {
			search: "Other".into(),
			..Default::default()
		};
		let view = build_view(&evidence(), &suspects(), &[], &by_type, false);
		assert_eq!(view.evidence.entries[0].item.title(), "Pawn ticket");
	}

	#[test]
	fn suspects_match_on_name_only() {
		let filter = CatalogFilter {
			search: "investigation".into(),
			..Default::default()
		};
		let view = build_view(&evidence(), &suspects(), &[], &filter, false);
		assert_eq!(view.suspects.count, 0);
		let filter = CatalogFilter {
			search: "pink".into(),
			..Default::default()
		};
		let view = build_view(&evidence(), &suspects(), &[], &filter, false);
		assert_eq!(view.suspects.entries[0].item.detail(), "Under Investigation · 4d");
	}

	#[test]
	fn loading_shows_skeletons_not_empty_state() {
		let view = build_view(&[], &[], &[], &CatalogFilter::default(), true);
		assert_eq!(view.evidence.skeleton_rows, SKELETON_ROWS);
		assert!(view.evidence.empty_message.is_none());
		let view = build_view(&[], &[], &[], &CatalogFilter::default(), false);
		assert_eq!(view.evidence.empty_message, Some("No evidence found"));
	}

	#[test]
	fn placed_items_are_flagged() {
		let records = evidence();
		let nodes = vec![Node::evidence(&records[0], Position::default())];
		let view = build_view(&records, &[], &nodes, &CatalogFilter::default(), false);
		assert!(view.evidence.entries[0].on_board);
		assert!(!view.evidence.entries[1].on_board);
	}

	#[test]
	fn collapsed_groups_keep_their_counts() {
		let filter = CatalogFilter {
			suspects_collapsed: true,
			..Default::default()
		};
		let view = build_view(&evidence(), &suspects(), &[], &filter, false);
		assert!(!view.evidence.collapsed);
		assert!(view.suspects.collapsed);
		assert_eq!(view.suspects.heading, "SUSPECTS (1)");
	}
}
