//! Per-variant card styling, looked up exhaustively over [`NodeKind`].

use super::model::{Node, NodeKind};

const FALLBACK: &str = "#90a4ae";

const EVIDENCE_TYPES: &[(&str, &str, &str)] = &[
	("witness_statement", "#66bb6a", "Witness"),
	("biological", "#ef5350", "Biological"),
	("vehicle", "#ff7043", "Vehicle"),
	("identification", "#ffa726", "ID Document"),
	("other", "#42a5f5", "Other"),
];

const SUSPECT_STATUSES: &[(&str, &str, &str)] = &[
	("Under Investigation", "#ffa726", "Investigating"),
	("Under Severe Surveillance", "#ef5350", "Severe"),
	("Arrested", "#ab47bc", "Arrested"),
	("Cleared", "#66bb6a", "Cleared"),
];

const SEVERITIES: &[(&str, &str)] = &[
	("Level 3", "#66bb6a"),
	("Level 2", "#ffa726"),
	("Level 1", "#ef5350"),
	("Critical", "#ce93d8"),
];

/// Accent colour and short label for an evidence type tag.
pub fn evidence_accent(evidence_type: &str) -> (&'static str, String) {
	EVIDENCE_TYPES
		.iter()
		.find(|(tag, ..)| *tag == evidence_type)
		.map(|(_, color, label)| (*color, (*label).to_string()))
		.unwrap_or((FALLBACK, evidence_type.to_string()))
}

/// Accent colour and short label for a suspect status tag.
pub fn suspect_accent(status: &str) -> (&'static str, String) {
	SUSPECT_STATUSES
		.iter()
		.find(|(tag, ..)| *tag == status)
		.map(|(_, color, label)| (*color, (*label).to_string()))
		.unwrap_or((FALLBACK, status.to_string()))
}

pub fn severity_accent(severity: &str) -> &'static str {
	SEVERITIES
		.iter()
		.find(|(tag, _)| *tag == severity)
		.map(|(_, color)| *color)
		.unwrap_or(FALLBACK)
}

/// Everything the canvas needs to draw one node card.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
	pub accent: &'static str,
	pub background: &'static str,
	pub badge: String,
	pub title: String,
	pub subtitle: String,
	pub footer: Option<String>,
}

pub fn card_for(node: &Node) -> Card {
	match &node.kind {
		NodeKind::Evidence(d) => {
			let (accent, badge) = evidence_accent(&d.evidence_type);
			Card {
				accent,
				background: "#0d1f35",
				badge,
				title: d.title.clone(),
				subtitle: d.recorded_by.clone(),
				footer: (!d.created_date.is_empty()).then(|| d.created_date.clone()),
			}
		}
		NodeKind::Suspect(d) => {
			let (accent, badge) = suspect_accent(&d.status);
			Card {
				accent,
				background: "#2a0d14",
				badge,
				title: d.name.clone(),
				subtitle: format!("ID {}", d.national_id),
				footer: d
					.days_under_investigation
					.map(|days| format!("{days} days under investigation")),
			}
		}
		NodeKind::Case(d) => Card {
			accent: severity_accent(&d.severity),
			background: "#15153a",
			badge: d.severity.clone(),
			title: d.title.clone(),
			subtitle: d.status.clone(),
			footer: Some(format!("Case #{}", d.case_id)),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::model::{Position, SuspectRecord};

	#[test]
	fn unknown_tags_fall_back_to_neutral() {
		assert_eq!(evidence_accent("biological").1, "Biological");
		assert_eq!(evidence_accent("fingerprint"), (FALLBACK, "fingerprint".to_string()));
		assert_eq!(severity_accent("Level 9"), FALLBACK);
	}

	#[test]
	fn suspect_card_mentions_days() {
		let node = Node::suspect(
			&SuspectRecord {
				id: 5,
				name: "Ray Pinker".into(),
				national_id: "0012".into(),
				status: "Under Severe Surveillance".into(),
				days_under_investigation: Some(31),
			},
			Position::default(),
		);
		let card = card_for(&node);
		assert_eq!(card.accent, "#ef5350");
		assert_eq!(card.badge, "Severe");
		assert_eq!(card.footer.as_deref(), Some("31 days under investigation"));
	}
}
