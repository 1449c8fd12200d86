//! REST implementation of [`BoardBackend`].

use async_trait::async_trait;
use log::debug;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::model::{Board, BoardData, BoardId, CaseId, CaseRecord, EvidenceRecord, SuspectRecord, UserSummary};
use super::sync::BoardBackend;
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult};

/// List endpoints answer with a bare array, a paginated page or, for some
/// viewsets, a single object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
	Plain(Vec<T>),
	Paged { results: Vec<T> },
	Single(T),
}

impl<T> Listing<T> {
	fn into_vec(self) -> Vec<T> {
		match self {
			Listing::Plain(items) | Listing::Paged { results: items } => items,
			Listing::Single(item) => vec![item],
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Recorder {
	User(UserSummary),
	Name(String),
}

#[derive(Deserialize)]
struct EvidenceWire {
	id: u64,
	title: String,
	evidence_type: String,
	#[serde(default)]
	description: String,
	#[serde(default)]
	recorded_by: Option<Recorder>,
	#[serde(default)]
	created_date: String,
}

impl From<EvidenceWire> for EvidenceRecord {
	fn from(wire: EvidenceWire) -> Self {
		let recorded_by = match wire.recorded_by {
			Some(Recorder::User(user)) => user.display_name().to_string(),
			Some(Recorder::Name(name)) if !name.is_empty() => name,
			_ => "Unknown".to_string(),
		};
		Self {
			id: wire.id,
			title: wire.title,
			evidence_type: wire.evidence_type,
			description: wire.description,
			recorded_by,
			created_date: wire.created_date,
		}
	}
}

/// The board serializer reads the case as `case_id` on write.
#[derive(Serialize)]
struct CreateBoard<'a> {
	case_id: CaseId,
	board_data: &'a BoardData,
}

#[derive(Serialize)]
struct PatchBoard<'a> {
	board_data: &'a BoardData,
}

/// Pull a readable message out of an error body (`{"detail": ...}` or text).
fn error_detail(body: &str) -> String {
	#[derive(Deserialize)]
	struct Detail {
		detail: String,
	}
	serde_json::from_str::<Detail>(body)
		.map(|d| d.detail)
		.unwrap_or_else(|_| body.trim().chars().take(200).collect())
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
	base_url: String,
	token: Option<String>,
	client: reqwest::Client,
}

impl HttpBackend {
	pub fn new(base_url: &str, token: Option<String>) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			token,
			client: reqwest::Client::new(),
		}
	}

	/// Backend for the configured origin, authenticated with the stored token.
	pub fn from_config(config: &BoardConfig) -> Self {
		Self::new(&config.api_base_url, stored_token(&config.token_storage_key))
	}

	fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let builder = self.client.request(method, format!("{}{}", self.base_url, path));
		match &self.token {
			Some(token) => builder.header("Authorization", format!("Token {token}")),
			None => builder,
		}
	}

	async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> BoardResult<T> {
		let response = builder.send().await?;
		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(BoardError::Status {
				status: status.as_u16(),
				detail: error_detail(&body),
			});
		}
		Ok(response.json::<T>().await?)
	}
}

#[async_trait(?Send)]
impl BoardBackend for HttpBackend {
	async fn find_board(&self, case_id: CaseId) -> BoardResult<Option<Board>> {
		let path = format!("/api/detective-board/?case={case_id}");
		let listing: Listing<Board> = self.send(self.request(Method::GET, &path)).await?;
		let board = listing.into_vec().into_iter().find(|b| b.case == case_id);
		debug!("Board lookup for case {case_id}: {:?}", board.as_ref().map(|b| b.id));
		Ok(board)
	}

	async fn create_board(&self, case_id: CaseId, data: &BoardData) -> BoardResult<Board> {
		let body = CreateBoard {
			case_id,
			board_data: data,
		};
		self.send(self.request(Method::POST, "/api/detective-board/").json(&body))
			.await
	}

	async fn update_board_data(&self, board_id: BoardId, data: &BoardData) -> BoardResult<Board> {
		let path = format!("/api/detective-board/{board_id}/");
		self.send(self.request(Method::PATCH, &path).json(&PatchBoard { board_data: data }))
			.await
	}

	async fn case_evidence(&self, case_id: CaseId) -> BoardResult<Vec<EvidenceRecord>> {
		let path = format!("/api/evidence/?case={case_id}");
		let listing: Listing<EvidenceWire> = self.send(self.request(Method::GET, &path)).await?;
		Ok(listing.into_vec().into_iter().map(EvidenceRecord::from).collect())
	}

	async fn case_suspects(&self, case_id: CaseId) -> BoardResult<Vec<SuspectRecord>> {
		let path = format!("/api/suspects/?case={case_id}");
		let listing: Listing<SuspectRecord> = self.send(self.request(Method::GET, &path)).await?;
		Ok(listing.into_vec())
	}

	async fn case_summary(&self, case_id: CaseId) -> BoardResult<CaseRecord> {
		let path = format!("/api/cases/{case_id}/");
		self.send(self.request(Method::GET, &path)).await
	}
}

/// API token the login flow left in local storage.
pub fn stored_token(key: &str) -> Option<String> {
	let storage = web_sys::window()?.local_storage().ok()??;
	storage.get_item(key).ok()?.filter(|t| !t.is_empty())
}
