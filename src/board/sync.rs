//! Persistence synchronizer: load-or-create lookup, whole-document save and
//! the autosave policy.
//!
//! Saves replace the stored `board_data` wholesale. Two sessions editing the
//! same case overwrite each other; the last save wins.

use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join3;
use log::{info, warn};

use super::model::{Board, BoardData, BoardId, CaseId, CaseRecord, EvidenceRecord, SuspectRecord, Viewport};
use super::permission::Access;
use super::store::{BoardStore, LoadOutcome, SaveRequest};
use crate::error::{BoardError, BoardResult};

/// The REST collaborator, reduced to the calls the board makes.
#[async_trait(?Send)]
pub trait BoardBackend {
	/// The board scoped to `case_id`, or `None` if there is none yet.
	async fn find_board(&self, case_id: CaseId) -> BoardResult<Option<Board>>;
	async fn create_board(&self, case_id: CaseId, data: &BoardData) -> BoardResult<Board>;
	async fn update_board_data(&self, board_id: BoardId, data: &BoardData) -> BoardResult<Board>;
	async fn case_evidence(&self, case_id: CaseId) -> BoardResult<Vec<EvidenceRecord>>;
	async fn case_suspects(&self, case_id: CaseId) -> BoardResult<Vec<SuspectRecord>>;
	async fn case_summary(&self, case_id: CaseId) -> BoardResult<CaseRecord>;
}

/// Somewhere the session's [`BoardStore`] lives.
///
/// `apply` returns `None` once the store is gone (the page was left).
pub trait StoreCell {
	fn apply<R>(&self, f: impl FnOnce(&mut BoardStore) -> R) -> Option<R>;
}

impl StoreCell for RefCell<BoardStore> {
	fn apply<R>(&self, f: impl FnOnce(&mut BoardStore) -> R) -> Option<R> {
		Some(f(&mut self.borrow_mut()))
	}
}

/// Result of looking for a case's board.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
	Found(Board),
	Missing,
	Failed(BoardError),
}

impl Lookup {
	/// Missing and failed lookups both mean "create on next save".
	pub fn into_board(self) -> Option<Board> {
		match self {
			Lookup::Found(board) => Some(board),
			Lookup::Missing | Lookup::Failed(_) => None,
		}
	}
}

#[derive(Clone, Debug)]
pub struct Synchronizer<B> {
	backend: B,
}

impl<B: BoardBackend> Synchronizer<B> {
	pub fn new(backend: B) -> Self {
		Self { backend }
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub async fn lookup(&self, case_id: CaseId) -> Lookup {
		match self.backend.find_board(case_id).await {
			Ok(Some(board)) => Lookup::Found(board),
			Ok(None) => Lookup::Missing,
			Err(err) => {
				warn!("Board lookup for case {case_id} failed, treating as new board: {err}");
				Lookup::Failed(err)
			}
		}
	}

	/// Fetch the board document and both palette listings.
	pub async fn load(&self, case_id: CaseId) -> LoadOutcome {
		let (lookup, evidence, suspects) = join3(
			self.lookup(case_id),
			self.backend.case_evidence(case_id),
			self.backend.case_suspects(case_id),
		)
		.await;

		let mut problems = Vec::new();
		if let Lookup::Failed(err) = &lookup {
			problems.push(format!(
				"Could not reach the saved board ({}); saving will start a new one",
				err.user_message()
			));
		}
		let evidence = evidence.unwrap_or_else(|err| {
			problems.push(format!("Failed to fetch evidence: {}", err.user_message()));
			Vec::new()
		});
		let suspects = suspects.unwrap_or_else(|err| {
			problems.push(format!("Failed to fetch suspects: {}", err.user_message()));
			Vec::new()
		});

		LoadOutcome {
			board: lookup.into_board(),
			evidence,
			suspects,
			error: (!problems.is_empty()).then(|| problems.join("; ")),
		}
	}

	/// Update the known board, else the one the lookup finds, else create.
	pub async fn save(&self, request: &SaveRequest) -> BoardResult<Board> {
		let board_id = match request.board_id {
			Some(id) => Some(id),
			None => self.lookup(request.case_id).await.into_board().map(|b| b.id),
		};
		match board_id {
			Some(id) => self.backend.update_board_data(id, &request.data).await,
			None => {
				info!("Creating board for case {}", request.case_id);
				self.backend.create_board(request.case_id, &request.data).await
			}
		}
	}

	/// Run a full load for `case_id` against `store`.
	pub async fn load_into(&self, store: &impl StoreCell, case_id: CaseId) {
		let Some(ticket) = store.apply(|s| s.begin_load(case_id)) else {
			return;
		};
		let outcome = self.load(case_id).await;
		store.apply(|s| s.finish_load(ticket, outcome));
	}

	/// Save if the store allows it. Returns whether a request went out.
	pub async fn save_from(&self, store: &impl StoreCell, access: Access, viewport: Option<Viewport>) -> bool {
		let Some(request) = store.apply(|s| s.begin_save(access, viewport)).flatten() else {
			return false;
		};
		let result = self.save(&request).await;
		store.apply(|s| s.finish_save(request.ticket, result, Utc::now()));
		true
	}
}

pub const DEFAULT_AUTOSAVE: Duration = Duration::from_secs(60);

/// Fixed-interval autosave for a board session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Autosave {
	interval: Duration,
}

impl Default for Autosave {
	fn default() -> Self {
		Self::new(DEFAULT_AUTOSAVE)
	}
}

impl Autosave {
	pub fn new(interval: Duration) -> Self {
		Self { interval }
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// One timer tick: saves only a dirty, editable, idle session.
	pub async fn tick<B: BoardBackend>(
		&self,
		sync: &Synchronizer<B>,
		store: &impl StoreCell,
		access: Access,
		viewport: Option<Viewport>,
	) -> bool {
		sync.save_from(store, access, viewport).await
	}
}

#[cfg(test)]
pub mod memory {
	//! In-memory backend for exercising the synchronizer.

	use std::cell::{Cell, RefCell};

	use async_trait::async_trait;

	use super::BoardBackend;
	use crate::board::model::{Board, BoardData, BoardId, CaseId, CaseRecord, EvidenceRecord, SuspectRecord};
	use crate::error::{BoardError, BoardResult};

	#[derive(Default)]
	pub struct MemoryBackend {
		pub boards: RefCell<Vec<Board>>,
		pub evidence: Vec<EvidenceRecord>,
		pub suspects: Vec<SuspectRecord>,
		pub cases: Vec<CaseRecord>,
		pub fail_lookup: Cell<bool>,
		pub fail_saves: Cell<bool>,
		pub fail_evidence: Cell<bool>,
		pub writes: Cell<usize>,
	}

	impl MemoryBackend {
		pub fn boards_for(&self, case_id: CaseId) -> Vec<Board> {
			self.boards.borrow().iter().filter(|b| b.case == case_id).cloned().collect()
		}

		fn write(&self) -> BoardResult<()> {
			self.writes.set(self.writes.get() + 1);
			if self.fail_saves.get() {
				return Err(BoardError::Status {
					status: 400,
					detail: "board_data is invalid".into(),
				});
			}
			Ok(())
		}
	}

	#[async_trait(?Send)]
	impl BoardBackend for MemoryBackend {
		async fn find_board(&self, case_id: CaseId) -> BoardResult<Option<Board>> {
			if self.fail_lookup.get() {
				return Err(BoardError::Transport("connection reset".into()));
			}
			Ok(self.boards_for(case_id).into_iter().next())
		}

		async fn create_board(&self, case_id: CaseId, data: &BoardData) -> BoardResult<Board> {
			self.write()?;
			let mut boards = self.boards.borrow_mut();
			let board = Board {
				id: BoardId(boards.len() as u64 + 1),
				case: case_id,
				board_data: data.clone(),
				last_modified: None,
				last_modified_by: None,
			};
			boards.push(board.clone());
			Ok(board)
		}

		async fn update_board_data(&self, board_id: BoardId, data: &BoardData) -> BoardResult<Board> {
			self.write()?;
			let mut boards = self.boards.borrow_mut();
			let board = boards
				.iter_mut()
				.find(|b| b.id == board_id)
				.ok_or_else(|| BoardError::NotFound(format!("board {board_id}")))?;
			board.board_data = data.clone();
			Ok(board.clone())
		}

		async fn case_evidence(&self, _case_id: CaseId) -> BoardResult<Vec<EvidenceRecord>> {
			if self.fail_evidence.get() {
				return Err(BoardError::Status {
					status: 500,
					detail: "server error".into(),
				});
			}
			Ok(self.evidence.clone())
		}

		async fn case_suspects(&self, _case_id: CaseId) -> BoardResult<Vec<SuspectRecord>> {
			Ok(self.suspects.clone())
		}

		async fn case_summary(&self, case_id: CaseId) -> BoardResult<CaseRecord> {
			self.cases
				.iter()
				.find(|c| c.id == case_id.0)
				.cloned()
				.ok_or_else(|| BoardError::NotFound(format!("case {case_id}")))
		}
	}
}
