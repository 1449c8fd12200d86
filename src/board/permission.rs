//! Role-derived edit access for the board.

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
	pub name: String,
}

/// The signed-in user as far as the board is concerned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	pub id: u64,
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub roles: Vec<RoleRef>,
}

impl Actor {
	/// Parse the user record the login flow keeps in local storage.
	pub fn from_stored(raw: &str) -> Option<Self> {
		serde_json::from_str(raw)
			.map_err(|err| debug!("Stored user record unreadable: {err}"))
			.ok()
	}

	pub fn has_any_role(&self, names: &[String]) -> bool {
		self.roles.iter().any(|r| names.iter().any(|n| *n == r.name))
	}
}

/// Whether mutation entry points are live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Access {
	Editor,
	#[default]
	ReadOnly,
}

impl Access {
	/// Editable iff the actor holds one of `editor_roles`. No actor, no edits.
	pub fn for_actor(actor: Option<&Actor>, editor_roles: &[String]) -> Self {
		match actor {
			Some(actor) if actor.has_any_role(editor_roles) => Access::Editor,
			_ => Access::ReadOnly,
		}
	}

	pub fn can_edit(self) -> bool {
		self == Access::Editor
	}
}

/// Read the signed-in actor from browser local storage.
pub fn stored_actor(key: &str) -> Option<Actor> {
	let storage = web_sys::window()?.local_storage().ok()??;
	let raw = storage.get_item(key).ok()??;
	Actor::from_stored(&raw)
}
