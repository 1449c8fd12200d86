//! PNG snapshot of the board canvas.

use log::info;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlCanvasElement};

use super::model::CaseId;
use crate::error::{BoardError, BoardResult};

/// Download name, e.g. `detective-board-case-7.png`.
pub fn file_name(prefix: &str, case_id: CaseId) -> String {
	format!("{prefix}-{case_id}.png")
}

fn js_error(context: &str, err: JsValue) -> BoardError {
	BoardError::Export(format!("{context}: {err:?}"))
}

/// Encode the canvas as PNG and hand it to the browser as a download.
pub fn export_png(canvas: &HtmlCanvasElement, file_name: &str) -> BoardResult<()> {
	let url = canvas
		.to_data_url_with_type("image/png")
		.map_err(|err| js_error("Could not encode the board", err))?;
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| BoardError::Export("No document to download into".into()))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(|err| js_error("Could not create download link", err))?
		.dyn_into()
		.map_err(|_| BoardError::Export("Download link is not an anchor".into()))?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();
	info!("Exported board snapshot as {file_name}");
	Ok(())
}
