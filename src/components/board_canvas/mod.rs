mod component;
mod render;
mod state;

pub use component::BoardCanvas;
pub use state::{Selection, fit_viewport};
