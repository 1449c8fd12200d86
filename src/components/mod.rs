pub mod board_canvas;
pub mod edge_inspector;
pub mod notice;
pub mod sidebar;
pub mod toolbar;
