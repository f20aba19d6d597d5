pub mod cell;
pub mod cell_id;
pub mod classify;
pub mod heuristics;
pub mod infer;
pub mod layout;
pub mod matrix;
pub mod profile;
pub mod progress;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod sort;
