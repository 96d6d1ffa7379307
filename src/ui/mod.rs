/// Presentation adapters: everything here only reads [`crate::state::AppState`]
/// except the filter controls, which go through its selection methods.
pub mod charts;
pub mod map;
pub mod panels;
