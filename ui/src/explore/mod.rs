//! Explorer dashboard: the derived-state engine and its view components.

pub mod engine;
pub mod view;

mod chart_pane;
mod controls;
mod notices;

pub use view::ExploreDashboard;
