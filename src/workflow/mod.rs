pub mod controller;
pub mod view;

pub use controller::{BatchStats, WorkflowController};
pub use view::{render_preview, render_results, PreviewView, ResultTile, ResultsView};
