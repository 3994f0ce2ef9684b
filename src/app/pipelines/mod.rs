pub mod bb;
pub mod bridely;
pub mod twn;

pub use bb::{BbDataset, BbPipeline};
pub use bridely::{BridelyDataset, BridelyPipeline};
pub use twn::TwnPipeline;
