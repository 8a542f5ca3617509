pub mod activity;
pub mod tab;

pub use activity::ActivityRecord;
pub use tab::{TabChangeInfo, TabSnapshot, TabStatus};
