pub mod inhibitor;
pub mod report;
pub mod wake_source;
