pub mod dashboard;
pub mod metric;
