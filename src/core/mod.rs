pub mod query;
pub mod util;
