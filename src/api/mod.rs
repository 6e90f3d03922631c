pub mod dto;
pub mod http;
pub mod info;
pub mod metric;
pub mod system;
