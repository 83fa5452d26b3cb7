pub mod manifest;
pub mod page;
pub mod types;
