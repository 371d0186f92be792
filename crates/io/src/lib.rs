// File-boundary I/O for manifest builds

pub mod discover;
pub mod json;
pub mod schema;
pub mod yaml;
