pub mod clean;
pub mod schema;
