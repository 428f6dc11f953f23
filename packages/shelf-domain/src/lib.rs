pub mod enrich;
pub mod metadata;
pub mod path;
