pub mod entities;
pub mod errors;
pub mod mapping;
pub mod models;
