//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and, where rows are created from API input, a
//! `Deserialize` create DTO.

pub mod chat_message;
pub mod credit;
pub mod job;
pub mod project;
pub mod report;
