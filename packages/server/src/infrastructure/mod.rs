//! Infrastructure layer: the in-memory session registry and wire DTOs.

pub mod dto;
pub mod repository;
