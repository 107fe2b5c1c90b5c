//! Infrastructure layer: concrete repositories and transfer objects.

pub mod dto;
pub mod repository;
