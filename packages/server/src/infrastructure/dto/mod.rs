//! Data Transfer Objects (DTOs) for the admin HTTP API.

pub mod http;
