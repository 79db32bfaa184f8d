//! Request / response bodies of the HTTP API.

pub mod chat;
pub mod common;
pub mod mood;
pub mod resource;
