//! Ports - interfaces the application layer consumes or exposes

pub mod member_gateway;
pub mod progress;
pub mod verdict_store;
