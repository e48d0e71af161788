pub mod cache_storage;
pub mod gateways;
