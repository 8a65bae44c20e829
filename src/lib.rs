// Domain layer (business logic)
pub mod engine;
pub mod template;

// Storage layer
pub mod store;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod config;
