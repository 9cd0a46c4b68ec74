//! Services built on top of the provider adapters

pub mod registry;

pub use registry::GitProviderRegistry;
