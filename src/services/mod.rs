pub mod fetch;
pub mod loader;
pub mod staging;
