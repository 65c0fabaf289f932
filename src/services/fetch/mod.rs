pub mod dispatcher;
pub mod extractor;
pub mod session;
pub mod snapshot;
pub mod symbols;
