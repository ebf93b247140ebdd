pub mod env;
pub mod extractor;
pub mod retry;
