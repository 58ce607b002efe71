pub mod base_time;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod response;
