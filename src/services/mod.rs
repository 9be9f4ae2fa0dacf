pub mod alerts;
pub mod document;
pub mod fetcher;
pub mod literal;
pub mod portal;
pub mod rate_limit;
pub mod station;
pub mod stations;
pub mod summary;
