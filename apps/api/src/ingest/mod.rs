pub mod handlers;
pub mod job_fetcher;
pub mod pdf;
