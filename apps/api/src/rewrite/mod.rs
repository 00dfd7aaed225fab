pub mod engine;
pub mod handlers;
pub mod improvement;
pub mod prompts;
