pub mod docx;
pub mod filename;
pub mod handlers;
