pub mod identify_service;
pub mod result_writer;

pub use identify_service::{IdolIdentifier, LlmIdentifier};
pub use result_writer::ResultWriter;
