pub mod document;
pub mod writer;
