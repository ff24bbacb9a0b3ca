pub mod ask;
pub mod generate;
pub mod image;
pub mod rerank;
