pub mod comment;
pub mod document;
mod input;
pub mod product;
pub mod taxonomy;
