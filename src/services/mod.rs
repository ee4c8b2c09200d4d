//! Business-logic services shared by every transport entry point.

pub mod shortener;

pub use shortener::{
    BatchShortenItem, BatchShortenResult, CodeGenerator, RandomCodeGenerator, ShortenerService,
};
