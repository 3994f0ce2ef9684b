pub mod parsers;
pub mod pipelines;
