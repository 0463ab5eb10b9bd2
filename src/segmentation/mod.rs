pub mod runner;
pub mod segmenter;
