//! Batch-cut segments out of one audio file by driving ffmpeg from a JSON job file.

pub mod app;
pub mod batch;
pub mod cli;
pub mod cutter;
pub mod ffmpeg;
pub mod job;
pub mod logging;
pub mod report;
pub mod time;
