#![forbid(unsafe_code)]

pub mod cli;
pub mod client;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod ocr;
pub mod organize;
pub mod pipeline;
