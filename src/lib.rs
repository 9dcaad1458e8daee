pub mod analyzers;
pub mod category;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod grid;
pub mod output;
pub mod parser;
pub mod process;
pub mod reader;
pub mod request;
