pub mod compression;
pub mod constants;
pub mod error;
pub mod filter;
pub mod format;
pub mod projection;
pub mod reader;
pub mod selection;
pub mod timebase;
