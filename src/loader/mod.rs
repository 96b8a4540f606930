pub mod error;
pub mod log;
pub mod config;
pub mod candidate;
pub mod filter;
pub mod observer;
pub mod materializer;
pub mod prefetch;
pub mod rescan;
pub mod priority;
pub mod host;
pub mod conductor;
pub mod wasm;

pub use error::*;
pub use config::*;
pub use candidate::*;
pub use filter::*;
pub use observer::*;
pub use materializer::*;
pub use prefetch::*;
pub use rescan::*;
pub use priority::*;
pub use host::*;
pub use conductor::*;
pub use wasm::*;

#[cfg(test)]
mod tests;
