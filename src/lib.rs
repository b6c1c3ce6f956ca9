pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod storage;

pub use config::{ClientConfigBuilder, XrayConfig, assemble};
pub use error::{Error, Result};
pub use parser::{ParsedEndpoint, decode, decode_share_link};

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
