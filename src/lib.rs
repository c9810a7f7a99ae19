pub mod config;
pub mod deploy;
pub mod error;
pub mod overlay;
pub mod projection;
pub mod serve;
pub mod site;
pub mod source;
pub mod template;

pub use error::{Error, Result};
