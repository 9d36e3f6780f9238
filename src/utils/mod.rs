//! Utility functions and helpers.

pub mod fs;
pub mod http;
pub mod text;

use url::Url;

use crate::error::Result;

/// Join a relative endpoint onto an API root.
///
/// The root should end with `/`; otherwise its last segment is replaced.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(base)?.join(path)?)
}
