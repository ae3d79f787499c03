//! Configuration access port.
//!
//! Missing keys come back as `Ok(None)`; a key that is present but does not
//! parse as the requested type is a `ConfigInvalid` error.

use crate::domain::error::Result;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>>;
}
