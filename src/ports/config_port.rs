//! Configuration access port trait.
//!
//! Values come back raw. Parsing lives in `domain::config_validation`, so a
//! malformed value is reported instead of replaced by a default.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
