//! Request parameters
//!
//! Query-string and form values, keyed by name. A name may repeat; values keep
//! the order they were decoded in.

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value for `name`
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// All values for `name`
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// First value for `name`
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)?.first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.append(k, v);
        }
        params
    }
}

/// Check that every required key is present with a non-empty first value.
///
/// Keys are checked in the given order and the first missing one is reported.
pub fn validate_params<I>(required: I, params: &Params) -> Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for key in required {
        let key = key.as_ref();
        match params.first(key) {
            Some(value) if !value.is_empty() => {}
            _ => return Err(Error::MissingParameter(key.to_string())),
        }
    }
    Ok(())
}
