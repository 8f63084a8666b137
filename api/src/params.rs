//! Request parameter cleaning for the page endpoints.
//!
//! Page parameters may arrive in the query string and in a submitted form.
//! Form values take precedence over query values with the same name.

use std::collections::HashMap;

use crate::error::RequestError;

#[derive(Debug, Default)]
pub struct Params {
    values: HashMap<String, String>,
    /// Keys in the order they were first submitted
    order: Vec<String>,
}

impl Params {
    pub fn new(query: Vec<(String, String)>, form: Vec<(String, String)>) -> Self {
        let mut params = Params::default();
        for (key, value) in query.into_iter().chain(form) {
            if !params.values.contains_key(&key) {
                params.order.push(key.clone());
            }
            params.values.insert(key, value);
        }
        params
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// An integer parameter. Missing or empty values are `None`, anything
    /// that is not an integer is rejected.
    pub fn optional_int(&self, name: &str) -> Result<Option<i32>, RequestError> {
        match self.raw(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .map(Some)
                .map_err(|_| RequestError::invalid(format!("`{name}` must be an integer"))),
        }
    }

    pub fn required_int(&self, name: &str) -> Result<i32, RequestError> {
        self.optional_int(name)?
            .ok_or_else(|| RequestError::invalid(format!("missing required parameter `{name}`")))
    }

    pub fn optional_bool(&self, name: &str, default: bool) -> bool {
        self.raw(name).map(clean_bool).unwrap_or(default)
    }

    /// Keys and values in submission order, for parameters that are spread
    /// over many fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v.as_str())))
    }
}

/// Lenient boolean cleaning: the usual words are understood, any other
/// non-empty value except `0` counts as true.
pub fn clean_bool(raw: &str) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "on" | "true" => true,
        "no" | "off" | "false" | "" | "0" => false,
        _ => true,
    }
}

/// Parses a positive database id.
pub fn positive_id(name: &str, value: i32) -> Result<i32, RequestError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(RequestError::invalid(format!("`{name}` must be a positive id")))
    }
}
