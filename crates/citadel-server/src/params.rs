//! Merged request parameters.
//!
//! The dispatcher builds one [`Parameters`] map per request from, in order:
//!
//! 1. path captures
//! 2. the query string
//! 3. form fields (`application/x-www-form-urlencoded` or
//!    `multipart/form-data`)
//!
//! A later source overwrites an earlier one on a key collision. Files uploaded
//! through a multipart form are attached last under the reserved key
//! [`FILES_KEY`].

use std::str::FromStr;

use bytes::Bytes;
use citadel_core::{CitadelError, CitadelResult};
use indexmap::IndexMap;

/// Reserved parameter name holding uploaded files.
pub const FILES_KEY: &str = "files";

/// A file uploaded through a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field name.
    pub field: String,
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Returns the size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty upload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A path capture, query or form value.
    Text(String),
    /// Uploaded files (only under [`FILES_KEY`]).
    Files(Vec<UploadedFile>),
}

/// Parameters handed to a handler.
///
/// # Example
///
/// ```rust
/// use citadel_server::Parameters;
///
/// let mut params = Parameters::new();
/// params.insert("game", "42");
/// params.insert("turn", "3");
/// params.insert("game", "43");
///
/// assert_eq!(params.text("game"), Some("43"));
/// assert_eq!(params.parse::<u32>("turn").unwrap(), 3);
/// assert!(params.files().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: IndexMap<String, ParamValue>,
}

impl Parameters {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a text value, replacing any previous value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), ParamValue::Text(value.into()));
    }

    /// Inserts text values in order.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in pairs {
            self.insert(name, value);
        }
    }

    /// Attaches uploaded files under [`FILES_KEY`]. Does nothing for an
    /// empty list.
    pub fn attach_files(&mut self, files: Vec<UploadedFile>) {
        if !files.is_empty() {
            self.values
                .insert(FILES_KEY.to_string(), ParamValue::Files(files));
        }
    }

    /// Returns the raw value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Returns the text value for `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the text value for `name`, or a 400 naming the parameter.
    pub fn require(&self, name: &str) -> CitadelResult<&str> {
        self.text(name)
            .ok_or_else(|| CitadelError::bad_request(format!("missing parameter '{name}'")))
    }

    /// Parses the text value for `name`, answering 400 when it is missing or
    /// does not parse.
    pub fn parse<T>(&self, name: &str) -> CitadelResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.require(name)?
            .parse()
            .map_err(|e| CitadelError::bad_request(format!("invalid parameter '{name}': {e}")))
    }

    /// Returns the uploaded files, empty when there are none.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        match self.values.get(FILES_KEY) {
            Some(ParamValue::Files(files)) => files,
            _ => &[],
        }
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            field: "scenario".to_string(),
            file_name: name.to_string(),
            content_type: Some("application/xml".to_string()),
            data: Bytes::from_static(b"<scenario/>"),
        }
    }

    #[test]
    fn test_later_insert_overwrites() {
        let mut params = Parameters::new();
        params.extend([("id", "1"), ("side", "Axis")]);
        params.insert("id", "2");

        assert_eq!(params.text("id"), Some("2"));
        assert_eq!(params.len(), 2);
        let names: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["id", "side"]);
    }

    #[test]
    fn test_files_under_reserved_key() {
        let mut params = Parameters::new();
        params.insert(FILES_KEY, "text value");
        params.attach_files(vec![upload("kursk.xml"), upload("bulge.xml")]);

        assert_eq!(params.files().len(), 2);
        assert_eq!(params.files()[0].file_name, "kursk.xml");
        assert_eq!(params.text(FILES_KEY), None);
    }

    #[test]
    fn test_attach_no_files_keeps_text() {
        let mut params = Parameters::new();
        params.insert(FILES_KEY, "text value");
        params.attach_files(Vec::new());

        assert_eq!(params.text(FILES_KEY), Some("text value"));
        assert!(params.files().is_empty());
    }

    #[test]
    fn test_require_and_parse() {
        let mut params = Parameters::new();
        params.insert("turn", "twelve");

        let err = params.require("game").unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert!(err.client_message().contains("game"));

        let err = params.parse::<u32>("turn").unwrap_err();
        assert!(err.client_message().contains("invalid parameter 'turn'"));
    }

    #[test]
    fn test_upload_len() {
        let file = upload("a.xml");
        assert_eq!(file.len(), 11);
        assert!(!file.is_empty());
    }
}
