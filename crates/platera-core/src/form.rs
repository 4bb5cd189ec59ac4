//! Multipart form bodies.
//!
//! Forms are kept as an ordered list of fields so a request can be rebuilt
//! after a token refresh; `reqwest::multipart::Form` itself is single-use.
//! Nested JSON flattens with bracket keys: `address[city]`, `tags[]`,
//! `items[0][name]`.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// A file attached to a form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

/// Ordered multipart fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a JSON object into fields. Non-object values produce no fields.
    pub fn from_value(value: &Value) -> Self {
        let mut form = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                form.append_value(key, value);
            }
        }
        form
    }

    #[must_use]
    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(key, value);
        self
    }

    #[must_use]
    pub fn file(mut self, key: impl Into<String>, file: FilePart) -> Self {
        self.fields.push((key.into(), FormValue::File(file)));
        self
    }

    pub fn push_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields
            .push((key.into(), FormValue::Text(value.into())));
    }

    /// Replaces every field named `key` with a single text value.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.fields.retain(|(k, _)| k != key);
        self.push_text(key, value);
    }

    /// Appends `value` under `key`, flattening arrays and objects.
    pub fn append_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => self.push_text(key, b.to_string()),
            Value::Number(n) => self.push_text(key, n.to_string()),
            Value::String(s) => self.push_text(key, s.as_str()),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if item.is_object() || item.is_array() {
                        self.append_value(&format!("{key}[{index}]"), item);
                    } else {
                        self.append_value(&format!("{key}[]"), item);
                    }
                }
            }
            Value::Object(map) => {
                for (sub, item) in map {
                    self.append_value(&format!("{key}[{sub}]"), item);
                }
            }
        }
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    /// Returns the first text value stored under `key`.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.fields.iter().find_map(|(k, v)| match v {
            FormValue::Text(text) if k == key => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a fresh wire form.
    pub fn to_multipart(&self) -> ApiResult<Form> {
        let mut form = Form::new();
        for (key, value) in &self.fields {
            form = match value {
                FormValue::Text(text) => form.text(key.clone(), text.clone()),
                FormValue::File(file) => {
                    let mut part =
                        Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime {
                        part = part.mime_str(mime).map_err(|err| {
                            ApiError::invalid_request(format!("Invalid MIME type {mime}: {err}"))
                        })?;
                    }
                    form.part(key.clone(), part)
                }
            };
        }
        Ok(form)
    }
}
