//! Normalization of list responses.
//!
//! List endpoints answer in one of three shapes: a bare JSON array, a
//! paginated envelope (`{"count": .., "next": .., "results": [..]}`), or
//! something unexpected (`null`, an error object, a scalar). Callers always get
//! a vector back; the unexpected shapes become an empty list.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parsed shape of a list response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEnvelope {
    /// The body was a plain array.
    Bare(Vec<Value>),
    /// The body was a pagination envelope.
    Paginated {
        count: Option<u64>,
        next: Option<String>,
        previous: Option<String>,
        results: Vec<Value>,
    },
    /// The body had no recognizable list in it.
    Empty,
}

/// A normalized page of typed items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across pages, when the server reports it.
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: None,
            next: None,
            previous: None,
        }
    }
}

impl ListEnvelope {
    /// Classifies a response body.
    pub fn parse(value: Value) -> Self {
        match value {
            Value::Array(items) => ListEnvelope::Bare(items),
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(results)) => ListEnvelope::Paginated {
                    count: map.get("count").and_then(Value::as_u64),
                    next: map.get("next").and_then(Value::as_str).map(str::to_string),
                    previous: map
                        .get("previous")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    results,
                },
                _ => ListEnvelope::Empty,
            },
            _ => ListEnvelope::Empty,
        }
    }

    /// Returns the number of raw entries in the envelope.
    pub fn len(&self) -> usize {
        match self {
            ListEnvelope::Bare(items) | ListEnvelope::Paginated { results: items, .. } => {
                items.len()
            }
            ListEnvelope::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes every entry, skipping those that do not fit `T`.
    pub fn into_items<T: DeserializeOwned>(self) -> Vec<T> {
        self.into_page().items
    }

    /// Decodes into a [`Page`], keeping pagination metadata when present.
    pub fn into_page<T: DeserializeOwned>(self) -> Page<T> {
        let (raw, count, next, previous) = match self {
            ListEnvelope::Bare(items) => (items, None, None, None),
            ListEnvelope::Paginated {
                count,
                next,
                previous,
                results,
            } => (results, count, next, previous),
            ListEnvelope::Empty => return Page::default(),
        };

        let items = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<T>(entry) {
                Ok(item) => Some(item),
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping malformed list entry");
                    None
                }
            })
            .collect();

        Page {
            items,
            count,
            next,
            previous,
        }
    }
}
