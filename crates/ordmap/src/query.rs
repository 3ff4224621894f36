//! Query-string serialization and parsing
//!
//! Flattens an [`OrderedMap`] into `key=value` pairs joined with `&`,
//! addressing nesting with bracket paths (`fruits[apple][0]=red`), and
//! rebuilds a map from the same syntax.
//!
//! Path segments and values are percent-encoded individually; the brackets
//! that carry structure are emitted literally. On the way back in, structure
//! is read from literal brackets *before* decoding, so an encoded bracket
//! inside a segment stays part of the key text.

use std::borrow::Cow;

use thiserror::Error;

use crate::map::OrderedMap;
use crate::value::{Value, ValueArray};

/// Malformed query-string input. Surfaces immediately; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A `[` in a key path has no matching `]`.
    #[error("unterminated `[` in key path `{path}`")]
    UnterminatedBracket { path: String },
    /// Text between a `]` and the next `[`, e.g. `a[0]b[1]`.
    #[error("unexpected text after `]` in key path `{path}`")]
    TextAfterBracket { path: String },
    /// Percent-decoding produced bytes that are not valid UTF-8.
    #[error("`{text}` does not percent-decode to valid UTF-8")]
    InvalidEncoding { text: String },
    /// An array index skipped ahead of the next free slot.
    #[error("array index {index} in `{path}` skips ahead of next free slot {expected}")]
    SparseIndex {
        path: String,
        index: usize,
        expected: usize,
    },
    /// The same path is addressed as two different shapes
    /// (scalar vs array vs map), e.g. `a=1&a[b]=2`.
    #[error("expected a {expected} at `{path}`, found a {found}")]
    ShapeConflict {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// `[]` (array append) used somewhere other than the final segment.
    #[error("`[]` must be the last segment in `{path}`")]
    AppendNotLast { path: String },
}

/// One step of a bracket path: `[name]`, `[3]`, or the append form `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
    Append,
}

impl OrderedMap {
    /// Serialize to URL query-string form.
    ///
    /// Entries are visited depth-first in insertion order. Scalars emit
    /// `path=value`; arrays recurse with `path[index]`; nested maps recurse
    /// with `path[key]`. All leaf pairs are joined with `&`.
    ///
    /// `Null` values are skipped entirely (no pair is emitted), and empty
    /// arrays or maps contribute nothing.
    ///
    /// ```
    /// use ordmap::ordmap;
    ///
    /// let fruits = ordmap! {
    ///     "fruits" => ordmap! {
    ///         "apple" => vec!["red", "yellow"],
    ///         "lemon" => vec!["green", "yellow"],
    ///     },
    /// };
    /// assert_eq!(
    ///     fruits.to_query_string(),
    ///     "fruits[apple][0]=red&fruits[apple][1]=yellow&fruits[lemon][0]=green&fruits[lemon][1]=yellow"
    /// );
    /// ```
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in self.iter() {
            append_pairs(&mut pairs, urlencoding::encode(key).into_owned(), value);
        }
        pairs.join("&")
    }

    /// Parse URL query-string form back into a map.
    ///
    /// Pairs are split on `&`, keys and values percent-decoded, and bracket
    /// paths rebuilt into nesting: dense decimal segments are array indices,
    /// `[]` appends to an array, anything else is a map key. A pair without
    /// `=` gets an empty-string value. Repeated scalar keys keep the last
    /// value; repeated container paths must agree on shape.
    ///
    /// Decoding is strict percent-decoding only; `+` is not treated as a
    /// space.
    pub fn from_query_string(input: &str) -> Result<OrderedMap, QueryError> {
        let mut root = OrderedMap::new();
        for pair in input.split('&').filter(|pair| !pair.is_empty()) {
            let (raw_path, raw_value) = match pair.split_once('=') {
                Some((path, value)) => (path, value),
                None => (pair, ""),
            };
            let (head, segments) = parse_path(raw_path)?;
            let leaf = Value::string(decode(raw_value)?);
            match segments.split_first() {
                None => {
                    root.set(head, leaf);
                }
                Some((first, rest)) => {
                    let slot = root.entry_or_insert(head, empty_container(first));
                    place(slot, first, rest, leaf, raw_path)?;
                }
            }
        }
        Ok(root)
    }
}

/// Depth-first flattening of one entry into `pairs`.
fn append_pairs(pairs: &mut Vec<String>, path: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_pairs(pairs, format!("{path}[{index}]"), item);
            }
        }
        Value::Map(map) => {
            for (key, item) in map.iter() {
                append_pairs(pairs, format!("{path}[{}]", urlencoding::encode(key)), item);
            }
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            pairs.push(format!(
                "{path}={}",
                urlencoding::encode(&value.to_string())
            ));
        }
    }
}

fn decode(text: &str) -> Result<String, QueryError> {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .map_err(|_| QueryError::InvalidEncoding {
            text: text.to_string(),
        })
}

/// Split `name[a][0]` into its decoded head key and bracket segments.
fn parse_path(raw: &str) -> Result<(String, Vec<Segment>), QueryError> {
    let (head, mut rest) = match raw.find('[') {
        Some(open) => (&raw[..open], &raw[open..]),
        None => (raw, ""),
    };
    let head = decode(head)?;

    let mut segments = Vec::new();
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(QueryError::TextAfterBracket {
                path: raw.to_string(),
            });
        }
        let close = match rest.find(']') {
            Some(close) => close,
            None => {
                return Err(QueryError::UnterminatedBracket {
                    path: raw.to_string(),
                })
            }
        };
        let inner = &rest[1..close];
        segments.push(segment_from(inner)?);
        rest = &rest[close + 1..];
    }
    Ok((head, segments))
}

fn segment_from(inner: &str) -> Result<Segment, QueryError> {
    if inner.is_empty() {
        return Ok(Segment::Append);
    }
    if inner.bytes().all(|b| b.is_ascii_digit()) {
        // An out-of-range digit run falls back to being a plain key.
        if let Ok(index) = inner.parse::<usize>() {
            return Ok(Segment::Index(index));
        }
    }
    Ok(Segment::Key(decode(inner)?))
}

/// Fresh container matching the shape `segment` addresses into.
fn empty_container(segment: &Segment) -> Value {
    match segment {
        Segment::Key(_) => Value::Map(OrderedMap::new()),
        Segment::Index(_) | Segment::Append => Value::Array(ValueArray::new()),
    }
}

/// Write `leaf` into `node` at `segment` followed by `rest`.
fn place(
    node: &mut Value,
    segment: &Segment,
    rest: &[Segment],
    leaf: Value,
    raw: &str,
) -> Result<(), QueryError> {
    let found = node.type_name();
    match segment {
        Segment::Key(key) => {
            let map = node.as_map_mut().ok_or_else(|| QueryError::ShapeConflict {
                path: raw.to_string(),
                expected: "map",
                found,
            })?;
            match rest.split_first() {
                None => {
                    map.set(key.clone(), leaf);
                    Ok(())
                }
                Some((next, tail)) => {
                    let slot = map.entry_or_insert(key.clone(), empty_container(next));
                    place(slot, next, tail, leaf, raw)
                }
            }
        }
        Segment::Index(index) => {
            let items = node.as_array_mut().ok_or_else(|| QueryError::ShapeConflict {
                path: raw.to_string(),
                expected: "array",
                found,
            })?;
            let sparse = |expected: usize| QueryError::SparseIndex {
                path: raw.to_string(),
                index: *index,
                expected,
            };
            match rest.split_first() {
                None => {
                    if *index < items.len() {
                        if let Some(slot) = items.get_mut(*index) {
                            *slot = leaf;
                        }
                        Ok(())
                    } else if *index == items.len() {
                        items.push(leaf);
                        Ok(())
                    } else {
                        Err(sparse(items.len()))
                    }
                }
                Some((next, tail)) => {
                    if *index > items.len() {
                        return Err(sparse(items.len()));
                    }
                    if *index == items.len() {
                        items.push(empty_container(next));
                    }
                    match items.get_mut(*index) {
                        Some(slot) => place(slot, next, tail, leaf, raw),
                        None => Err(sparse(items.len())),
                    }
                }
            }
        }
        Segment::Append => {
            let items = node.as_array_mut().ok_or_else(|| QueryError::ShapeConflict {
                path: raw.to_string(),
                expected: "array",
                found,
            })?;
            if rest.is_empty() {
                items.push(leaf);
                Ok(())
            } else {
                Err(QueryError::AppendNotLast {
                    path: raw.to_string(),
                })
            }
        }
    }
}
