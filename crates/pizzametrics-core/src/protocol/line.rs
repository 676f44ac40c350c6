//! Line-protocol encoding.
//!
//! Format: `measurement,tag1=v1,tag2=v2 field1=value1,field2=value2`.
//!
//! Escaping rules:
//! - measurement name: `,` and space
//! - tag keys, tag values, field keys: `,`, `=` and space
//!
//! Newlines cannot be escaped and are rejected, as is a trailing backslash
//! (it would escape the next delimiter). Timestamps are omitted; the
//! ingestion endpoint stamps lines on arrival.

use std::fmt;

use crate::error::{MetricsError, Result};

/// Numeric field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    UInt(u64),
    Int(i64),
    Float(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// One line-protocol measurement (builder style).
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    name: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl Measurement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Append a tag. Tags are encoded in insertion order.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Append a field. At least one is required to encode.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Encode into a single line (no trailing newline).
    pub fn encode(&self) -> Result<String> {
        if self.name.is_empty() {
            return Err(MetricsError::Encode("measurement name is empty".into()));
        }
        if self.fields.is_empty() {
            return Err(MetricsError::Encode(format!(
                "measurement {} has no fields",
                self.name
            )));
        }

        let mut out = String::with_capacity(64);
        push_escaped(&mut out, &self.name, &[',', ' '])?;

        for (k, v) in &self.tags {
            if k.is_empty() || v.is_empty() {
                return Err(MetricsError::Encode(format!(
                    "measurement {} has an empty tag key or value",
                    self.name
                )));
            }
            out.push(',');
            push_escaped(&mut out, k, &[',', '=', ' '])?;
            out.push('=');
            push_escaped(&mut out, v, &[',', '=', ' '])?;
        }

        for (i, (k, v)) in self.fields.iter().enumerate() {
            if k.is_empty() {
                return Err(MetricsError::Encode(format!(
                    "measurement {} has an empty field key",
                    self.name
                )));
            }
            if let FieldValue::Float(f) = v {
                if !f.is_finite() {
                    return Err(MetricsError::Encode(format!(
                        "field {k} of {} is not finite",
                        self.name
                    )));
                }
            }
            out.push(if i == 0 { ' ' } else { ',' });
            push_escaped(&mut out, k, &[',', '=', ' '])?;
            out.push('=');
            out.push_str(&v.to_string());
        }

        Ok(out)
    }
}

fn push_escaped(out: &mut String, s: &str, special: &[char]) -> Result<()> {
    // A trailing backslash would escape the delimiter that follows it.
    if s.ends_with('\\') {
        return Err(MetricsError::Encode(format!(
            "trailing backslash not allowed in line protocol: {s:?}"
        )));
    }
    for c in s.chars() {
        if c == '\n' || c == '\r' {
            return Err(MetricsError::Encode(format!(
                "newline not allowed in line protocol: {s:?}"
            )));
        }
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    Ok(())
}
