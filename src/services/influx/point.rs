use std::fmt::Write;

use crate::services::influx::WritePrecision;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

/// A single measurement with its fields and an optional explicit timestamp.
/// Without a timestamp the server assigns the write time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub measurement: String,
    pub fields: Vec<(String, FieldValue)>,
    /// Unix seconds; scaled to the write precision when encoded
    pub timestamp: Option<i64>,
}

impl MetricPoint {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    pub fn float_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.push((name.into(), FieldValue::Float(value)));
        self
    }

    pub fn int_field(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.push((name.into(), FieldValue::Integer(value)));
        self
    }

    pub fn timestamp(mut self, unix_secs: i64) -> Self {
        self.timestamp = Some(unix_secs);
        self
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    /// Encode as one line of InfluxDB line protocol.
    /// Non-finite floats are skipped; returns None when no field is left.
    pub fn to_line_protocol(&self, precision: WritePrecision) -> Option<String> {
        let mut line = escape(&self.measurement, &[',', ' ']);
        let mut separator = ' ';
        let mut written = 0;

        for (key, value) in &self.fields {
            let encoded = match value {
                FieldValue::Float(v) if !v.is_finite() => continue,
                FieldValue::Float(v) => v.to_string(),
                FieldValue::Integer(v) => format!("{}i", v),
            };
            line.push(separator);
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&encoded);
            separator = ',';
            written += 1;
        }

        if written == 0 {
            return None;
        }

        if let Some(ts) = self.timestamp {
            let _ = write!(line, " {}", precision.scale_unix_secs(ts));
        }

        Some(line)
    }
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
