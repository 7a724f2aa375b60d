use std::fmt;
use std::str::FromStr;

/// Timestamp precision accepted by the InfluxDB v2 write endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePrecision {
    #[default]
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl WritePrecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "us",
            Self::Nanoseconds => "ns",
        }
    }

    /// Convert a unix timestamp in seconds to this precision's unit
    pub fn scale_unix_secs(&self, secs: i64) -> i64 {
        let per_second: i64 = match self {
            Self::Seconds => 1,
            Self::Milliseconds => 1_000,
            Self::Microseconds => 1_000_000,
            Self::Nanoseconds => 1_000_000_000,
        };
        secs.saturating_mul(per_second)
    }
}

impl fmt::Display for WritePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritePrecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(Self::Seconds),
            "ms" => Ok(Self::Milliseconds),
            "us" => Ok(Self::Microseconds),
            "ns" => Ok(Self::Nanoseconds),
            other => Err(format!("unknown write precision: {}", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InfluxError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Write rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}
