use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Counters returned by the Pi-hole summary endpoint at one point in time.
/// Missing counters read as zero; the payload is not validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSnapshot {
    pub domains_being_blocked: f64,
    pub dns_queries_today: f64,
    pub ads_blocked_today: f64,
    pub ads_percentage_today: f64,
    pub unique_domains: f64,
    pub queries_forwarded: f64,
    pub queries_cached: f64,
    pub clients_ever_seen: f64,
    pub unique_clients: f64,
    pub dns_queries_all_types: f64,
    #[serde(rename = "reply_NODATA")]
    pub reply_nodata: f64,
    #[serde(rename = "reply_NXDOMAIN")]
    pub reply_nxdomain: f64,
    #[serde(rename = "reply_CNAME")]
    pub reply_cname: f64,
    #[serde(rename = "reply_IP")]
    pub reply_ip: f64,
    pub privacy_level: f64,
    pub status: String,
    pub gravity_last_updated: GravityLastUpdated,
}

impl StatusSnapshot {
    pub fn is_enabled(&self) -> bool {
        self.status == "enabled"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityLastUpdated {
    pub file_exists: bool,
    /// Unix timestamp of the last blocklist rebuild
    pub absolute: i64,
    pub relative: RelativeAge,
}

impl GravityLastUpdated {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.absolute, 0)
    }
}

/// Age of the gravity list as reported by the API (often sent as strings)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeAge {
    #[serde(deserialize_with = "string_or_number")]
    pub days: String,
    #[serde(deserialize_with = "string_or_number")]
    pub hours: String,
    #[serde(deserialize_with = "string_or_number")]
    pub minutes: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
