use crate::modules::pihole::StatusSnapshot;
use crate::services::influx::MetricPoint;

pub const GRAVITY_FIELD: &str = "gravity_last_updated";

/// Map one snapshot to its two points: the counters (stamped by the server
/// at write time) and a gravity marker stamped at the last gravity update.
pub fn map_snapshot(snapshot: &StatusSnapshot, measurement: &str) -> [MetricPoint; 2] {
    [
        summary_point(snapshot, measurement),
        gravity_point(snapshot, measurement),
    ]
}

pub fn summary_point(snapshot: &StatusSnapshot, measurement: &str) -> MetricPoint {
    MetricPoint::new(measurement)
        .float_field("domains_being_blocked", snapshot.domains_being_blocked)
        .float_field("dns_queries_today", snapshot.dns_queries_today)
        .float_field("ads_blocked_today", snapshot.ads_blocked_today)
        .float_field("ads_percentage_today", snapshot.ads_percentage_today)
        .float_field("unique_domains", snapshot.unique_domains)
        .float_field("queries_forwarded", snapshot.queries_forwarded)
        .float_field("queries_cached", snapshot.queries_cached)
        .float_field("clients_ever_seen", snapshot.clients_ever_seen)
        .float_field("unique_clients", snapshot.unique_clients)
        .float_field("dns_queries_all_types", snapshot.dns_queries_all_types)
        .float_field("reply_no_data", snapshot.reply_nodata)
        .float_field("reply_nx_domain", snapshot.reply_nxdomain)
        .float_field("reply_CNAME", snapshot.reply_cname)
        .float_field("reply_IP", snapshot.reply_ip)
        .float_field("status", if snapshot.is_enabled() { 1.0 } else { 0.0 })
}

pub fn gravity_point(snapshot: &StatusSnapshot, measurement: &str) -> MetricPoint {
    MetricPoint::new(measurement)
        .int_field(GRAVITY_FIELD, 1)
        .timestamp(snapshot.gravity_last_updated.absolute)
}
