pub mod forwarder;
pub mod influx;
pub mod pihole;
