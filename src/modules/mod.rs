pub mod pihole;
