//! Small helpers shared across the session core.

mod time;

pub use time::{
    duration_from_proto, parse_timestamp, record_latency, time_from_proto, to_proto_duration,
    to_proto_time, verify_timestamp_is_rounded,
};
