//! Conversions between std time types and protobuf well-known types.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::error;

use crate::core::constants::{
    LATENCY_COLLECTION_LIMIT, MAX_PROTO_DURATION_SECONDS, MAX_PROTO_NANOS, NANOS_PER_SECOND,
};
use crate::core::{KryptonError, KryptonResult};
use crate::proto::{ProtoDuration, ProtoTimestamp};

fn validate_duration(d: &ProtoDuration) -> KryptonResult<()> {
    if !(-MAX_PROTO_DURATION_SECONDS..=MAX_PROTO_DURATION_SECONDS).contains(&d.seconds) {
        return Err(KryptonError::invalid_argument(format!(
            "seconds={}",
            d.seconds
        )));
    }
    if !(-MAX_PROTO_NANOS..=MAX_PROTO_NANOS).contains(&d.nanos) {
        return Err(KryptonError::invalid_argument(format!("nanos={}", d.nanos)));
    }
    if (d.seconds < 0 && d.nanos > 0) || (d.seconds > 0 && d.nanos < 0) {
        return Err(KryptonError::invalid_argument("sign mismatch"));
    }
    Ok(())
}

/// Convert a [`Duration`] to its protobuf form.
pub fn to_proto_duration(d: Duration) -> KryptonResult<ProtoDuration> {
    let seconds = i64::try_from(d.as_secs())
        .map_err(|_| KryptonError::invalid_argument(format!("seconds={}", d.as_secs())))?;
    // subsec_nanos is always below one second.
    let proto = ProtoDuration {
        seconds,
        nanos: d.subsec_nanos() as i32,
    };
    validate_duration(&proto)?;
    Ok(proto)
}

/// Convert a protobuf duration to a [`Duration`].
///
/// Negative durations are valid on the wire but have no [`Duration`] form.
pub fn duration_from_proto(proto: &ProtoDuration) -> KryptonResult<Duration> {
    validate_duration(proto)?;
    if proto.seconds < 0 || proto.nanos < 0 {
        return Err(KryptonError::invalid_argument(format!(
            "negative duration: seconds={} nanos={}",
            proto.seconds, proto.nanos
        )));
    }
    Ok(Duration::new(proto.seconds as u64, proto.nanos as u32))
}

/// Convert a [`SystemTime`] to a protobuf timestamp.
pub fn to_proto_time(t: SystemTime) -> KryptonResult<ProtoTimestamp> {
    let (seconds, nanos) = match t.duration_since(UNIX_EPOCH) {
        Ok(since) => {
            let d = to_proto_duration(since)?;
            (d.seconds, d.nanos)
        }
        Err(e) => {
            // Before the epoch: nanos stay non-negative, seconds round down.
            let before = to_proto_duration(e.duration())?;
            if before.nanos == 0 {
                (-before.seconds, 0)
            } else {
                (-before.seconds - 1, NANOS_PER_SECOND as i32 - before.nanos)
            }
        }
    };
    Ok(ProtoTimestamp { seconds, nanos })
}

/// Convert a protobuf timestamp to a [`SystemTime`].
pub fn time_from_proto(proto: &ProtoTimestamp) -> KryptonResult<SystemTime> {
    if !(0..=MAX_PROTO_NANOS).contains(&proto.nanos) {
        return Err(KryptonError::invalid_argument(format!(
            "nanos={}",
            proto.nanos
        )));
    }
    let whole = Duration::from_secs(proto.seconds.unsigned_abs());
    let base = if proto.seconds >= 0 {
        UNIX_EPOCH.checked_add(whole)
    } else {
        UNIX_EPOCH.checked_sub(whole)
    };
    base.and_then(|t| t.checked_add(Duration::from_nanos(proto.nanos as u64)))
        .ok_or_else(|| {
            KryptonError::invalid_argument(format!("timestamp out of range: {}", proto.seconds))
        })
}

/// Parse an RFC 3339 timestamp such as `2020-08-07T01:06:13+00:00`.
pub fn parse_timestamp(s: &str) -> KryptonResult<ProtoTimestamp> {
    s.parse::<ProtoTimestamp>().map_err(|e| {
        error!("Unable to parse timestamp [{}]: {}", s, e);
        KryptonError::invalid_argument(format!("unable to parse timestamp: {s}"))
    })
}

/// Check that `timestamp` falls on a multiple of `increments`.
pub fn verify_timestamp_is_rounded(
    timestamp: &ProtoTimestamp,
    increments: Duration,
) -> KryptonResult<()> {
    let step = i64::try_from(increments.as_secs()).unwrap_or(0);
    if step == 0 || timestamp.nanos != 0 || timestamp.seconds % step != 0 {
        return Err(KryptonError::invalid_argument(format!(
            "Expiry timestamp not in increments of {increments:?}"
        )));
    }
    Ok(())
}

/// Append the time elapsed since `start` to `latencies` and clear `start`.
///
/// Nothing is recorded when `start` is unset or the list already holds
/// [`LATENCY_COLLECTION_LIMIT`] samples.
pub fn record_latency(
    start: &mut Option<Instant>,
    latencies: &mut Vec<ProtoDuration>,
    latency_type: &str,
) {
    let Some(started) = *start else {
        error!("Unable to calculate {} latency: no start time", latency_type);
        return;
    };
    let elapsed = started.elapsed();
    let latency = match to_proto_duration(elapsed) {
        Ok(latency) => latency,
        Err(e) => {
            error!("Unable to calculate {} latency with status: {}", latency_type, e);
            return;
        }
    };
    if latencies.len() >= LATENCY_COLLECTION_LIMIT {
        error!(
            "Max {} latency collection limit reached, not adding latency: {:?}",
            latency_type, elapsed
        );
        return;
    }
    latencies.push(latency);
    *start = None;
}
