
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Offset in seconds between the unix epoch and the NTP epoch.
const NTP_UNIX_OFFSET: u64 = 0x83AA7E80;

/// FnTimeGen replaces SystemTime::now(), mostly for tests.
pub type FnTimeGen = Arc<dyn Fn() -> SystemTime + Sync + 'static + Send>;

/// Timebase turns the media clock of a session into the timestamp pair a
/// sender report carries.
pub trait Timebase: Send + Sync {
    /// convert returns the 64-bit NTP wallclock and the 32-bit RTP timestamp
    /// matching `timestamp`, a media timestamp relative to `timestamp_base`.
    fn convert(&self, timestamp_base: u64, timestamp: u32) -> (u64, u32);

    /// now is the wallclock this timebase reads.
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// SystemTimebase stamps reports with the wallclock and offsets the RTP
/// timestamp by the session's random base.
#[derive(Default, Clone)]
pub struct SystemTimebase {
    now: Option<FnTimeGen>,
}

impl SystemTimebase {
    pub fn new() -> Self {
        SystemTimebase::default()
    }

    /// with_now_fn sets an alternative for the time.Now function.
    pub fn with_now_fn(mut self, now: FnTimeGen) -> Self {
        self.now = Some(now);
        self
    }
}

impl Timebase for SystemTimebase {
    fn convert(&self, timestamp_base: u64, timestamp: u32) -> (u64, u32) {
        let ntp_time = unix2ntp(self.now());
        let rtp_time = (timestamp_base as u32).wrapping_add(timestamp);
        (ntp_time, rtp_time)
    }

    fn now(&self) -> SystemTime {
        if let Some(f) = &self.now {
            f()
        } else {
            SystemTime::now()
        }
    }
}

pub fn unix2ntp(st: SystemTime) -> u64 {
    let u = st
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos() as u64;
    let mut s = u / 1_000_000_000;
    s += NTP_UNIX_OFFSET;
    let mut f = u % 1_000_000_000;
    f <<= 32;
    f /= 1_000_000_000;
    s <<= 32;

    s | f
}

/// ntp_middle returns the middle 32 bits of an NTP timestamp, the compact
/// form used by the LSR field of reception reports.
pub fn ntp_middle(ntp_time: u64) -> u32 {
    (ntp_time >> 16) as u32
}

/// to_compact_ntp expresses a duration in 1/65536 seconds, saturating.
pub fn to_compact_ntp(d: Duration) -> u32 {
    let units = d.as_secs_f64() * 65536.0;
    if units >= u32::MAX as f64 {
        u32::MAX
    } else {
        units as u32
    }
}

/// from_compact_ntp is the inverse of to_compact_ntp.
pub fn from_compact_ntp(units: u32) -> Duration {
    Duration::from_secs_f64(units as f64 / 65536.0)
}
