
use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::reception_report::ReceptionReport;
use crate::sender_report::SenderReport;
use crate::source_description::{SdesType, SourceDescriptionChunk};
use crate::timebase::*;

/// SessionStats holds the send-side counters of one session. They are
/// cumulative for the lifetime of the session and only the send path
/// mutates them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Random anchor the RTP timestamps of this session are offset by.
    pub timestamp_base: u64,
    pub packets_sent: u32,
    /// Payload octets sent, modulo 2^32.
    pub octets_sent: u32,
    pub last_sequence_sent: u16,
    /// Media timestamp of the most recent payload.
    pub last_timestamp: u32,
}

impl SessionStats {
    /// new starts the counters; `initial_sequence` is taken as already
    /// used, so the first payload gets the one after it.
    pub fn new(timestamp_base: u64, initial_sequence: u16) -> Self {
        SessionStats {
            timestamp_base,
            last_sequence_sent: initial_sequence,
            ..Default::default()
        }
    }

    /// accumulate accounts for one outbound media payload.
    pub fn accumulate(&mut self, payload_size: usize, timestamp: u32) {
        self.packets_sent = self.packets_sent.wrapping_add(1);
        self.octets_sent = self.octets_sent.wrapping_add(payload_size as u32);
        self.last_sequence_sent = self.last_sequence_sent.wrapping_add(1);
        self.last_timestamp = timestamp;
    }

    /// build_sender_report snapshots the counters. Nothing is reset.
    pub fn build_sender_report(&self, ssrc: u32, timebase: &dyn Timebase) -> SenderReport {
        let (ntp_time, rtp_time) = timebase.convert(self.timestamp_base, self.last_timestamp);
        SenderReport {
            ssrc,
            ntp_time,
            rtp_time,
            packet_count: self.packets_sent,
            octet_count: self.octets_sent,
            ..Default::default()
        }
    }
}

/// PeerStats is what the inbound side has learned about the remote peer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PeerStats {
    /// Middle 32 bits of the NTP time in the peer's last sender report.
    pub last_sender_report: u32,
    pub last_sender_report_time: Option<SystemTime>,
    pub remote_packet_count: u32,
    pub remote_octet_count: u32,
    /// Loss and jitter the peer reports about our stream.
    pub fraction_lost: u8,
    pub total_lost: i32,
    pub jitter: u32,
    pub round_trip_time: Option<Duration>,
    pub cname: Option<Bytes>,
    /// Known items of the latest description of the peer.
    pub items: Vec<(SdesType, Bytes)>,
    pub goodbye_received: bool,
    pub sender_reports_received: u64,
    pub receiver_reports_received: u64,
}

impl PeerStats {
    pub(crate) fn process_sender_report(&mut self, now: SystemTime, sr: &SenderReport) {
        self.last_sender_report = ntp_middle(sr.ntp_time);
        self.last_sender_report_time = Some(now);
        self.remote_packet_count = sr.packet_count;
        self.remote_octet_count = sr.octet_count;
        self.sender_reports_received += 1;
    }

    /// process_reception_report takes a block the peer sent about our
    /// stream. `now` is the arrival time as an NTP timestamp.
    pub(crate) fn process_reception_report(&mut self, now: u64, report: &ReceptionReport) {
        self.fraction_lost = report.fraction_lost;
        self.total_lost = report.total_lost;
        self.jitter = report.jitter;

        // https://tools.ietf.org/html/rfc3550#section-6.4.1
        if report.last_sender_report != 0 {
            let rtt = ntp_middle(now)
                .wrapping_sub(report.last_sender_report)
                .wrapping_sub(report.delay);
            // a negative result means the clocks disagree, keep the previous estimate
            if rtt <= i32::MAX as u32 {
                self.round_trip_time = Some(from_compact_ntp(rtt));
            }
        }
    }

    pub(crate) fn process_source_description(&mut self, chunk: &SourceDescriptionChunk) {
        self.items = chunk
            .items
            .iter()
            .filter(|it| !matches!(it.sdes_type, SdesType::Unknown(_)))
            .map(|it| (it.sdes_type, it.text.clone()))
            .collect();

        if let Some(cname) = chunk.item(SdesType::Cname) {
            self.cname = Some(cname.clone());
        }
    }

    /// delay_since_last_sender_report is the DLSR field for a report sent
    /// at `now`, zero when no sender report has arrived yet.
    pub fn delay_since_last_sender_report(&self, now: SystemTime) -> u32 {
        match self.last_sender_report_time {
            Some(t) => match now.duration_since(t) {
                Ok(d) => to_compact_ntp(d),
                Err(_) => 0,
            },
            None => 0,
        }
    }

    /// reception_report builds the block describing `ssrc` for an outbound
    /// receiver report. Only the sender report timing is known here.
    pub fn reception_report(&self, ssrc: u32, now: SystemTime) -> ReceptionReport {
        ReceptionReport {
            ssrc,
            last_sender_report: self.last_sender_report,
            delay: self.delay_since_last_sender_report(now),
            ..Default::default()
        }
    }
}
