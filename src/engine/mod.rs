
use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use util::sync::Mutex;

use crate::error::{Error, Result};
use crate::goodbye::Goodbye;
use crate::header::{decode_header, validate, HEADER_LENGTH};
use crate::packet::{self, Packet};
use crate::queue::CtrlPacketQueue;
use crate::raw_packet::RawPacket;
use crate::receiver_report::ReceiverReport;
use crate::sender_report::SenderReport;
use crate::source_description::{SdesType, SourceDescription};
use crate::stats::{PeerStats, SessionStats};
use crate::timebase::*;

/// Default number of finished packets the queue holds before dropping.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Session is the narrow view the engine has of the session that owns it.
pub trait Session: Send + Sync {
    /// local_ssrc is the source this session sends as.
    fn local_ssrc(&self) -> u32;
    /// remote_ssrc is the peer's source, 0 while unknown.
    fn remote_ssrc(&self) -> u32;
    /// cname is the canonical name advertised in source descriptions.
    fn cname(&self) -> Option<Bytes> {
        None
    }
    /// on_goodbye is called once per BYE received from the peer.
    fn on_goodbye(&self, sources: &[u32], reason: &Bytes);
}

/// EngineBuilder can be used to configure an RtcpEngine.
#[derive(Default)]
pub struct EngineBuilder {
    queue_capacity: Option<usize>,
    timestamp_base: u64,
    initial_sequence: u16,
    sdes: Option<bool>,
    validate_compound: Option<bool>,
    timebase: Option<Arc<dyn Timebase>>,
    now: Option<FnTimeGen>,
}

impl EngineBuilder {
    /// with_queue_capacity bounds the outbound queue, 0 for no bound.
    pub fn with_queue_capacity(mut self, capacity: usize) -> EngineBuilder {
        self.queue_capacity = Some(capacity);
        self
    }

    /// with_timestamp_base sets the anchor RTP timestamps are offset by.
    pub fn with_timestamp_base(mut self, timestamp_base: u64) -> EngineBuilder {
        self.timestamp_base = timestamp_base;
        self
    }

    /// with_initial_sequence sets the sequence number counted from.
    pub fn with_initial_sequence(mut self, sequence: u16) -> EngineBuilder {
        self.initial_sequence = sequence;
        self
    }

    /// with_sdes controls whether build_packet bundles a CNAME description.
    pub fn with_sdes(mut self, enabled: bool) -> EngineBuilder {
        self.sdes = Some(enabled);
        self
    }

    /// with_compound_validation controls the fast validity check on the
    /// first header of every inbound compound packet.
    pub fn with_compound_validation(mut self, enabled: bool) -> EngineBuilder {
        self.validate_compound = Some(enabled);
        self
    }

    /// with_timebase replaces the wallclock timebase used for sender reports.
    pub fn with_timebase(mut self, timebase: Arc<dyn Timebase>) -> EngineBuilder {
        self.timebase = Some(timebase);
        self
    }

    /// with_now_fn sets an alternative for the time.Now function.
    pub fn with_now_fn(mut self, now: FnTimeGen) -> EngineBuilder {
        self.now = Some(now);
        self
    }

    pub fn build(self, session: Arc<dyn Session>) -> RtcpEngine {
        let timebase: Arc<dyn Timebase> = match self.timebase {
            Some(timebase) => timebase,
            None => {
                let mut timebase = SystemTimebase::new();
                if let Some(now) = &self.now {
                    timebase = timebase.with_now_fn(Arc::clone(now));
                }
                Arc::new(timebase)
            }
        };

        RtcpEngine {
            session,
            timebase,
            now: self.now,
            sdes: self.sdes.unwrap_or(true),
            validate_compound: self.validate_compound.unwrap_or(true),
            stats: Mutex::new(SessionStats::new(self.timestamp_base, self.initial_sequence)),
            peer: Mutex::new(PeerStats::default()),
            queue: CtrlPacketQueue::new(self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)),
        }
    }
}

/// RtcpEngine builds the control packets that accompany one outbound RTP
/// stream and digests the ones the peer sends back. It is shared between
/// the media path, the transmit path and the network reader.
pub struct RtcpEngine {
    session: Arc<dyn Session>,
    timebase: Arc<dyn Timebase>,
    now: Option<FnTimeGen>,
    sdes: bool,
    validate_compound: bool,

    stats: Mutex<SessionStats>,
    peer: Mutex<PeerStats>,
    queue: CtrlPacketQueue,
}

impl RtcpEngine {
    /// builder returns a new EngineBuilder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn now(&self) -> SystemTime {
        if let Some(f) = &self.now {
            f()
        } else {
            self.timebase.now()
        }
    }

    /// stats returns a snapshot of the send counters.
    pub fn stats(&self) -> SessionStats {
        self.stats.lock().clone()
    }

    /// peer_stats returns a snapshot of what is known about the peer.
    pub fn peer_stats(&self) -> PeerStats {
        self.peer.lock().clone()
    }

    /// queue is the outbound queue the transmit path drains.
    pub fn queue(&self) -> &CtrlPacketQueue {
        &self.queue
    }

    /// drain removes every finished packet, oldest first.
    pub fn drain(&self) -> Vec<Bytes> {
        self.queue.drain_all()
    }

    /// build_packet accounts for one media payload of `size` octets and
    /// emits a sender report, bundled with a CNAME description when one is
    /// known and with a BYE when `last` marks the end of the stream. The
    /// payload itself is neither kept nor forwarded.
    pub fn build_packet(
        &self,
        _data: &[u8],
        size: usize,
        timestamp: u32,
        last: bool,
    ) -> Result<Bytes> {
        let ssrc = self.session.local_ssrc();

        // held until the packet is queued, so reports drain in the order
        // their counters were taken
        let mut stats = self.stats.lock();
        stats.accumulate(size, timestamp);
        let sr = stats.build_sender_report(ssrc, self.timebase.as_ref());

        let mut packets = vec![Packet::SenderReport(sr)];
        if self.sdes {
            if let Some(cname) = self.session.cname() {
                packets.push(SourceDescription::cname(ssrc, cname).into());
            }
        }
        if last {
            packets.push(
                Goodbye {
                    sources: vec![ssrc],
                    reason: Bytes::new(),
                }
                .into(),
            );
        }

        self.emit(&packets)
    }

    /// build_receiver_report emits a receiver report with one block about
    /// the peer's stream.
    pub fn build_receiver_report(&self) -> Result<Bytes> {
        let remote = self.session.remote_ssrc();
        let reports = if remote != 0 {
            vec![self.peer.lock().reception_report(remote, self.now())]
        } else {
            vec![]
        };

        let rr = ReceiverReport {
            ssrc: self.session.local_ssrc(),
            reports,
            ..Default::default()
        };
        self.emit(&[rr.into()])
    }

    /// build_source_description emits the CNAME description of the local source.
    pub fn build_source_description(&self) -> Result<Bytes> {
        let cname = self.session.cname().ok_or(Error::NoCname)?;
        let sdes = SourceDescription::cname(self.session.local_ssrc(), cname);
        self.emit(&[sdes.into()])
    }

    /// build_goodbye emits a BYE for the local source.
    pub fn build_goodbye(&self, reason: Bytes) -> Result<Bytes> {
        let bye = Goodbye {
            sources: vec![self.session.local_ssrc()],
            reason,
        };
        self.emit(&[bye.into()])
    }

    fn emit(&self, packets: &[Packet]) -> Result<Bytes> {
        let data = packet::marshal(packets)?;
        if !self.queue.enqueue(data.clone()) {
            log::warn!(
                "ctrl packet queue full ({}), dropping {} bytes",
                self.queue.capacity(),
                data.len()
            );
        }
        Ok(data)
    }

    /// recv_packets processes a compound packet, sub-packet by sub-packet in
    /// wire order, and returns how many were handled. A sub-packet that fails
    /// to decode is skipped; effects of the ones before it stay applied and
    /// the first error is returned once the walk ends. The walk stops early
    /// when a header is unreadable or claims more bytes than are left.
    pub fn recv_packets(&self, buffer: &[u8]) -> Result<usize> {
        if buffer.is_empty() {
            return Err(Error::EmptyCompound);
        }

        if self.validate_compound && !validate(buffer) {
            log::debug!("rejecting compound packet, leading header fails the validity mask");
            return Err(Error::MalformedHeader);
        }

        let mut offset = 0;
        let mut processed = 0;
        let mut first_err = None;
        while offset < buffer.len() {
            let rest = &buffer[offset..];
            if rest.len() < HEADER_LENGTH {
                log::debug!("{} stray bytes after the last packet", rest.len());
                first_err.get_or_insert(Error::TruncatedCompoundPacket);
                break;
            }

            let header = match decode_header(rest) {
                Ok(header) => header,
                Err(err) => {
                    log::debug!("bad header at offset {offset}: {err}");
                    first_err.get_or_insert(err);
                    break;
                }
            };

            let size = header.packet_size();
            if size > rest.len() {
                log::debug!(
                    "{} at offset {offset} claims {size} bytes, {} left",
                    header.packet_type,
                    rest.len()
                );
                first_err.get_or_insert(Error::TruncatedCompoundPacket);
                break;
            }

            match self.recv_packet(&rest[..size]) {
                Ok(()) => processed += 1,
                Err(err) => {
                    log::debug!("dropping {} at offset {offset}: {err}", header.packet_type);
                    first_err.get_or_insert(err);
                }
            }

            offset += size;
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(processed),
        }
    }

    /// recv_packet decodes one sub-packet and hands it to its handler.
    pub fn recv_packet(&self, packet: &[u8]) -> Result<()> {
        let header = decode_header(packet)?;
        if header.packet_size() > packet.len() {
            return Err(Error::TruncatedBody);
        }

        let mut buf = &packet[..header.packet_size()];
        match packet::unmarshaller(&mut buf)? {
            Packet::SenderReport(sr) => self.handle_sender_report(&sr),
            Packet::ReceiverReport(rr) => self.handle_receiver_report(&rr),
            Packet::SourceDescription(sdes) => self.handle_source_description(&sdes),
            Packet::Goodbye(bye) => self.handle_goodbye(&bye),
            Packet::Raw(raw) => self.handle_raw(&raw),
        }

        Ok(())
    }

    fn handle_sender_report(&self, sr: &SenderReport) {
        let now = self.now();
        let remote = self.session.remote_ssrc();
        let local = self.session.local_ssrc();

        let mut peer = self.peer.lock();
        if remote == 0 || sr.ssrc == remote {
            peer.process_sender_report(now, sr);
        } else {
            log::trace!("sender report from unexpected source {:x}", sr.ssrc);
        }

        let now_ntp = unix2ntp(now);
        for report in sr.reports.iter().filter(|r| r.ssrc == local) {
            peer.process_reception_report(now_ntp, report);
        }
    }

    fn handle_receiver_report(&self, rr: &ReceiverReport) {
        let now_ntp = unix2ntp(self.now());
        let local = self.session.local_ssrc();

        let mut peer = self.peer.lock();
        peer.receiver_reports_received += 1;
        for report in rr.reports.iter().filter(|r| r.ssrc == local) {
            peer.process_reception_report(now_ntp, report);
        }
    }

    fn handle_source_description(&self, sdes: &SourceDescription) {
        let remote = self.session.remote_ssrc();

        let mut peer = self.peer.lock();
        for chunk in &sdes.chunks {
            if remote != 0 && chunk.source != remote {
                continue;
            }
            for item in &chunk.items {
                if let SdesType::Unknown(t) = item.sdes_type {
                    log::trace!("skipping SDES item of unknown type {t}");
                }
            }
            peer.process_source_description(chunk);
        }
    }

    fn handle_goodbye(&self, bye: &Goodbye) {
        {
            let mut peer = self.peer.lock();
            peer.goodbye_received = true;
        }
        log::debug!("peer said goodbye for {:?}", bye.sources);
        self.session.on_goodbye(&bye.sources, &bye.reason);
    }

    fn handle_raw(&self, raw: &RawPacket) {
        log::trace!(
            "ignoring RTCP packet type {} ({} bytes)",
            raw.packet_type_octet(),
            raw.0.len().saturating_sub(HEADER_LENGTH)
        );
    }
}
