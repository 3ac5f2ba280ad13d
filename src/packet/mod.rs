
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::{Error, Result};
use crate::goodbye::*;
use crate::header::*;
use crate::raw_packet::*;
use crate::receiver_report::*;
use crate::sender_report::*;
use crate::source_description::*;

/// Packet represents an RTCP packet, a protocol used for out-of-band statistics and
/// control information for an RTP session. The variant follows the packet type
/// in the common header; anything without a dedicated decoder is kept raw.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Packet {
    SenderReport(SenderReport),
    ReceiverReport(ReceiverReport),
    SourceDescription(SourceDescription),
    Goodbye(Goodbye),
    Raw(RawPacket),
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::SenderReport(p) => write!(f, "{p}"),
            Packet::ReceiverReport(p) => write!(f, "{p}"),
            Packet::SourceDescription(p) => write!(f, "{p}"),
            Packet::Goodbye(p) => write!(f, "{p}"),
            Packet::Raw(p) => write!(f, "{p}"),
        }
    }
}

impl Packet {
    /// Header returns the Header associated with this packet.
    pub fn header(&self) -> Header {
        match self {
            Packet::SenderReport(p) => p.header(),
            Packet::ReceiverReport(p) => p.header(),
            Packet::SourceDescription(p) => p.header(),
            Packet::Goodbye(p) => p.header(),
            Packet::Raw(p) => p.header(),
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        match self {
            Packet::SenderReport(p) => p.destination_ssrc(),
            Packet::ReceiverReport(p) => p.destination_ssrc(),
            Packet::SourceDescription(p) => p.destination_ssrc(),
            Packet::Goodbye(p) => p.destination_ssrc(),
            Packet::Raw(p) => p.destination_ssrc(),
        }
    }
}

impl From<SenderReport> for Packet {
    fn from(p: SenderReport) -> Self {
        Packet::SenderReport(p)
    }
}

impl From<ReceiverReport> for Packet {
    fn from(p: ReceiverReport) -> Self {
        Packet::ReceiverReport(p)
    }
}

impl From<SourceDescription> for Packet {
    fn from(p: SourceDescription) -> Self {
        Packet::SourceDescription(p)
    }
}

impl From<Goodbye> for Packet {
    fn from(p: Goodbye) -> Self {
        Packet::Goodbye(p)
    }
}

impl From<RawPacket> for Packet {
    fn from(p: RawPacket) -> Self {
        Packet::Raw(p)
    }
}

impl MarshalSize for Packet {
    fn marshal_size(&self) -> usize {
        match self {
            Packet::SenderReport(p) => p.marshal_size(),
            Packet::ReceiverReport(p) => p.marshal_size(),
            Packet::SourceDescription(p) => p.marshal_size(),
            Packet::Goodbye(p) => p.marshal_size(),
            Packet::Raw(p) => p.marshal_size(),
        }
    }
}

impl Marshal for Packet {
    fn marshal_to(&self, buf: &mut [u8]) -> std::result::Result<usize, util::Error> {
        match self {
            Packet::SenderReport(p) => p.marshal_to(buf),
            Packet::ReceiverReport(p) => p.marshal_to(buf),
            Packet::SourceDescription(p) => p.marshal_to(buf),
            Packet::Goodbye(p) => p.marshal_to(buf),
            Packet::Raw(p) => p.marshal_to(buf),
        }
    }
}

impl Unmarshal for Packet {
    fn unmarshal<B>(raw_packet: &mut B) -> std::result::Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        Ok(unmarshaller(raw_packet)?)
    }
}

/// encode serializes one packet; the length field is always recomputed from
/// the serialized size.
pub fn encode(packet: &Packet) -> Result<Bytes> {
    Ok(packet.marshal()?)
}

/// marshal takes an array of Packets and serializes them to a single buffer
pub fn marshal(packets: &[Packet]) -> Result<Bytes> {
    let mut out = BytesMut::new();
    for p in packets {
        let data = p.marshal()?;
        out.put(data);
    }
    Ok(out.freeze())
}

/// Unmarshal takes an entire udp datagram (which may consist of multiple RTCP packets) and
/// returns the unmarshaled packets it contains, in wire order.
pub fn unmarshal<B>(raw_data: &mut B) -> Result<Vec<Packet>>
where
    B: Buf,
{
    let mut packets = vec![];

    while raw_data.has_remaining() {
        let p = unmarshaller(raw_data)?;
        packets.push(p);
    }

    match packets.len() {
        // Empty Packet
        0 => Err(Error::EmptyCompound),

        // Multiple Packet
        _ => Ok(packets),
    }
}

/// decode_body decodes the sub-packet announced by `header` from `body`, the
/// bytes that follow the header on the wire. Bytes past the declared length
/// are left alone.
pub fn decode_body(header: &Header, body: &[u8]) -> Result<Packet> {
    let length = header.packet_size() - HEADER_LENGTH;
    if length > body.len() {
        return Err(Error::TruncatedBody);
    }

    let mut in_packet = header.marshal()?.chain(&body[..length]);
    decode_framed(header, &mut in_packet)
}

/// unmarshaller is a factory which pulls the first RTCP packet from a bytestream,
/// and returns it's parsed representation.
pub(crate) fn unmarshaller<B>(raw_data: &mut B) -> Result<Packet>
where
    B: Buf,
{
    if raw_data.remaining() < HEADER_LENGTH {
        return Err(Error::MalformedHeader);
    }

    // keep the header octets as received so unknown packet types survive intact
    let mut head = [0u8; HEADER_LENGTH];
    raw_data.copy_to_slice(&mut head);
    let h = decode_header(&head)?;

    let length = h.packet_size() - HEADER_LENGTH;
    if length > raw_data.remaining() {
        return Err(Error::TruncatedCompoundPacket);
    }

    let mut in_packet = (&head[..]).chain(raw_data.take(length));
    decode_framed(&h, &mut in_packet)
}

fn decode_framed<B>(h: &Header, in_packet: &mut B) -> Result<Packet>
where
    B: Buf,
{
    let p = match h.packet_type {
        PacketType::SenderReport => Packet::SenderReport(SenderReport::unmarshal(in_packet)?),
        PacketType::ReceiverReport => Packet::ReceiverReport(ReceiverReport::unmarshal(in_packet)?),
        PacketType::SourceDescription => {
            Packet::SourceDescription(SourceDescription::unmarshal(in_packet)?)
        }
        PacketType::Goodbye => Packet::Goodbye(Goodbye::unmarshal(in_packet)?),
        _ => Packet::Raw(RawPacket::unmarshal(in_packet)?),
    };

    Ok(p)
}
