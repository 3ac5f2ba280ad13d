
use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

/// PacketType specifies the type of an RTCP packet
/// RTCP packet types registered with IANA. See: https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-4
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    #[default]
    Unsupported = 0,
    SenderReport = 200,       // RFC 3550, 6.4.1
    ReceiverReport = 201,     // RFC 3550, 6.4.2
    SourceDescription = 202,  // RFC 3550, 6.5
    Goodbye = 203,            // RFC 3550, 6.6
    ApplicationDefined = 204, // RFC 3550, 6.7 (kept raw)
}

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PacketType::Unsupported => "Unsupported",
            PacketType::SenderReport => "SR",
            PacketType::ReceiverReport => "RR",
            PacketType::SourceDescription => "SDES",
            PacketType::Goodbye => "BYE",
            PacketType::ApplicationDefined => "APP",
        };
        write!(f, "{s}")
    }
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            200 => PacketType::SenderReport,
            201 => PacketType::ReceiverReport,
            202 => PacketType::SourceDescription,
            203 => PacketType::Goodbye,
            204 => PacketType::ApplicationDefined,
            _ => PacketType::Unsupported,
        }
    }
}

pub const RTP_VERSION: u8 = 2;
pub const VERSION_SHIFT: u8 = 6;
pub const VERSION_MASK: u8 = 0x3;
pub const PADDING_SHIFT: u8 = 5;
pub const PADDING_MASK: u8 = 0x1;
pub const COUNT_SHIFT: u8 = 0;
pub const COUNT_MASK: u8 = 0x1f;

pub const HEADER_LENGTH: usize = 4;
pub const COUNT_MAX: usize = (1 << 5) - 1;
pub const SSRC_LENGTH: usize = 4;
pub const SDES_MAX_OCTET_COUNT: usize = (1 << 8) - 1;

/// Bits of the first two header octets, read as a big-endian u16, that
/// the fast validity check looks at: version, padding and the high seven
/// bits of the packet type. The low type bit is left out so SR and RR
/// both pass.
pub const RTCP_VALID_MASK: u16 = ((VERSION_MASK as u16) << (8 + VERSION_SHIFT))
    | ((PADDING_MASK as u16) << (8 + PADDING_SHIFT))
    | 0x00fe;

/// What the masked leading bits of a compound packet must equal:
/// version 2, no padding, packet type SR (or RR).
pub const RTCP_VALID_VALUE: u16 =
    ((RTP_VERSION as u16) << (8 + VERSION_SHIFT)) | PacketType::SenderReport as u16;

/// A Header is the common header shared by all RTCP packets
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Header {
    /// If the padding bit is set, this individual RTCP packet contains
    /// some additional padding octets at the end which are not part of
    /// the control information but are included in the length field.
    pub padding: bool,
    /// The number of reception reports, sources contained or chunks in
    /// this packet (depending on the Type)
    pub count: u8,
    /// The RTCP packet type for this packet
    pub packet_type: PacketType,
    /// The length of this RTCP packet in 32-bit words minus one,
    /// including the header and any padding.
    pub length: u16,
}

impl Header {
    /// Total size on the wire, in octets, of the sub-packet this header
    /// announces.
    pub fn packet_size(&self) -> usize {
        (self.length as usize + 1) * 4
    }
}

/// validate is the fast-reject filter applied to the first header of a
/// compound packet before committing to a full parse.
pub fn validate(raw: &[u8]) -> bool {
    if raw.len() < 2 {
        return false;
    }
    let leading = u16::from_be_bytes([raw[0], raw[1]]);
    leading & RTCP_VALID_MASK == RTCP_VALID_VALUE
}

/// decode_header reads the common header from the start of `raw`.
pub fn decode_header(raw: &[u8]) -> Result<Header, Error> {
    let mut buf = raw;
    Header::unmarshal(&mut buf).map_err(Error::from)
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH
    }
}

impl Marshal for Header {
    /// marshal_to encodes the Header in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        if self.count as usize > COUNT_MAX {
            return Err(Error::InvalidHeader.into());
        }
        if buf.remaining_mut() < HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|    RC   |   PT=SR=200   |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let b0 = (RTP_VERSION << VERSION_SHIFT)
            | ((self.padding as u8) << PADDING_SHIFT)
            | (self.count << COUNT_SHIFT);

        buf.put_u8(b0);
        buf.put_u8(self.packet_type as u8);
        buf.put_u16(self.length);

        Ok(HEADER_LENGTH)
    }
}

impl Unmarshal for Header {
    /// unmarshal decodes the Header from binary
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::MalformedHeader.into());
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|    RC   |      PT       |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let b0 = raw_packet.get_u8();
        let version = (b0 >> VERSION_SHIFT) & VERSION_MASK;
        if version != RTP_VERSION {
            return Err(Error::MalformedHeader.into());
        }

        let padding = ((b0 >> PADDING_SHIFT) & PADDING_MASK) > 0;
        let count = (b0 >> COUNT_SHIFT) & COUNT_MASK;
        let packet_type = PacketType::from(raw_packet.get_u8());
        let length = raw_packet.get_u16();

        Ok(Header {
            padding,
            count,
            packet_type,
            length,
        })
    }
}

/// take_body consumes the body announced by `header` from `raw_packet`,
/// which must be positioned right after the header, and strips any
/// padding octets. Nothing past the declared length is read.
pub(crate) fn take_body<B>(header: &Header, raw_packet: &mut B) -> Result<Bytes, Error>
where
    B: Buf,
{
    let body_len = header.packet_size() - HEADER_LENGTH;
    if raw_packet.remaining() < body_len {
        return Err(Error::TruncatedBody);
    }

    let mut body = raw_packet.copy_to_bytes(body_len);
    if header.padding {
        // the last padding octet counts how many octets to ignore, itself included
        let padding_len = body.last().copied().unwrap_or(0) as usize;
        if padding_len == 0 || padding_len > body.len() {
            return Err(Error::WrongPadding);
        }
        body.truncate(body.len() - padding_len);
    }

    Ok(body)
}
