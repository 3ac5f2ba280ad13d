
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

const SDES_SOURCE_LEN: usize = 4;
const SDES_TYPE_LEN: usize = 1;
const SDES_OCTET_COUNT_LEN: usize = 1;

/// SdesType is the item type used in the RTCP SDES control packet.
/// RTP SDES item types registered with IANA. See: https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-5
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SdesType {
    #[default]
    End, // end of SDES list                RFC 3550, 6.5
    Cname,    // canonical name                  RFC 3550, 6.5.1
    Name,     // user name                       RFC 3550, 6.5.2
    Email,    // user's electronic mail address  RFC 3550, 6.5.3
    Phone,    // user's phone number             RFC 3550, 6.5.4
    Location, // geographic user location        RFC 3550, 6.5.5
    Tool,     // name of application or tool     RFC 3550, 6.5.6
    Note,     // notice about the source         RFC 3550, 6.5.7
    Private,  // private extensions              RFC 3550, 6.5.8
    /// Any other item type, carried through untouched.
    Unknown(u8),
}

impl fmt::Display for SdesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SdesType::End => "END",
            SdesType::Cname => "CNAME",
            SdesType::Name => "NAME",
            SdesType::Email => "EMAIL",
            SdesType::Phone => "PHONE",
            SdesType::Location => "LOC",
            SdesType::Tool => "TOOL",
            SdesType::Note => "NOTE",
            SdesType::Private => "PRIV",
            SdesType::Unknown(b) => return write!(f, "UNKNOWN({b})"),
        };
        write!(f, "{s}")
    }
}

impl From<u8> for SdesType {
    fn from(b: u8) -> Self {
        match b {
            0 => SdesType::End,
            1 => SdesType::Cname,
            2 => SdesType::Name,
            3 => SdesType::Email,
            4 => SdesType::Phone,
            5 => SdesType::Location,
            6 => SdesType::Tool,
            7 => SdesType::Note,
            8 => SdesType::Private,
            b => SdesType::Unknown(b),
        }
    }
}

impl From<SdesType> for u8 {
    fn from(t: SdesType) -> Self {
        match t {
            SdesType::End => 0,
            SdesType::Cname => 1,
            SdesType::Name => 2,
            SdesType::Email => 3,
            SdesType::Phone => 4,
            SdesType::Location => 5,
            SdesType::Tool => 6,
            SdesType::Note => 7,
            SdesType::Private => 8,
            SdesType::Unknown(b) => b,
        }
    }
}

/// A SourceDescriptionChunk contains items describing a single RTP source
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SourceDescriptionChunk {
    /// The source (ssrc) or contributing source (csrc) identifier this packet describes
    pub source: u32,
    pub items: Vec<SourceDescriptionItem>,
}

impl SourceDescriptionChunk {
    fn raw_size(&self) -> usize {
        let items_len: usize = self.items.iter().map(|it| it.marshal_size()).sum();
        // trailing END octet
        SDES_SOURCE_LEN + items_len + SDES_TYPE_LEN
    }

    /// item returns the text of the first item of the given type.
    pub fn item(&self, sdes_type: SdesType) -> Option<&Bytes> {
        self.items
            .iter()
            .find(|it| it.sdes_type == sdes_type)
            .map(|it| &it.text)
    }
}

impl MarshalSize for SourceDescriptionChunk {
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        // align to 32-bit boundary
        l + get_padding_size(l)
    }
}

impl Marshal for SourceDescriptionChunk {
    /// Marshal encodes the SourceDescriptionChunk in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }
        /*
         *  +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         *  |                          SSRC/CSRC_1                          |
         *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *  |                           SDES items                          |
         *  |                              ...                              |
         *  +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         */

        buf.put_u32(self.source);

        for it in &self.items {
            let n = it.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        // The list of items in each chunk MUST be terminated by one or more null octets
        buf.put_u8(SdesType::End.into());

        // additional null octets MUST be included if needed to pad until the next 32-bit boundary
        put_zero_padding(buf, self.raw_size());
        Ok(self.marshal_size())
    }
}

impl Unmarshal for SourceDescriptionChunk {
    /// Unmarshal decodes one chunk. The item list ends at an END octet or
    /// where the buffer runs out, whichever comes first.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < SDES_SOURCE_LEN {
            return Err(Error::TruncatedBody.into());
        }

        let source = raw_packet.get_u32();

        let mut offset = SDES_SOURCE_LEN;
        let mut items = vec![];
        while raw_packet.has_remaining() {
            let sdes_type = SdesType::from(raw_packet.get_u8());
            if sdes_type == SdesType::End {
                let padding_len = get_padding_size(offset + SDES_TYPE_LEN);
                raw_packet.advance(padding_len.min(raw_packet.remaining()));
                break;
            }

            if !raw_packet.has_remaining() {
                return Err(Error::TruncatedBody.into());
            }
            let octet_count = raw_packet.get_u8() as usize;
            if raw_packet.remaining() < octet_count {
                return Err(Error::TruncatedBody.into());
            }

            let text = raw_packet.copy_to_bytes(octet_count);
            offset += SDES_TYPE_LEN + SDES_OCTET_COUNT_LEN + octet_count;
            items.push(SourceDescriptionItem { sdes_type, text });
        }

        Ok(SourceDescriptionChunk { source, items })
    }
}

/// A SourceDescriptionItem is a part of a SourceDescription that describes a stream.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SourceDescriptionItem {
    /// The type identifier for this item. eg, Cname for canonical name description.
    ///
    /// Type zero or End is interpreted as the end of an item list and cannot be used.
    pub sdes_type: SdesType,
    /// Raw text associated with the item, not NUL-terminated. Its meaning
    /// varies based on the item's type.
    pub text: Bytes,
}

impl MarshalSize for SourceDescriptionItem {
    fn marshal_size(&self) -> usize {
        SDES_TYPE_LEN + SDES_OCTET_COUNT_LEN + self.text.len()
    }
}

impl Marshal for SourceDescriptionItem {
    /// Marshal encodes the SourceDescriptionItem in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *   0                   1                   2                   3
         *   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *  |    CNAME=1    |     length    | user and domain name        ...
         *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let type_octet: u8 = self.sdes_type.into();
        if type_octet == 0 {
            return Err(Error::SdesMissingType.into());
        }

        if self.text.len() > SDES_MAX_OCTET_COUNT {
            return Err(Error::SdesTextTooLong.into());
        }

        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u8(type_octet);
        buf.put_u8(self.text.len() as u8);
        buf.put(self.text.clone());

        //no padding for each SourceDescriptionItem
        Ok(self.marshal_size())
    }
}

/// A SourceDescription (SDES) packet describes the sources in an RTP stream.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct SourceDescription {
    pub chunks: Vec<SourceDescriptionChunk>,
}

impl fmt::Display for SourceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "Source Description:\n".to_string();
        for c in &self.chunks {
            out += format!("\t{:x}\n", c.source).as_str();
            for it in &c.items {
                out += format!("\t\t{}: {:?}\n", it.sdes_type, it.text).as_str();
            }
        }
        write!(f, "{out}")
    }
}

impl SourceDescription {
    /// cname builds a one-chunk SDES carrying only a CNAME item.
    pub fn cname(source: u32, cname: Bytes) -> Self {
        SourceDescription {
            chunks: vec![SourceDescriptionChunk {
                source,
                items: vec![SourceDescriptionItem {
                    sdes_type: SdesType::Cname,
                    text: cname,
                }],
            }],
        }
    }

    /// Header returns the Header associated with this packet.
    pub fn header(&self) -> Header {
        Header {
            padding: false,
            count: self.chunks.len() as u8,
            packet_type: PacketType::SourceDescription,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.chunks.iter().map(|x| x.source).collect()
    }
}

impl MarshalSize for SourceDescription {
    fn marshal_size(&self) -> usize {
        // chunks are already 32-bit aligned
        let chunks_length: usize = self.chunks.iter().map(|c| c.marshal_size()).sum();
        HEADER_LENGTH + chunks_length
    }
}

impl Marshal for SourceDescription {
    /// Marshal encodes the SourceDescription in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.chunks.len() > COUNT_MAX {
            return Err(Error::TooManyChunks.into());
        }

        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        /*
         *         0                   1                   2                   3
         *         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * header |V=2|P|    SC   |  PT=SDES=202  |             length            |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * chunk  |                          SSRC/CSRC_1                          |
         *   1    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                           SDES items                          |
         *        |                              ...                              |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * chunk  |                          SSRC/CSRC_2                          |
         *   2    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                           SDES items                          |
         *        |                              ...                              |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         */

        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        for c in &self.chunks {
            let n = c.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        Ok(self.marshal_size())
    }
}

impl Unmarshal for SourceDescription {
    /// Unmarshal decodes the SourceDescription from binary
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let h = Header::unmarshal(raw_packet)?;
        if h.packet_type != PacketType::SourceDescription {
            return Err(Error::WrongType.into());
        }

        let body = &mut take_body(&h, raw_packet)?;

        let mut chunks = Vec::with_capacity(h.count as usize);
        for _ in 0..h.count {
            chunks.push(SourceDescriptionChunk::unmarshal(body)?);
        }

        Ok(SourceDescription { chunks })
    }
}
