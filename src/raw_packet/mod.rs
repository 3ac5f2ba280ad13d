#[cfg(test)]
mod raw_packet_test;

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;

type Result<T> = std::result::Result<T, util::Error>;

/// RawPacket represents an unparsed RTCP packet, header included. It's returned
/// by Unmarshal when a packet with an unknown type is encountered.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct RawPacket(pub Bytes);

impl fmt::Display for RawPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawPacket: {:?}", self.0)
    }
}

impl RawPacket {
    /// Header returns the Header associated with this packet.
    pub fn header(&self) -> Header {
        match Header::unmarshal(&mut self.0.clone()) {
            Ok(h) => h,
            Err(_) => Header::default(),
        }
    }

    /// packet_type_octet is the type as it appeared on the wire, which
    /// Header folds into Unsupported when it is not a known type.
    pub fn packet_type_octet(&self) -> u8 {
        self.0.get(1).copied().unwrap_or(0)
    }

    /// body returns everything after the common header, padding included.
    pub fn body(&self) -> Bytes {
        if self.0.len() < HEADER_LENGTH {
            return Bytes::new();
        }
        self.0.slice(HEADER_LENGTH..)
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }
}

impl MarshalSize for RawPacket {
    fn marshal_size(&self) -> usize {
        self.0.len()
    }
}

impl Marshal for RawPacket {
    /// Marshal encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        // the stored bytes must describe their own length
        let h = Header::unmarshal(&mut self.0.clone())?;
        if h.packet_size() != self.0.len() {
            return Err(Error::InvalidHeader.into());
        }

        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        buf.put(self.0.clone());

        Ok(self.marshal_size())
    }
}

impl Unmarshal for RawPacket {
    /// Unmarshal decodes the packet from binary.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::MalformedHeader.into());
        }

        let mut head = [0u8; HEADER_LENGTH];
        raw_packet.copy_to_slice(&mut head);
        let h = Header::unmarshal(&mut &head[..])?;

        let body_len = h.packet_size() - HEADER_LENGTH;
        if raw_packet.remaining() < body_len {
            return Err(Error::TruncatedBody.into());
        }

        let mut raw = BytesMut::with_capacity(h.packet_size());
        raw.extend_from_slice(&head);
        raw.extend_from_slice(&raw_packet.copy_to_bytes(body_len));

        Ok(RawPacket(raw.freeze()))
    }
}
