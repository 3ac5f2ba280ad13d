
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::reception_report::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// ReceiverReport is sent by a participant that is not sending media itself.
/// It carries one block per source heard since the previous report.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ReceiverReport {
    /// Source sending this report.
    pub ssrc: u32,
    pub reports: Vec<ReceptionReport>,
    /// Profile-specific data after the last block, kept verbatim.
    pub profile_extensions: Bytes,
}

impl fmt::Display for ReceiverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ReceiverReport from {:x}", self.ssrc)?;
        for rep in &self.reports {
            writeln!(
                f,
                "\tblock {:x}: lost {}/{}, highest seq {}, jitter {}",
                rep.ssrc, rep.fraction_lost, rep.total_lost, rep.last_sequence_number, rep.jitter
            )?;
        }
        if !self.profile_extensions.is_empty() {
            writeln!(f, "\textensions: {:?}", self.profile_extensions)?;
        }
        Ok(())
    }
}

impl ReceiverReport {
    /// header is the common header this report is written with.
    pub fn header(&self) -> Header {
        Header {
            padding: get_padding_size(self.raw_size()) != 0,
            count: self.reports.len() as u8,
            packet_type: PacketType::ReceiverReport,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc lists the sources the blocks talk about.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|r| r.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + SSRC_LENGTH + reports_size(&self.reports) + self.profile_extensions.len()
    }
}

impl MarshalSize for ReceiverReport {
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        l + get_padding_size(l)
    }
}

impl Marshal for ReceiverReport {
    /// marshal_to writes header, sender SSRC, blocks and extensions; the
    /// padding bit is set when the extensions leave the packet unaligned.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports.into());
        }
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        // |V=2|P|  RC  | PT=201 | length | SSRC | RC x 24-octet blocks | ext |
        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc);
        let n = marshal_reports(&self.reports, buf)?;
        buf = &mut buf[n..];
        buf.put(self.profile_extensions.clone());

        if h.padding {
            put_padding(buf, self.raw_size());
        }

        Ok(self.marshal_size())
    }
}

impl Unmarshal for ReceiverReport {
    /// unmarshal reads one RR; anything after the blocks inside the declared
    /// length becomes profile_extensions.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::ReceiverReport {
            return Err(Error::WrongType.into());
        }

        let body = &mut take_body(&header, raw_packet)?;
        if body.remaining() < SSRC_LENGTH {
            return Err(Error::TruncatedBody.into());
        }

        let ssrc = body.get_u32();
        let reports = unmarshal_reports(body, header.count)?;

        Ok(ReceiverReport {
            ssrc,
            reports,
            profile_extensions: body.copy_to_bytes(body.remaining()),
        })
    }
}
