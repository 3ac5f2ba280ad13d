use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Header is shorter than four octets or carries the wrong version.
    #[error("Malformed RTCP header")]
    MalformedHeader,
    /// A report block, SDES item, reason or declared length runs past
    /// the bytes that are actually available.
    #[error("Truncated RTCP packet body")]
    TruncatedBody,
    /// A compound buffer ends in the middle of a sub-packet.
    #[error("Truncated compound RTCP packet")]
    TruncatedCompoundPacket,
    /// Packet contains empty compound.
    #[error("Empty compound packet")]
    EmptyCompound,
    /// Packet contains an invalid header.
    #[error("Invalid header")]
    InvalidHeader,
    /// Packet lost exceeds maximum amount of packets
    /// that can possibly be lost.
    #[error("Invalid total lost count")]
    InvalidTotalLost,
    /// Too many reports.
    #[error("Too many reports")]
    TooManyReports,
    /// Too many chunks.
    #[error("Too many chunks")]
    TooManyChunks,
    /// Too many sources.
    #[error("too many sources")]
    TooManySources,
    /// Buffer is too short.
    #[error("Buffer too short to be written")]
    BufferTooShort,
    /// Wrong packet type.
    #[error("Wrong packet type")]
    WrongType,
    /// SDES received is too long.
    #[error("SDES must be < 255 octets long")]
    SdesTextTooLong,
    /// SDES type is missing.
    #[error("SDES item missing type")]
    SdesMissingType,
    /// Reason is too long.
    #[error("Reason must be < 255 octets long")]
    ReasonTooLong,
    /// Invalid padding value.
    #[error("Invalid padding value")]
    WrongPadding,
    /// A source description was requested but the session has no CNAME.
    #[error("Session has no CNAME")]
    NoCname,

    #[error("{0}")]
    Util(util::Error),

    #[error("{0}")]
    Other(String),
}

impl From<Error> for util::Error {
    fn from(e: Error) -> Self {
        util::Error::from_std(e)
    }
}

impl From<util::Error> for Error {
    fn from(e: util::Error) -> Self {
        // codec errors travel through the marshal traits boxed inside util::Error
        match e {
            util::Error::Std(std_err) => match std_err.0.downcast::<Error>() {
                Ok(err) => *err,
                Err(other) => Error::Other(other.to_string()),
            },
            e => Error::Util(e),
        }
    }
}

impl PartialEq<util::Error> for Error {
    fn eq(&self, other: &util::Error) -> bool {
        if let Some(down) = other.downcast_ref::<Error>() {
            return self == down;
        }
        false
    }
}
