#![warn(rust_2018_idioms)]

//! RTCP control channel of an RTP media streamer: the codec for the RFC 3550
//! control packets, the send/receive statistics behind sender and receiver
//! reports, the outbound packet queue and the engine tying them together.

pub mod engine;
pub mod error;
pub mod goodbye;
pub mod header;
pub mod packet;
pub mod queue;
pub mod raw_packet;
pub mod receiver_report;
pub mod reception_report;
pub mod sender_report;
pub mod source_description;
pub mod stats;
pub mod timebase;
mod util;

pub use engine::{EngineBuilder, RtcpEngine, Session};
pub use error::{Error, Result};
