//! RF Channel Pipeline (C3).

pub mod channel;
pub mod packet;

pub use channel::{Direction, RfChannel};
pub use packet::{Packet, PacketKind};
