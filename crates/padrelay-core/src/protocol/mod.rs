//! Wire protocol: `type`-tagged JSON objects, one per WebSocket text frame.

pub mod codec;
pub mod messages;

pub use codec::{decode_inbound, decode_outbound, encode_inbound, encode_outbound, ProtocolError};
pub use messages::{CombinedPacket, InboundMessage, OutboundMessage};
