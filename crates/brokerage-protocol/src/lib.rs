//! brokerage-protocol
//!
//! Wire-level encoding/decoding for the brokerage harness.
//!
//! - [`wire_types`]    : fixed message sizes and field widths
//! - [`binary_codec`]  : requests, replies and trade requests
//! - [`record_format`] : readable input records for the error log

pub mod binary_codec;
pub mod record_format;
pub mod wire_types;

pub use binary_codec::{
    decode_reply, decode_request, decode_trade_request, encode_reply, encode_request,
    encode_trade_request, ProtocolError,
};
pub use record_format::describe_input;
pub use wire_types::{MAX_INPUT_SIZE, REPLY_SIZE, REQUEST_SIZE, TRADE_REQUEST_SIZE};
