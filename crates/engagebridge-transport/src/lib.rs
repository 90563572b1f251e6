//! engagebridge-transport - Call envelope and serialization layer
//!
//! This crate provides:
//! - [`invoke`] and its convenience shapes, which turn any handler outcome into
//!   exactly one [`MethodResult`](engagebridge_core::MethodResult)
//! - [`catch_panic`] so that handler panics never unwind into the host
//! - [`Codec`] trait and [`JsonCodec`] for hosts that exchange raw bytes

mod codec;
mod envelope;
mod panic_guard;

pub use codec::{Codec, CodecError, JsonCodec, lenient};
pub use envelope::{
    IntoReply, Json, decode_arguments, into_result, invoke, invoke_map_args, invoke_no_args,
    invoke_typed,
};
pub use panic_guard::{catch_panic, install_panic_hook};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Codec, IntoReply, Json, JsonCodec, invoke, invoke_map_args, invoke_no_args, invoke_typed,
    };
}
