//! QR artifact generation

pub mod codec;

pub use codec::{QrCodeCodec, DEFAULT_MODULE_SCALE};
