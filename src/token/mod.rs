//! # Credential token codec
//!
//! Stateless, signed, expiring serialization of a canonical [`Identity`](crate::types::Identity).
//! The token is the whole session artifact; nothing is kept server-side.

mod claims;
mod codec;

pub use claims::IdentityClaims;
pub use codec::{
    CredentialToken, ExpiringClaims, SigningKey, TokenCodec, decode, decode_at, encode, open,
    open_at, seal,
};
