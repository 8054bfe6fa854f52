//! Typed errors for the boundaries that are allowed to fail loudly.
//!
//! Most of the data plane (malformed frames, protocol-illegal events) is
//! specified to fail silently -- see the module docs on `net` and `tcp` for
//! that policy. These types cover the handful of places a caller can misuse
//! the API and deserves to know about it.

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("route prefix length {0} exceeds 32 bits")]
    PrefixTooLong(u8),
}
