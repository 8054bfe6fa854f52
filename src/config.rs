//! Tunable constants used across the stack.
//!
//! Collected here instead of scattered as local `const`s so the knobs that
//! actually matter for interop (retransmission limits, ARP timing) have one
//! place to look.

/// Largest payload a single TCP segment will carry.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

/// Number of consecutive retransmissions tolerated before giving up on a
/// connection and marking both ends of its stream as errored.
pub const MAX_RETX_ATTEMPTS: u64 = 8;

/// How long a learned ARP cache entry stays valid.
pub const ARP_ENTRY_TTL_MS: u64 = 30_000;

/// Minimum spacing between ARP request re-broadcasts for the same target IP.
pub const ARP_REQUEST_INTERVAL_MS: u64 = 5_000;

/// Default TTL used for datagrams originated locally by the demo binary.
pub const DEFAULT_TTL: u8 = 64;

/// MTU assumed by the demo binary's TUN read/write buffer.
pub const MTU: usize = 1500;
