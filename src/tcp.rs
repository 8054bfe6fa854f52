//! TCP transport: the wire message types plus the receiver and sender
//! halves of a connection. Both `TCPReceiver` and `TCPSender` are driven
//! purely by their `receive`/`push`/`tick`/`send` entry points -- see the
//! crate-level docs for the concurrency model.

pub mod message;
pub mod receiver;
pub mod sender;

pub use message::{TCPReceiverMessage, TCPSenderMessage};
pub use receiver::TCPReceiver;
pub use sender::TCPSender;
