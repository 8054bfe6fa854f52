//! Wire-level TCP segment abstractions exchanged between a `TCPSender` and
//! its peer's `TCPReceiver` (and vice versa for the receiver message).

use crate::wrap32::Wrap32;

/// A segment as produced by a `TCPSender`.
#[derive(Debug, Clone, Default)]
pub struct TCPSenderMessage {
    pub seqno: Wrap32,
    pub syn: bool,
    pub fin: bool,
    pub rst: bool,
    pub payload: Vec<u8>,
}

impl TCPSenderMessage {
    /// SYN + payload + FIN, each flag costing one sequence number.
    pub fn sequence_length(&self) -> usize {
        self.syn as usize + self.payload.len() + self.fin as usize
    }
}

/// The receiver's acknowledgment + flow-control feedback to the sender.
#[derive(Debug, Clone, Default)]
pub struct TCPReceiverMessage {
    pub ackno: Option<Wrap32>,
    pub window_size: u16,
    pub rst: bool,
}
