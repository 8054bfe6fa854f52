//! Consumes sender-side segments and drives a `Reassembler`, producing the
//! ack/window feedback the sender needs.

use crate::reassembler::Reassembler;
use crate::tcp::message::{TCPReceiverMessage, TCPSenderMessage};
use crate::wrap32::Wrap32;

#[derive(Debug)]
pub struct TCPReceiver {
    isn: Option<Wrap32>,
    reassembler: Reassembler,
}

impl TCPReceiver {
    pub fn new(reassembler: Reassembler) -> Self {
        TCPReceiver {
            isn: None,
            reassembler,
        }
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    pub fn receive(&mut self, msg: TCPSenderMessage) {
        if msg.rst {
            self.reassembler.output_mut().set_error();
            return;
        }

        if self.isn.is_none() {
            if !msg.syn {
                return; // nothing to anchor to yet, drop
            }
            self.isn = Some(msg.seqno);
        } else if msg.syn {
            return; // ISN already fixed, ignore a duplicate SYN
        }

        let isn = self.isn.unwrap();
        let writer = self.reassembler.output();
        let checkpoint =
            writer.bytes_pushed() + 1 + if writer.is_closed() { 1 } else { 0 };
        let abs_seqno = msg.seqno.unwrap(isn, checkpoint);
        if !msg.syn && abs_seqno == 0 {
            // A non-SYN segment can't legitimately unwrap to absolute 0 (the
            // SYN alone occupies it); treat it as the protocol-illegal event
            // it is and drop it rather than underflowing `abs_seqno - 1`.
            return;
        }
        let stream_index = if msg.syn { 0 } else { abs_seqno - 1 };

        self.reassembler.insert(stream_index, &msg.payload, msg.fin);
    }

    pub fn send(&self) -> TCPReceiverMessage {
        let writer = self.reassembler.output();
        let mut msg = TCPReceiverMessage {
            window_size: writer.available_capacity().min(u16::MAX as usize) as u16,
            rst: writer.has_error(),
            ackno: None,
        };

        let Some(isn) = self.isn else {
            return msg;
        };

        let mut ack_abs = writer.bytes_pushed() + 1;
        if writer.is_closed() {
            ack_abs += 1;
        }
        msg.ackno = Some(Wrap32::wrap(ack_abs, isn));
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_stream::ByteStream;

    fn receiver(capacity: usize) -> TCPReceiver {
        TCPReceiver::new(Reassembler::new(ByteStream::new(capacity)))
    }

    fn syn(isn: u32) -> TCPSenderMessage {
        TCPSenderMessage {
            seqno: Wrap32::new(isn),
            syn: true,
            ..Default::default()
        }
    }

    #[test]
    fn no_ackno_before_syn() {
        let r = receiver(100);
        assert_eq!(r.send().ackno, None);
    }

    #[test]
    fn syn_sets_isn_and_acks_one_past() {
        let mut r = receiver(100);
        r.receive(syn(5));
        assert_eq!(r.send().ackno, Some(Wrap32::new(6)));
    }

    #[test]
    fn duplicate_syn_ignored() {
        let mut r = receiver(100);
        r.receive(syn(5));
        r.receive(syn(100));
        assert_eq!(r.send().ackno, Some(Wrap32::new(6)));
    }

    #[test]
    fn data_after_syn_advances_ack() {
        let mut r = receiver(100);
        r.receive(syn(0));
        r.receive(TCPSenderMessage {
            seqno: Wrap32::new(1),
            payload: b"hello".to_vec(),
            ..Default::default()
        });
        assert_eq!(r.send().ackno, Some(Wrap32::new(6)));
        assert_eq!(r.reassembler().output().peek(), b"hello");
    }

    #[test]
    fn fin_closes_and_advances_ack_by_two() {
        let mut r = receiver(100);
        r.receive(syn(0));
        r.receive(TCPSenderMessage {
            seqno: Wrap32::new(1),
            payload: b"hi".to_vec(),
            fin: true,
            ..Default::default()
        });
        assert_eq!(r.send().ackno, Some(Wrap32::new(4)));
        assert!(r.reassembler().output().is_closed());
    }

    #[test]
    fn rst_sets_error() {
        let mut r = receiver(100);
        r.receive(TCPSenderMessage {
            rst: true,
            ..Default::default()
        });
        assert!(r.send().rst);
    }

    #[test]
    fn window_size_caps_at_u16_max() {
        let r = receiver(1 << 20);
        assert_eq!(r.send().window_size, u16::MAX);
    }
}
