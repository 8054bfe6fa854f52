//! Reads from an application `ByteStream` and produces the segments that
//! make up the outgoing half of a TCP connection: handshake flags,
//! windowed data, retransmission on RTO expiry with exponential backoff.

use std::collections::VecDeque;

use crate::byte_stream::ByteStream;
use crate::config::{MAX_PAYLOAD_SIZE, MAX_RETX_ATTEMPTS};
use crate::tcp::message::{TCPReceiverMessage, TCPSenderMessage};
use crate::wrap32::Wrap32;

struct Outstanding {
    msg: TCPSenderMessage,
    abs_seqno: u64,
}

pub struct TCPSender {
    input: ByteStream,
    isn: Wrap32,
    initial_rto_ms: u64,

    next_seqno_abs: u64,
    last_ack_abs: u64,
    bytes_in_flight: u64,
    rto_ms: u64,
    time_since_last_tx_ms: u64,
    consecutive_retx: u64,
    window_size: u16,
    timer_running: bool,
    syn_sent: bool,
    fin_sent: bool,

    outstanding: VecDeque<Outstanding>,
}

impl TCPSender {
    pub fn new(input: ByteStream, isn: Wrap32, initial_rto_ms: u64) -> Self {
        TCPSender {
            input,
            isn,
            initial_rto_ms,
            next_seqno_abs: 0,
            last_ack_abs: 0,
            bytes_in_flight: 0,
            rto_ms: initial_rto_ms,
            time_since_last_tx_ms: 0,
            consecutive_retx: 0,
            window_size: 1,
            timer_running: false,
            syn_sent: false,
            fin_sent: false,
            outstanding: VecDeque::new(),
        }
    }

    pub fn input(&self) -> &ByteStream {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }

    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retx
    }

    /// Fill as much of the receiver's advertised window as there is data
    /// (and handshake flags) to send.
    pub fn push(&mut self, mut transmit: impl FnMut(TCPSenderMessage)) {
        if self.input.has_error() {
            let mut msg = self.make_empty_message();
            msg.rst = true;
            transmit(msg);
            return;
        }

        let effective_window = if self.window_size == 0 {
            1
        } else {
            self.window_size as u64
        };

        while self.bytes_in_flight < effective_window {
            let mut remaining = effective_window - self.bytes_in_flight;
            let mut msg = TCPSenderMessage {
                seqno: Wrap32::wrap(self.next_seqno_abs, self.isn),
                ..Default::default()
            };

            if !self.syn_sent {
                if remaining == 0 {
                    break;
                }
                msg.syn = true;
                self.syn_sent = true;
                remaining -= 1;
            }

            let payload_len = (remaining as usize)
                .min(MAX_PAYLOAD_SIZE)
                .min(self.input.bytes_buffered());
            if payload_len > 0 {
                msg.payload = self.input.read(payload_len);
                remaining -= payload_len as u64;
            }

            if !self.fin_sent && self.input.is_finished() && remaining > 0 {
                msg.fin = true;
                self.fin_sent = true;
            }

            let seg_len = msg.sequence_length();
            if seg_len == 0 {
                break;
            }

            transmit(msg.clone());
            self.outstanding.push_back(Outstanding {
                msg,
                abs_seqno: self.next_seqno_abs,
            });

            self.next_seqno_abs += seg_len as u64;
            self.bytes_in_flight += seg_len as u64;

            if !self.timer_running {
                self.timer_running = true;
                self.time_since_last_tx_ms = 0;
            }

            if self.fin_sent || (self.input.bytes_buffered() == 0 && !self.input.is_finished()) {
                break;
            }
        }
    }

    pub fn make_empty_message(&self) -> TCPSenderMessage {
        TCPSenderMessage {
            seqno: Wrap32::wrap(self.next_seqno_abs, self.isn),
            rst: self.input.has_error(),
            ..Default::default()
        }
    }

    pub fn receive(&mut self, msg: &TCPReceiverMessage) {
        if msg.rst {
            self.input.set_error();
            return;
        }

        self.window_size = msg.window_size;

        let Some(ackno) = msg.ackno else {
            return; // pre-handshake
        };

        let ack_abs = ackno.unwrap(self.isn, self.next_seqno_abs);
        if ack_abs > self.next_seqno_abs {
            return; // impossible, ignore
        }
        if ack_abs <= self.last_ack_abs {
            return; // duplicate or old ack
        }

        self.last_ack_abs = ack_abs;
        self.bytes_in_flight = self.next_seqno_abs - self.last_ack_abs;

        while let Some(front) = self.outstanding.front() {
            let seg_end = front.abs_seqno + front.msg.sequence_length() as u64;
            if seg_end <= self.last_ack_abs {
                self.outstanding.pop_front();
            } else {
                break;
            }
        }

        self.consecutive_retx = 0;
        self.rto_ms = self.initial_rto_ms;
        self.time_since_last_tx_ms = 0;
        self.timer_running = self.bytes_in_flight > 0;
    }

    pub fn tick(&mut self, ms_since_last_tick: u64, mut transmit: impl FnMut(TCPSenderMessage)) {
        if !self.timer_running || self.bytes_in_flight == 0 {
            return;
        }

        self.time_since_last_tx_ms += ms_since_last_tick;
        if self.time_since_last_tx_ms < self.rto_ms || self.outstanding.is_empty() {
            return;
        }

        let retransmit = self.outstanding.front().unwrap().msg.clone();
        transmit(retransmit);
        self.time_since_last_tx_ms = 0;

        self.consecutive_retx += 1;
        if self.window_size > 0 {
            self.rto_ms <<= 1;
        }

        if self.consecutive_retx > MAX_RETX_ATTEMPTS {
            self.input.set_error();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(capacity: usize, rto_ms: u64) -> TCPSender {
        TCPSender::new(ByteStream::new(capacity), Wrap32::new(0), rto_ms)
    }

    #[test]
    fn syn_is_first_segment() {
        let mut s = sender(1000, 1000);
        let mut sent = Vec::new();
        s.push(|m| sent.push(m));
        assert_eq!(sent.len(), 1);
        assert!(sent[0].syn);
        assert_eq!(sent[0].seqno, Wrap32::new(0));
        assert_eq!(s.sequence_numbers_in_flight(), 1);
    }

    #[test]
    fn empty_stream_close_then_push_sends_syn_and_fin_together() {
        let mut s = sender(1000, 1000);
        s.input_mut().close();
        // Default window_size is 1, just enough for the SYN alone; open it
        // up first so there's room left for FIN in the same segment.
        s.receive(&TCPReceiverMessage {
            ackno: None,
            window_size: 2,
            rst: false,
        });
        let mut sent = Vec::new();
        s.push(|m| sent.push(m));
        assert_eq!(sent.len(), 1);
        assert!(sent[0].syn);
        assert!(sent[0].fin);
        assert_eq!(sent[0].sequence_length(), 2);
    }

    #[test]
    fn retransmission_backs_off_rto() {
        let mut s = sender(1000, 1000);
        let mut sent = Vec::new();
        s.push(|m| sent.push(m));
        assert_eq!(sent.len(), 1);

        let mut retx = Vec::new();
        s.tick(500, |m| retx.push(m));
        assert!(retx.is_empty());
        s.tick(500, |m| retx.push(m));
        assert_eq!(retx.len(), 1);
        assert_eq!(s.consecutive_retransmissions(), 1);
        assert_eq!(s.rto_ms, 2000);
    }

    #[test]
    fn ack_clears_outstanding_and_resets_rto() {
        let mut s = sender(1000, 1000);
        let mut sent = Vec::new();
        s.push(|m| sent.push(m));
        s.tick(1500, |m| sent.push(m)); // force one retransmission + backoff
        assert_eq!(s.rto_ms, 2000);

        s.receive(&TCPReceiverMessage {
            ackno: Some(Wrap32::new(1)),
            window_size: 1000,
            rst: false,
        });
        assert_eq!(s.sequence_numbers_in_flight(), 0);
        assert_eq!(s.consecutive_retransmissions(), 0);
        assert_eq!(s.rto_ms, 1000);
    }

    #[test]
    fn zero_window_is_treated_as_one_byte_probe() {
        let mut s = sender(1000, 1000);
        let mut sent = Vec::new();
        s.push(|m| sent.push(m)); // SYN
        s.receive(&TCPReceiverMessage {
            ackno: Some(Wrap32::new(1)),
            window_size: 0,
            rst: false,
        });
        s.input_mut().push(b"hello");
        sent.clear();
        s.push(|m| sent.push(m));
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].payload.len(), 1);
    }

    #[test]
    fn rst_on_receive_sets_stream_error() {
        let mut s = sender(1000, 1000);
        s.receive(&TCPReceiverMessage {
            ackno: None,
            window_size: 1000,
            rst: true,
        });
        assert!(s.input().has_error());
    }
}
