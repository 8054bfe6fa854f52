//! IPv4 datagram representation, built on the same `etherparse::Ipv4Header`
//! the rest of the pack uses for the TCP datapath.

use etherparse::{IpNumber, Ipv4Header, Ipv4HeaderSlice};

#[derive(Debug, Clone)]
pub struct Ipv4Datagram {
    pub header: Ipv4Header,
    pub payload: Vec<u8>,
}

impl Ipv4Datagram {
    pub fn new(source: [u8; 4], destination: [u8; 4], ttl: u8, payload: Vec<u8>) -> Ipv4Datagram {
        let header = Ipv4Header::new(payload.len() as u16, ttl, IpNumber::TCP, source, destination)
            .expect("payload fits in an ipv4 datagram");
        Ipv4Datagram { header, payload }
    }

    pub fn destination(&self) -> u32 {
        u32::from_be_bytes(self.header.destination)
    }

    pub fn ttl(&self) -> u8 {
        self.header.time_to_live
    }

    /// Decrement TTL by one and recompute the header checksum. Called by
    /// the router on every hop; never called on a datagram with TTL <= 1.
    pub fn decrement_ttl_and_recompute_checksum(&mut self) {
        self.header.time_to_live -= 1;
        self.header.header_checksum = self.header.calc_header_checksum();
    }

    pub fn parse(bytes: &[u8]) -> Option<Ipv4Datagram> {
        let slice = Ipv4HeaderSlice::from_slice(bytes).ok()?;
        let header = slice.to_header();
        let header_len = slice.slice().len();
        if bytes.len() < header_len {
            return None;
        }
        Some(Ipv4Datagram {
            header,
            payload: bytes[header_len..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header.header_len() + self.payload.len());
        self.header
            .write(&mut out)
            .expect("header serializes into a growable buffer");
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_strictly_decreases() {
        let mut dgram = Ipv4Datagram::new([10, 0, 0, 1], [10, 0, 0, 2], 64, vec![1, 2, 3]);
        let before = dgram.ttl();
        dgram.decrement_ttl_and_recompute_checksum();
        assert_eq!(dgram.ttl(), before - 1);
    }

    #[test]
    fn round_trips_through_wire_bytes() {
        let dgram = Ipv4Datagram::new([192, 168, 0, 1], [192, 168, 0, 2], 32, vec![7, 7]);
        let bytes = dgram.serialize();
        let parsed = Ipv4Datagram::parse(&bytes).unwrap();
        assert_eq!(parsed.destination(), dgram.destination());
        assert_eq!(parsed.ttl(), 32);
        assert_eq!(parsed.payload, vec![7, 7]);
    }
}
