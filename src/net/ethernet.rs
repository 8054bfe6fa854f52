//! Ethernet framing. `etherparse` covers IPv4/TCP for this crate but has no
//! Ethernet-layer support, so the header here is a small, obvious struct
//! with hand-written parse/serialize.

pub type EthernetAddress = [u8; 6];

pub const BROADCAST: EthernetAddress = [0xff; 6];

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

const HEADER_LEN: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: EthernetAddress,
    pub src: EthernetAddress,
    pub ethertype: u16,
}

#[derive(Debug, Clone)]
pub struct EthernetFrame {
    pub header: EthernetHeader,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn parse(bytes: &[u8]) -> Option<EthernetFrame> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let mut dst = [0u8; 6];
        let mut src = [0u8; 6];
        dst.copy_from_slice(&bytes[0..6]);
        src.copy_from_slice(&bytes[6..12]);
        let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);
        Some(EthernetFrame {
            header: EthernetHeader { dst, src, ethertype },
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&self.header.dst);
        out.extend_from_slice(&self.header.src);
        out.extend_from_slice(&self.header.ethertype.to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst: BROADCAST,
                src: [1, 2, 3, 4, 5, 6],
                ethertype: ETHERTYPE_ARP,
            },
            payload: vec![9, 9, 9],
        };
        let bytes = frame.serialize();
        let parsed = EthernetFrame::parse(&bytes).unwrap();
        assert_eq!(parsed.header.dst, BROADCAST);
        assert_eq!(parsed.header.ethertype, ETHERTYPE_ARP);
        assert_eq!(parsed.payload, vec![9, 9, 9]);
    }

    #[test]
    fn short_buffer_fails_to_parse() {
        assert!(EthernetFrame::parse(&[0u8; 10]).is_none());
    }
}
