//! A minimal ARP message: just enough of RFC 826 (Ethernet hardware type,
//! IPv4 protocol type) for the `NetworkInterface` address-resolution dance.
//! Anything else (other hardware/protocol pairs) is rejected by
//! `supported()` and dropped by the caller, matching the "parse failure is
//! silent" policy for the data plane.

use crate::net::ethernet::EthernetAddress;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;
const HLEN_ETHERNET: u8 = 6;
const PLEN_IPV4: u8 = 4;

pub const ARP_OPCODE_REQUEST: u16 = 1;
pub const ARP_OPCODE_REPLY: u16 = 2;

const MESSAGE_LEN: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub opcode: u16,
    pub sender_ethernet_address: EthernetAddress,
    pub sender_ip_address: u32,
    pub target_ethernet_address: EthernetAddress,
    pub target_ip_address: u32,
}

impl ArpMessage {
    pub fn request(
        sender_ethernet_address: EthernetAddress,
        sender_ip_address: u32,
        target_ip_address: u32,
    ) -> ArpMessage {
        ArpMessage {
            opcode: ARP_OPCODE_REQUEST,
            sender_ethernet_address,
            sender_ip_address,
            target_ethernet_address: [0; 6],
            target_ip_address,
        }
    }

    pub fn reply(
        sender_ethernet_address: EthernetAddress,
        sender_ip_address: u32,
        target_ethernet_address: EthernetAddress,
        target_ip_address: u32,
    ) -> ArpMessage {
        ArpMessage {
            opcode: ARP_OPCODE_REPLY,
            sender_ethernet_address,
            sender_ip_address,
            target_ethernet_address,
            target_ip_address,
        }
    }

    /// Ethernet hardware type + IPv4 protocol type is all this stack speaks.
    pub fn supported(&self) -> bool {
        self.opcode == ARP_OPCODE_REQUEST || self.opcode == ARP_OPCODE_REPLY
    }

    pub fn parse(bytes: &[u8]) -> Option<ArpMessage> {
        if bytes.len() < MESSAGE_LEN {
            return None;
        }
        let htype = u16::from_be_bytes([bytes[0], bytes[1]]);
        let ptype = u16::from_be_bytes([bytes[2], bytes[3]]);
        let hlen = bytes[4];
        let plen = bytes[5];
        if htype != HTYPE_ETHERNET || ptype != PTYPE_IPV4 || hlen != HLEN_ETHERNET || plen != PLEN_IPV4 {
            return None;
        }
        let opcode = u16::from_be_bytes([bytes[6], bytes[7]]);
        let mut sender_ethernet_address = [0u8; 6];
        sender_ethernet_address.copy_from_slice(&bytes[8..14]);
        let sender_ip_address = u32::from_be_bytes(bytes[14..18].try_into().unwrap());
        let mut target_ethernet_address = [0u8; 6];
        target_ethernet_address.copy_from_slice(&bytes[18..24]);
        let target_ip_address = u32::from_be_bytes(bytes[24..28].try_into().unwrap());

        Some(ArpMessage {
            opcode,
            sender_ethernet_address,
            sender_ip_address,
            target_ethernet_address,
            target_ip_address,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MESSAGE_LEN);
        out.extend_from_slice(&HTYPE_ETHERNET.to_be_bytes());
        out.extend_from_slice(&PTYPE_IPV4.to_be_bytes());
        out.push(HLEN_ETHERNET);
        out.push(PLEN_IPV4);
        out.extend_from_slice(&self.opcode.to_be_bytes());
        out.extend_from_slice(&self.sender_ethernet_address);
        out.extend_from_slice(&self.sender_ip_address.to_be_bytes());
        out.extend_from_slice(&self.target_ethernet_address);
        out.extend_from_slice(&self.target_ip_address.to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let msg = ArpMessage::request([1, 2, 3, 4, 5, 6], 0x0a000001, 0x0a000002);
        let bytes = msg.serialize();
        assert_eq!(bytes.len(), MESSAGE_LEN);
        let parsed = ArpMessage::parse(&bytes).unwrap();
        assert_eq!(parsed, msg);
        assert!(parsed.supported());
    }

    #[test]
    fn rejects_wrong_hardware_type() {
        let mut bytes = ArpMessage::request([0; 6], 1, 2).serialize();
        bytes[1] = 2; // corrupt htype
        assert!(ArpMessage::parse(&bytes).is_none());
    }
}
