//! Link and network layer: Ethernet/ARP framing on a `NetworkInterface`,
//! longest-prefix-match forwarding in a `Router`.

pub mod arp;
pub mod datagram;
pub mod ethernet;
pub mod interface;
pub mod router;

pub use arp::ArpMessage;
pub use datagram::Ipv4Datagram;
pub use ethernet::{EthernetAddress, EthernetFrame, EthernetHeader};
pub use interface::{FrameQueue, NetworkInterface, OutputPort};
pub use router::Router;
