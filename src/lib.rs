//! A user-space TCP/IP core: a reliable byte-stream transport (`ByteStream`,
//! `Wrap32`, `Reassembler`, `TCPReceiver`, `TCPSender`) and the link/network
//! forwarding plane beneath it (`NetworkInterface`, `Router`), all driven by
//! explicit `push`/`receive`/`tick` calls rather than threads or locks.

pub mod byte_stream;
pub mod config;
pub mod error;
pub mod net;
pub mod reassembler;
pub mod tcp;
pub mod wrap32;

pub use byte_stream::ByteStream;
pub use net::{ArpMessage, EthernetAddress, EthernetFrame, EthernetHeader, FrameQueue, Ipv4Datagram, NetworkInterface, OutputPort, Router};
pub use reassembler::Reassembler;
pub use tcp::{TCPReceiver, TCPReceiverMessage, TCPSender, TCPSenderMessage};
pub use wrap32::Wrap32;
