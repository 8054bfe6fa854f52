//! Resolves IPv4 next hops to Ethernet addresses via ARP, queues datagrams
//! awaiting resolution, and frames outgoing IPv4 traffic for transmission.

use std::collections::{HashMap, VecDeque};

use crate::config::{ARP_ENTRY_TTL_MS, ARP_REQUEST_INTERVAL_MS};
use crate::net::arp::ArpMessage;
use crate::net::datagram::Ipv4Datagram;
use crate::net::ethernet::{EthernetAddress, EthernetFrame, EthernetHeader, BROADCAST, ETHERTYPE_ARP, ETHERTYPE_IPV4};

/// Sink for frames a `NetworkInterface` wants to put on the wire. A real
/// deployment wires this to a TUN/TAP device; tests wire it to a queue.
pub trait OutputPort {
    fn transmit(&mut self, frame: EthernetFrame);
}

/// The simplest possible `OutputPort`: collects frames for a caller (a demo
/// binary, or a test) to drain.
#[derive(Debug, Default)]
pub struct FrameQueue(VecDeque<EthernetFrame>);

impl OutputPort for FrameQueue {
    fn transmit(&mut self, frame: EthernetFrame) {
        self.0.push_back(frame);
    }
}

impl FrameQueue {
    pub fn pop(&mut self) -> Option<EthernetFrame> {
        self.0.pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct ArpCacheEntry {
    ethernet_address: EthernetAddress,
    time_ms: u64,
}

pub struct NetworkInterface<P: OutputPort> {
    name: String,
    port: P,
    ethernet_address: EthernetAddress,
    ip_address: u32,

    arp_cache: HashMap<u32, ArpCacheEntry>,
    arp_request_time: HashMap<u32, u64>,
    waiting_dgrams: HashMap<u32, VecDeque<Ipv4Datagram>>,
    datagrams_received: VecDeque<Ipv4Datagram>,
    time_ms: u64,
}

impl<P: OutputPort> NetworkInterface<P> {
    pub fn new(name: impl Into<String>, port: P, ethernet_address: EthernetAddress, ip_address: u32) -> Self {
        let name = name.into();
        eprintln!(
            "DEBUG: interface {name} has ethernet address {ethernet_address:02x?} and ip address {:?}",
            ip_address.to_be_bytes()
        );
        NetworkInterface {
            name,
            port,
            ethernet_address,
            ip_address,
            arp_cache: HashMap::new(),
            arp_request_time: HashMap::new(),
            waiting_dgrams: HashMap::new(),
            datagrams_received: VecDeque::new(),
            time_ms: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn datagrams_received(&mut self) -> &mut VecDeque<Ipv4Datagram> {
        &mut self.datagrams_received
    }

    /// Send `dgram` toward `next_hop`, resolving its Ethernet address via
    /// ARP first if necessary.
    pub fn send_datagram(&mut self, dgram: Ipv4Datagram, next_hop: u32) {
        if let Some(entry) = self.arp_cache.get(&next_hop) {
            if self.time_ms - entry.time_ms < ARP_ENTRY_TTL_MS {
                let frame = EthernetFrame {
                    header: EthernetHeader {
                        dst: entry.ethernet_address,
                        src: self.ethernet_address,
                        ethertype: ETHERTYPE_IPV4,
                    },
                    payload: dgram.serialize(),
                };
                self.port.transmit(frame);
                return;
            }
        }

        let req_time = self.arp_request_time.get(&next_hop).copied();
        let is_new_request = req_time.is_none();
        let request_expired = req_time
            .map(|t| self.time_ms - t >= ARP_REQUEST_INTERVAL_MS)
            .unwrap_or(false);
        let need_request = is_new_request || request_expired;

        if request_expired {
            self.waiting_dgrams.remove(&next_hop);
        }

        self.waiting_dgrams
            .entry(next_hop)
            .or_default()
            .push_back(dgram);

        if need_request {
            let arp = ArpMessage::request(self.ethernet_address, self.ip_address, next_hop);
            let frame = EthernetFrame {
                header: EthernetHeader {
                    dst: BROADCAST,
                    src: self.ethernet_address,
                    ethertype: ETHERTYPE_ARP,
                },
                payload: arp.serialize(),
            };
            self.port.transmit(frame);
            self.arp_request_time.insert(next_hop, self.time_ms);
        }
    }

    /// Handle an inbound Ethernet frame: IPv4 goes to the receive queue,
    /// ARP updates the cache and may trigger a reply plus draining any
    /// datagrams that were waiting on this peer's address.
    pub fn recv_frame(&mut self, frame: EthernetFrame) {
        let for_me = frame.header.dst == self.ethernet_address || frame.header.dst == BROADCAST;
        if !for_me {
            return;
        }

        match frame.header.ethertype {
            ETHERTYPE_IPV4 => {
                if let Some(dgram) = Ipv4Datagram::parse(&frame.payload) {
                    self.datagrams_received.push_back(dgram);
                }
            }
            ETHERTYPE_ARP => {
                let Some(arp) = ArpMessage::parse(&frame.payload) else {
                    return;
                };
                if !arp.supported() {
                    return;
                }

                self.arp_cache.insert(
                    arp.sender_ip_address,
                    ArpCacheEntry {
                        ethernet_address: arp.sender_ethernet_address,
                        time_ms: self.time_ms,
                    },
                );

                if arp.opcode == crate::net::arp::ARP_OPCODE_REQUEST
                    && arp.target_ip_address == self.ip_address
                {
                    let reply = ArpMessage::reply(
                        self.ethernet_address,
                        self.ip_address,
                        arp.sender_ethernet_address,
                        arp.sender_ip_address,
                    );
                    self.port.transmit(EthernetFrame {
                        header: EthernetHeader {
                            dst: arp.sender_ethernet_address,
                            src: self.ethernet_address,
                            ethertype: ETHERTYPE_ARP,
                        },
                        payload: reply.serialize(),
                    });
                }

                if let Some(mut pending) = self.waiting_dgrams.remove(&arp.sender_ip_address) {
                    while let Some(dgram) = pending.pop_front() {
                        self.port.transmit(EthernetFrame {
                            header: EthernetHeader {
                                dst: arp.sender_ethernet_address,
                                src: self.ethernet_address,
                                ethertype: ETHERTYPE_IPV4,
                            },
                            payload: dgram.serialize(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, ms_since_last_tick: u64) {
        self.time_ms += ms_since_last_tick;
        let now = self.time_ms;

        let expired_requests: Vec<u32> = self
            .arp_request_time
            .iter()
            .filter(|(_, &req_time)| now - req_time >= ARP_REQUEST_INTERVAL_MS)
            .map(|(&ip, _)| ip)
            .collect();
        for ip in expired_requests {
            self.arp_request_time.remove(&ip);
            self.waiting_dgrams.remove(&ip);
        }

        self.arp_cache
            .retain(|_, entry| now - entry.time_ms < ARP_ENTRY_TTL_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(ip: u32) -> NetworkInterface<FrameQueue> {
        NetworkInterface::new("test0", FrameQueue::default(), [1, 1, 1, 1, 1, 1], ip)
    }

    fn dgram() -> Ipv4Datagram {
        Ipv4Datagram::new([10, 0, 0, 1], [10, 0, 0, 2], 64, vec![1, 2, 3])
    }

    #[test]
    fn unresolved_next_hop_broadcasts_arp_request() {
        let mut nic = iface(0x0a000001);
        nic.send_datagram(dgram(), 0x0a000002);
        let frame = nic.port_mut().pop().expect("arp request sent");
        assert_eq!(frame.header.ethertype, ETHERTYPE_ARP);
        assert_eq!(frame.header.dst, BROADCAST);
        assert!(nic.port_mut().pop().is_none());
    }

    #[test]
    fn arp_reply_resolves_and_flushes_waiting_datagram() {
        let mut nic = iface(0x0a000001);
        nic.send_datagram(dgram(), 0x0a000002);
        nic.port_mut().pop(); // drain the ARP request

        let reply = ArpMessage::reply([2; 6], 0x0a000002, [1, 1, 1, 1, 1, 1], 0x0a000001);
        nic.recv_frame(EthernetFrame {
            header: EthernetHeader {
                dst: [1, 1, 1, 1, 1, 1],
                src: [2; 6],
                ethertype: ETHERTYPE_ARP,
            },
            payload: reply.serialize(),
        });

        let frame = nic.port_mut().pop().expect("queued datagram flushed");
        assert_eq!(frame.header.ethertype, ETHERTYPE_IPV4);
        assert_eq!(frame.header.dst, [2; 6]);
    }

    #[test]
    fn repeated_request_within_interval_is_not_re_sent() {
        let mut nic = iface(0x0a000001);
        nic.send_datagram(dgram(), 0x0a000002);
        nic.port_mut().pop();
        nic.send_datagram(dgram(), 0x0a000002);
        assert!(nic.port_mut().pop().is_none());
    }

    #[test]
    fn request_reply_ordering_before_queued_datagram() {
        let mut nic = iface(0x0a000001);
        nic.send_datagram(dgram(), 0x0a000002);
        nic.port_mut().pop();

        // Peer's own ARP request for us arrives, with a datagram already
        // queued for that peer (simulated by resolving first so a
        // datagram can be queued to the same peer afterward).
        let request = ArpMessage::request([2; 6], 0x0a000002, 0x0a000001);
        nic.recv_frame(EthernetFrame {
            header: EthernetHeader {
                dst: BROADCAST,
                src: [2; 6],
                ethertype: ETHERTYPE_ARP,
            },
            payload: request.serialize(),
        });
        let first = nic.port_mut().pop().expect("arp reply sent first");
        assert_eq!(first.header.ethertype, ETHERTYPE_ARP);
        let second = nic.port_mut().pop().expect("queued datagram flushed second");
        assert_eq!(second.header.ethertype, ETHERTYPE_IPV4);
    }

    #[test]
    fn arp_cache_entry_expires_after_ttl() {
        let mut nic = iface(0x0a000001);
        nic.arp_cache.insert(
            0x0a000002,
            ArpCacheEntry {
                ethernet_address: [2; 6],
                time_ms: 0,
            },
        );
        nic.tick(ARP_ENTRY_TTL_MS);
        assert!(nic.arp_cache.is_empty());
    }
}
