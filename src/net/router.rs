//! Longest-prefix-match IPv4 forwarding across a set of `NetworkInterface`s.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RouterError;
use crate::net::interface::{NetworkInterface, OutputPort};

struct RouteEntry {
    prefix: u32,
    prefix_length: u8,
    next_hop: Option<u32>,
    interface_num: usize,
}

/// Owns (a shared handle to) every interface it can forward between, plus a
/// route table kept sorted by descending prefix length so the first match
/// found during a scan is always the longest.
pub struct Router<P: OutputPort> {
    interfaces: Vec<Rc<RefCell<NetworkInterface<P>>>>,
    route_table: Vec<RouteEntry>,
}

impl<P: OutputPort> Router<P> {
    pub fn new() -> Self {
        Router {
            interfaces: Vec::new(),
            route_table: Vec::new(),
        }
    }

    /// Register an interface with the router and return its index, used to
    /// address it in `add_route`.
    pub fn add_interface(&mut self, interface: Rc<RefCell<NetworkInterface<P>>>) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    pub fn interface(&self, interface_num: usize) -> Rc<RefCell<NetworkInterface<P>>> {
        Rc::clone(&self.interfaces[interface_num])
    }

    pub fn add_route(
        &mut self,
        prefix: u32,
        prefix_length: u8,
        next_hop: Option<u32>,
        interface_num: usize,
    ) -> Result<(), RouterError> {
        if prefix_length > 32 {
            return Err(RouterError::PrefixTooLong(prefix_length));
        }

        eprintln!(
            "DEBUG: adding route {:?}/{} => {} on interface {}",
            prefix.to_be_bytes(),
            prefix_length,
            next_hop
                .map(|h| format!("{:?}", h.to_be_bytes()))
                .unwrap_or_else(|| "(direct)".to_string()),
            interface_num
        );

        let insert_at = self
            .route_table
            .iter()
            .position(|entry| entry.prefix_length < prefix_length)
            .unwrap_or(self.route_table.len());
        self.route_table.insert(
            insert_at,
            RouteEntry {
                prefix,
                prefix_length,
                next_hop,
                interface_num,
            },
        );
        Ok(())
    }

    /// Drain every interface's received-datagram queue, forwarding each one
    /// that has a matching route and a usable TTL.
    pub fn route(&mut self) {
        for iface in &self.interfaces {
            loop {
                let dgram = iface.borrow_mut().datagrams_received().pop_front();
                let Some(mut dgram) = dgram else { break };

                if dgram.ttl() <= 1 {
                    continue;
                }

                let dst = dgram.destination();
                let route = self.route_table.iter().find(|entry| {
                    let mask: u32 = if entry.prefix_length == 0 {
                        0
                    } else {
                        0xffff_ffffu32 << (32 - entry.prefix_length)
                    };
                    (dst & mask) == (entry.prefix & mask)
                });

                let Some(route) = route else { continue };

                dgram.decrement_ttl_and_recompute_checksum();
                let next_hop = route.next_hop.unwrap_or(dst);
                self.interfaces[route.interface_num]
                    .borrow_mut()
                    .send_datagram(dgram, next_hop);
            }
        }
    }
}

impl<P: OutputPort> Default for Router<P> {
    fn default() -> Self {
        Router::new()
    }
}
