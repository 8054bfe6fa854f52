//! Minimal demo binary: runs a TCP sender/receiver pair across a tick loop
//! to move a short message through a `ByteStream`, then runs a two-host,
//! one-router network to show ARP resolution and longest-prefix forwarding.
//! Wiring the two halves into one wire-format pipeline (TCP segments inside
//! real Ethernet/IPv4 frames read off a TUN device) is the out-of-scope CLI
//! surface this crate does not aim to be; this binary only demonstrates the
//! pieces the library actually implements.

use std::cell::RefCell;
use std::rc::Rc;

use tcpstack::config::DEFAULT_TTL;
use tcpstack::{ByteStream, FrameQueue, Ipv4Datagram, NetworkInterface, Reassembler, Router, TCPReceiver, TCPSender, TCPSenderMessage, Wrap32};

const TICK_MS: u64 = 100;
const MAX_TICKS: usize = 200;

fn run_tcp_demo() {
    let app_input = ByteStream::new(4096);
    let mut sender = TCPSender::new(app_input, Wrap32::new(0), 1000);
    sender.input_mut().push(b"hello from the sender side\n");
    sender.input_mut().close();

    let mut receiver = TCPReceiver::new(Reassembler::new(ByteStream::new(4096)));

    let mut in_flight: Vec<TCPSenderMessage> = Vec::new();
    for _ in 0..MAX_TICKS {
        sender.push(|msg| in_flight.push(msg));

        for msg in in_flight.drain(..) {
            receiver.receive(msg);
            let ack = receiver.send();
            sender.receive(&ack);
        }

        if receiver.reassembler().output().is_finished() {
            break;
        }
        sender.tick(TICK_MS, |msg| in_flight.push(msg));
    }

    let delivered = receiver.reassembler().output().peek().to_vec();
    eprintln!(
        "tcp demo: delivered {} bytes: {:?}",
        delivered.len(),
        String::from_utf8_lossy(&delivered)
    );
}

fn ip(a: u8, b: u8, c: u8, d: u8) -> u32 {
    u32::from_be_bytes([a, b, c, d])
}

fn run_network_demo() {
    let host_a_ip = ip(10, 0, 0, 1);
    let host_b_ip = ip(10, 0, 1, 1);
    let router_a_ip = ip(10, 0, 0, 254);
    let router_b_ip = ip(10, 0, 1, 254);

    let host_a = Rc::new(RefCell::new(NetworkInterface::new("host-a", FrameQueue::default(), [0xaa; 6], host_a_ip)));
    let host_b = Rc::new(RefCell::new(NetworkInterface::new("host-b", FrameQueue::default(), [0xbb; 6], host_b_ip)));

    let mut router = Router::new();
    let router_side_a = Rc::new(RefCell::new(NetworkInterface::new(
        "router-a",
        FrameQueue::default(),
        [0x01; 6],
        router_a_ip,
    )));
    let router_side_b = Rc::new(RefCell::new(NetworkInterface::new(
        "router-b",
        FrameQueue::default(),
        [0x02; 6],
        router_b_ip,
    )));
    let idx_a = router.add_interface(Rc::clone(&router_side_a));
    let idx_b = router.add_interface(Rc::clone(&router_side_b));
    router
        .add_route(ip(10, 0, 0, 0), 24, None, idx_a)
        .expect("prefix fits in 32 bits");
    router
        .add_route(ip(10, 0, 1, 0), 24, None, idx_b)
        .expect("prefix fits in 32 bits");

    host_a.borrow_mut().send_datagram(
        Ipv4Datagram::new(host_a_ip.to_be_bytes(), host_b_ip.to_be_bytes(), DEFAULT_TTL, b"ping".to_vec()),
        router_a_ip,
    );

    for _ in 0..MAX_TICKS {
        // host A -> router side A
        while let Some(frame) = host_a.borrow_mut().port_mut().pop() {
            router_side_a.borrow_mut().recv_frame(frame);
        }
        // router side A -> host A (ARP replies)
        while let Some(frame) = router_side_a.borrow_mut().port_mut().pop() {
            host_a.borrow_mut().recv_frame(frame);
        }

        router.route();

        // router side B -> host B
        while let Some(frame) = router_side_b.borrow_mut().port_mut().pop() {
            host_b.borrow_mut().recv_frame(frame);
        }
        // host B -> router side B (ARP replies)
        while let Some(frame) = host_b.borrow_mut().port_mut().pop() {
            router_side_b.borrow_mut().recv_frame(frame);
        }

        host_a.borrow_mut().tick(TICK_MS);
        host_b.borrow_mut().tick(TICK_MS);
        router_side_a.borrow_mut().tick(TICK_MS);
        router_side_b.borrow_mut().tick(TICK_MS);

        if !host_b.borrow_mut().datagrams_received().is_empty() {
            break;
        }
    }

    let delivered = host_b.borrow_mut().datagrams_received().pop_front();
    match delivered {
        Some(dgram) => eprintln!("network demo: host-b received datagram with payload {:?}", dgram.payload),
        None => eprintln!("network demo: datagram never arrived within {MAX_TICKS} ticks"),
    }
}

fn main() {
    run_tcp_demo();
    run_network_demo();
}
