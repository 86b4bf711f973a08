#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;
extern crate usrarp;

mod context;

use usrarp::core::repr::{
    eth_types,
    EthernetFrame,
    Ipv4Address,
};
use usrarp::core::service::{
    Mode,
    Stats,
};
use usrarp::Error;

#[test]
fn reply_to_who_has() {
    let mut service = context::polling_service(Mode::Respond);
    let dev = service.source_mut().dev_mut();
    dev.push_rx(&context::who_has(*context::HOST_IPV4_ADDR))
        .unwrap();

    assert_matches!(service.poll(), Ok(1));

    let reply = service.source_mut().dev_mut().pop_tx().unwrap();
    context::assert_is_reply(&reply);
    assert_eq!(service.stats().replied, 1);
}

#[test]
fn ignore_who_has_for_other_hosts() {
    let mut service = context::polling_service(Mode::Respond);
    let other = Ipv4Address::new([172, 44, 0, 3]);

    // Same frame twice, same answer twice.
    for _ in 0 .. 2 {
        service
            .source_mut()
            .dev_mut()
            .push_rx(&context::who_has(other))
            .unwrap();
        assert_matches!(service.poll(), Ok(1));
    }

    assert_eq!(service.source_mut().dev_mut().tx_len(), 0);
    assert_eq!(service.stats().discarded, 2);
}

#[test]
fn mixed_traffic_in_one_poll() {
    let mut service = context::polling_service(Mode::Respond);
    let request = context::who_has(*context::HOST_IPV4_ADDR);

    let mut ipv4 = request.clone();
    EthernetFrame::try_new(&mut ipv4[..])
        .unwrap()
        .set_payload_type(eth_types::IPV4);

    let runt = request[.. 20].to_vec();

    {
        let dev = service.source_mut().dev_mut();
        dev.push_rx(&request).unwrap();
        dev.push_rx(&ipv4).unwrap();
        dev.push_rx(&runt).unwrap();
        dev.push_rx(&request).unwrap();
    }

    assert_matches!(service.poll(), Ok(4));
    assert_eq!(
        service.stats(),
        &Stats {
            received: 4,
            replied: 2,
            discarded: 2,
            dumped: 0,
            tx_retries: 0,
        }
    );

    let dev = service.source_mut().dev_mut();
    context::assert_is_reply(&dev.pop_tx().unwrap());
    context::assert_is_reply(&dev.pop_tx().unwrap());
    assert!(dev.pop_tx().is_none());
}

#[test]
fn more_frames_than_receive_buffers() {
    let mut service = context::polling_service(Mode::Respond);
    let frames = context::POOL_SIZE * 2;

    for _ in 0 .. frames {
        service
            .source_mut()
            .dev_mut()
            .push_rx(&context::who_has(*context::HOST_IPV4_ADDR))
            .unwrap();
    }

    assert_eq!(service.poll().unwrap(), frames);
    assert_eq!(service.source_mut().dev_mut().tx_len(), frames);

    // Every buffer made it back to the pool or the receive ring.
    let source = service.source();
    assert_eq!(
        source.posted() + source.allocator().available(),
        context::POOL_SIZE
    );
}

#[test]
fn replies_survive_a_full_transmit_ring() {
    let mut service = context::polling_service(Mode::Respond);
    {
        let dev = service.source_mut().dev_mut();
        dev.set_busy_sends(5);
        dev.push_rx(&context::who_has(*context::HOST_IPV4_ADDR))
            .unwrap();
    }

    assert_matches!(service.poll(), Ok(1));
    assert_eq!(service.stats().tx_retries, 5);
    context::assert_is_reply(&service.source_mut().dev_mut().pop_tx().unwrap());
}

#[test]
fn dump_mode_releases_everything() {
    let mut service = context::polling_service(Mode::Dump);
    service
        .source_mut()
        .dev_mut()
        .push_rx(&context::who_has(*context::HOST_IPV4_ADDR))
        .unwrap();

    assert_matches!(service.poll(), Ok(1));
    assert_eq!(service.stats().dumped, 1);
    assert_eq!(service.source_mut().dev_mut().tx_len(), 0);
}

#[test]
fn device_fault_is_fatal() {
    let mut service = context::polling_service(Mode::Respond);
    service.source_mut().dev_mut().set_faulted(true);
    assert_matches!(service.poll(), Err(Error::Device(_)));
}

#[test]
fn interrupt_dispatch_replies() {
    let mut service = context::interrupt_service(Mode::Respond);
    {
        let dev = service.source_mut().dev_mut();
        dev.push_rx(&context::who_has(*context::HOST_IPV4_ADDR))
            .unwrap();
        dev.push_rx(&context::who_has(Ipv4Address::new([10, 0, 0, 1])))
            .unwrap();
    }

    assert_matches!(service.dispatch(None), Ok(2));
    assert_eq!(service.stats().replied, 1);
    assert_eq!(service.stats().discarded, 1);
    context::assert_is_reply(&service.source_mut().dev_mut().pop_tx().unwrap());
}

#[test]
fn interrupt_dispatch_when_idle() {
    let mut service = context::interrupt_service(Mode::Respond);
    assert_matches!(service.dispatch(Some(std::time::Duration::from_millis(1))), Ok(0));
    assert_eq!(service.stats().received, 0);
}
