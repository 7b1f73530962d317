#![cfg(feature = "std")]

use std::{sync::Arc, thread, time::Duration};

use chainring::{
    avec::{Config, Device, DeviceKind, Error, Event, Notification, Registry, Update},
    sans::{ChannelId, PageError, message::MessageError},
};

const HEART_RATE: ChannelId = ChannelId::new(0x0078_0001);
const SPEED: ChannelId = ChannelId::new(0x007B_0002);

#[test]
fn sessions_created_on_first_message() {
    let registry = Registry::default();
    let mut notifications: Vec<Notification> = vec![];

    assert!(registry.is_empty());

    registry
        .receive_at(
            HEART_RATE,
            &[0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x08, 5, 72],
            Duration::ZERO,
            &mut notifications,
        )
        .unwrap();
    registry
        .receive_at(
            HEART_RATE,
            &[0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x0C, 6, 73],
            Duration::from_millis(250),
            &mut notifications,
        )
        .unwrap();

    assert_eq!(registry.len(), 1);

    let session = registry.session(HEART_RATE).unwrap();
    let session = session.lock();
    assert_eq!(session.kind(), DeviceKind::HeartRate);
    let Device::HeartRate(hr) = session.device() else {
        panic!("not a heart rate monitor");
    };
    assert_eq!(hr.heart_rate, Some(73));
    assert_eq!(
        notifications.iter().filter(|n| n.event == Event::Online).count(),
        1
    );
}

#[test]
fn malformed_payload_creates_no_session() {
    let registry = Registry::default();

    let result = registry.receive_at(HEART_RATE, &[0x00], Duration::ZERO, &mut ());

    assert!(matches!(result, Err(Error::Page(PageError::TooShort(1)))));
    assert!(registry.is_empty());
}

#[test]
fn poll_reports_each_device() {
    let registry = Registry::new(Config::default());
    let mut notifications: Vec<Notification> = vec![];
    let page = [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x01, 0x00];

    registry
        .receive_at(HEART_RATE, &page, Duration::ZERO, &mut ())
        .unwrap();
    registry
        .receive_at(SPEED, &page, Duration::from_secs(1), &mut ())
        .unwrap();

    registry.poll_at(Duration::from_secs(2), &mut notifications);
    assert_eq!(
        notifications,
        [Notification {
            channel_id: HEART_RATE,
            event: Event::Offline,
        }]
    );

    registry.poll_at(Duration::from_secs(3), &mut notifications);
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[1].channel_id, SPEED);
}

#[test]
fn evicted_sessions_start_afresh() {
    let registry = Registry::default();
    let page = [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x08, 5, 72];

    registry
        .receive_at(HEART_RATE, &page, Duration::ZERO, &mut ())
        .unwrap();
    let held = registry.evict(HEART_RATE).unwrap();
    assert!(registry.is_empty());
    assert!(registry.evict(HEART_RATE).is_none());

    let mut notifications: Vec<Notification> = vec![];
    registry
        .receive_at(HEART_RATE, &page, Duration::ZERO, &mut notifications)
        .unwrap();
    assert_eq!(notifications[0].event, Event::Online);
    assert!(held.lock().last_message().is_some());
}

#[test]
fn concurrent_devices() {
    let registry = Arc::new(Registry::default());

    let handles: Vec<_> = (0..8u32)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let channel_id = ChannelId::new(0x007A_0000 | n);
                for i in 0..100u16 {
                    let [t0, t1] = i.wrapping_mul(1024).to_le_bytes();
                    let [r0, r1] = i.to_le_bytes();
                    let page = [0x00, 0xFF, 0xFF, 0xFF, t0, t1, r0, r1];
                    let now = Duration::from_millis(u64::from(i) * 250);
                    registry.receive_at(channel_id, &page, now, &mut ()).unwrap();
                    // Every thread also races to create this session.
                    registry
                        .receive_at(HEART_RATE, &page, now, &mut ())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 9);

    let mut ids = registry.channel_ids();
    ids.sort();
    assert_eq!(ids[0], ChannelId::new(0x0078_0001));

    let session = registry.session(ChannelId::new(0x007A_0003)).unwrap();
    let Device::BikeCadence(cadence) = session.lock().device().clone() else {
        panic!("not a cadence sensor");
    };
    assert_eq!(cadence.sensor.revolutions.total(), 99);
    assert_eq!(cadence.cadence, 60.0);
}

#[test]
fn transport_messages() {
    let registry = Registry::default();
    let mut notifications: Vec<Notification> = vec![];

    let mut message = vec![0x0D, 0x5D, 0x02];
    message.extend_from_slice(&HEART_RATE.id().to_le_bytes());
    message.extend_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x08, 5, 72]);

    let inbound = registry.receive_message(&message, &mut notifications).unwrap();
    assert_eq!(inbound.channel_number, 2);
    assert_eq!(inbound.channel_id, HEART_RATE);
    assert!(registry.session(HEART_RATE).is_some());
    assert!(matches!(
        notifications.last().unwrap().event,
        Event::Updated(Update::HeartRate(_))
    ));

    assert!(matches!(
        registry.receive_message(&[0x01, 0x40, 0x00], &mut ()),
        Err(Error::Message(MessageError::Unsupported(0x40)))
    ));
    assert_eq!(registry.len(), 1);
}
