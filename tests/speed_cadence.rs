use std::time::Duration;

use chainring::{
    avec::{
        Config, Device, Event, Notification, Session, Update,
        profiles::{
            background::ManufacturerInfo,
            speed_cadence::{self, BikeCadence, BikeSpeed},
        },
    },
    sans::{ChannelId, Page, common::BatteryStatus},
};

const SPEED: ChannelId = ChannelId::new(0x007B_0001);
const CADENCE: ChannelId = ChannelId::new(0x007A_0001);

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn replay(channel_id: ChannelId, config: Config, pages: &[[u8; 8]]) -> (Session, Vec<Notification>) {
    let mut session = Session::new(channel_id, config);
    let mut notifications = vec![];

    for (i, bytes) in pages.iter().enumerate() {
        let now = Duration::from_millis(250 * i as u64);
        session.receive_page(&Page::new(*bytes), now, &mut notifications);
    }

    (session, notifications)
}

fn speed(session: &Session) -> &BikeSpeed {
    match session.device() {
        Device::BikeSpeed(d) => d,
        d => panic!("unexpected device {d:?}"),
    }
}

fn cadence(session: &Session) -> &BikeCadence {
    match session.device() {
        Device::BikeCadence(d) => d,
        d => panic!("unexpected device {d:?}"),
    }
}

#[test]
fn speed_and_distance() {
    let (session, _) = replay(
        SPEED,
        Config::default(),
        &[
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00],
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x02, 0x00],
        ],
    );

    let s = speed(&session);
    assert!(close(s.speed, 4.4));
    assert!(close(s.accumulated_distance, 4.4));
    assert_eq!(s.sensor.elapsed(), Duration::from_secs(1));
}

#[test]
fn speed_uses_wheel_circumference() {
    let config = Config {
        wheel_circumference: 2.0,
        ..Config::default()
    };
    let (session, _) = replay(
        SPEED,
        config,
        &[
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00],
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x02, 0x01, 0x00],
        ],
    );

    let s = speed(&session);
    assert_eq!(s.speed, 4.0);
    assert_eq!(s.accumulated_distance, 2.0);
}

#[test]
fn speed_across_rollover() {
    let (session, _) = replay(
        SPEED,
        Config::default(),
        &[
            [0x00, 0xFF, 0xFF, 0xFF, 0xE8, 0xFD, 0xFF, 0xFF],
            [0x00, 0xFF, 0xFF, 0xFF, 0xE8, 0x01, 0x01, 0x00],
        ],
    );

    let s = speed(&session);
    assert_eq!(s.sensor.event_time.total(), 1024);
    assert_eq!(s.sensor.revolutions.total(), 2);
    assert!(close(s.speed, 4.4));
}

#[test]
fn stopped_wheel_keeps_speed() {
    let (session, _) = replay(
        SPEED,
        Config::default(),
        &[
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00],
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x02, 0x00],
            [0x80, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x02, 0x00],
        ],
    );

    let s = speed(&session);
    assert!(close(s.speed, 4.4));
    assert!(close(s.accumulated_distance, 4.4));
}

#[test]
fn cadence_from_revolutions() {
    let (session, _) = replay(
        CADENCE,
        Config::default(),
        &[
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00],
            [0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x01, 0x00],
        ],
    );

    assert_eq!(cadence(&session).cadence, 60.0);
}

#[test]
fn first_page_has_no_cadence() {
    let (session, _) = replay(
        CADENCE,
        Config::default(),
        &[[0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x01, 0x00]],
    );

    assert!(cadence(&session).cadence.is_nan());
}

#[test]
fn background_pages() {
    let (session, notifications) = replay(
        CADENCE,
        Config::default(),
        &[
            [0x82, 0x01, 0x34, 0x12, 0x00, 0x00, 0x00, 0x00],
            [0x84, 0xFF, 0x80, 0x23, 0x00, 0x00, 0x00, 0x00],
            [0x05, 0x01, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00],
        ],
    );

    let sensor = &cadence(&session).sensor;
    assert_eq!(
        sensor.identification.manufacturer_info,
        Some(ManufacturerInfo {
            manufacturer_id: 1,
            serial_number: 0x1234,
        })
    );

    let battery = sensor.battery.unwrap();
    assert_eq!(battery.voltage, 3.5);
    assert_eq!(battery.status, BatteryStatus::Good);
    assert_eq!(sensor.stopped, Some(true));

    let updates: Vec<_> = notifications.iter().map(|n| n.event).collect();
    assert_eq!(
        updates,
        [
            Event::Online,
            Event::Updated(Update::BikeCadence(speed_cadence::Update::Identification)),
            Event::Updated(Update::BikeCadence(speed_cadence::Update::Battery)),
            Event::Updated(Update::BikeCadence(speed_cadence::Update::Motion)),
        ]
    );
}

#[test]
fn operating_time_and_product() {
    let (session, _) = replay(
        SPEED,
        Config::default(),
        &[
            [0x01, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            [0x03, 0x02, 0x05, 0x07, 0x00, 0x00, 0x00, 0x00],
        ],
    );

    let identification = &speed(&session).sensor.identification;
    assert_eq!(identification.operating_time, Some(Duration::from_secs(32)));

    let product = identification.product_info.unwrap();
    assert_eq!(product.hardware_version, 2);
    assert_eq!(product.software_version, 5);
    assert_eq!(product.model_number, 7);
}

#[test]
fn unrecognized_pages_are_ignored() {
    let (session, notifications) = replay(
        SPEED,
        Config::default(),
        &[
            [0x06, 0xFF, 0xFF, 0xFF, 0x00, 0x04, 0x02, 0x00],
            [0x50, 0xFF, 0xFF, 0x03, 0x01, 0x00, 0x39, 0x30],
        ],
    );

    assert_eq!(speed(&session).sensor.revolutions.last(), None);
    assert_eq!(session.common().manufacturer_info.unwrap().model_number, 12345);
    assert_eq!(
        notifications.last().unwrap().event,
        Event::Updated(Update::Common(0x50))
    );
    assert_eq!(notifications.len(), 2);
}
