#![cfg(feature = "std")]

use std::time::Duration;

use chainring::{
    avec::{
        Config, Device, Session,
        profiles::fitness_equipment::{Equipment, EquipmentType, FeState, FitnessEquipment},
    },
    sans::{ChannelId, Page},
};
use csv::ReaderBuilder;

const CHANNEL_ID: ChannelId = ChannelId::new(0x0011_0001);

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn replay(pages: &[[u8; 8]]) -> Session {
    let mut session = Session::new(CHANNEL_ID, Config::default());

    for (i, bytes) in pages.iter().enumerate() {
        let now = Duration::from_millis(250 * i as u64);
        session.receive_page(&Page::new(*bytes), now, &mut ());
    }

    session
}

fn equipment(session: &Session) -> &FitnessEquipment {
    match session.device() {
        Device::FitnessEquipment(d) => d,
        d => panic!("unexpected device {d:?}"),
    }
}

#[test]
fn rower_session() {
    const PATH: &str = "fixtures/rower-session.csv";

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(PATH)
        .unwrap();

    let mut session = Session::new(CHANNEL_ID, Config::default());

    for (i, record) in reader.records().enumerate() {
        let record = record.unwrap();
        let fields: Vec<&str> = record.iter().collect();

        let mut bytes = [0; 8];
        for (b, f) in bytes.iter_mut().zip(&fields[..8]) {
            *b = u8::from_str_radix(f, 16).unwrap();
        }

        let now = Duration::from_millis(250 * i as u64);
        session.receive(&bytes, now, &mut ()).unwrap();

        let fe = equipment(&session);
        let strokes = match fe.equipment {
            Equipment::Rower(s) => s.count.total(),
            _ => 0,
        };

        assert_eq!(strokes.to_string(), fields[8], "strokes at row {i}");
        assert_eq!(
            fe.elapsed().as_millis().to_string(),
            fields[9],
            "elapsed time at row {i}"
        );
        assert_eq!(
            fe.distance_traveled().to_string(),
            fields[10],
            "distance at row {i}"
        );
    }

    let fe = equipment(&session);
    assert_eq!(fe.equipment_type, EquipmentType::Rower);
    assert_eq!(fe.state, FeState::InUse);
    assert!(fe.distance_enabled);
    assert_eq!(fe.speed, 0.0);
}

#[test]
fn rower_strokes_cadence_and_power() {
    let session = replay(&[
        [0x16, 0xFF, 0xFF, 255, 0xFF, 0xFF, 0xFF, 0x31],
        [0x16, 0xFF, 0xFF, 19, 128, 0x00, 0x80, 0x31],
    ]);

    let Equipment::Rower(strokes) = equipment(&session).equipment else {
        panic!("not a rower");
    };

    assert_eq!(strokes.count.total(), 20);
    assert_eq!(strokes.cadence, Some(128));
    assert_eq!(strokes.instantaneous_power, Some(32768));
    assert!(strokes.transmits_count);
}

#[test]
fn rower_unavailable_power() {
    let session = replay(&[[0x16, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0x30]]);

    let Equipment::Rower(strokes) = equipment(&session).equipment else {
        panic!("not a rower");
    };

    assert_eq!(strokes.cadence, None);
    assert_eq!(strokes.instantaneous_power, None);
    assert!(!strokes.transmits_count);
}

#[test]
fn climber_stride_cycles() {
    let session = replay(&[
        [0x17, 0xFF, 0xFF, 10, 40, 0x64, 0x00, 0x31],
        [0x17, 0xFF, 0xFF, 14, 42, 0x6E, 0x00, 0x31],
    ]);

    let Equipment::Climber(strides) = equipment(&session).equipment else {
        panic!("not a climber");
    };

    assert_eq!(strides.count.total(), 4);
    assert_eq!(strides.cadence, Some(42));
    assert_eq!(strides.instantaneous_power, Some(110));
}

#[test]
fn general_page() {
    let session = replay(&[
        [0x10, 19, 250, 200, 0xC4, 0x09, 120, 0x34],
        [0x10, 19, 10, 50, 0xC4, 0x09, 121, 0x34],
    ]);

    let fe = equipment(&session);
    assert_eq!(fe.equipment_type, EquipmentType::Treadmill);
    assert_eq!(fe.elapsed(), Duration::from_secs(4));
    assert_eq!(fe.distance_traveled(), 106);
    assert!(close(fe.speed, 2.5));
    assert_eq!(fe.heart_rate, Some(121));
}

#[test]
fn distance_ignored_unless_enabled() {
    let session = replay(&[
        [0x10, 19, 0, 200, 0xFF, 0xFF, 0xFF, 0x30],
        [0x10, 19, 4, 50, 0xFF, 0xFF, 0xFF, 0x30],
    ]);

    let fe = equipment(&session);
    assert!(!fe.distance_enabled);
    assert_eq!(fe.distance_traveled(), 0);
    assert!(fe.speed.is_nan());
    assert_eq!(fe.heart_rate, None);
    assert_eq!(fe.elapsed(), Duration::from_secs(1));
}

#[test]
fn lap_toggles_are_counted() {
    let session = replay(&[
        [0x10, 19, 0, 0, 0, 0, 0xFF, 0x34],
        [0x10, 19, 4, 0, 0, 0, 0xFF, 0xB4],
        [0x10, 19, 8, 0, 0, 0, 0xFF, 0xB4],
        [0x10, 19, 12, 0, 0, 0, 0xFF, 0x34],
    ]);

    assert_eq!(equipment(&session).laps, 2);
}

#[test]
fn general_settings() {
    let session = replay(&[[0x11, 0xFF, 0xFF, 0xFF, 0x06, 0xFF, 100, 0x20]]);

    let fe = equipment(&session);
    let settings = fe.settings.unwrap();
    assert!(settings.cycle_length.is_nan());
    assert!(close(settings.incline, -2.5));
    assert_eq!(settings.resistance, 50.0);
    assert_eq!(fe.state, FeState::Ready);

    let session = replay(&[[0x11, 0xFF, 0xFF, 150, 0xFF, 0x7F, 0xFF, 0x20]]);

    let settings = equipment(&session).settings.unwrap();
    assert!(close(settings.cycle_length, 1.5));
    assert!(settings.incline.is_nan());
    assert!(settings.resistance.is_nan());
}

#[test]
fn treadmill_vertical_distance() {
    let session = replay(&[
        [0x13, 0xFF, 0xFF, 0xFF, 80, 250, 10, 0x33],
        [0x13, 0xFF, 0xFF, 0xFF, 82, 4, 30, 0x33],
    ]);

    let Equipment::Treadmill(treadmill) = equipment(&session).equipment else {
        panic!("not a treadmill");
    };

    assert_eq!(treadmill.cadence, Some(82));
    assert!(close(treadmill.descent(), 1.0));
    assert!(close(treadmill.ascent(), 2.0));
    assert!(treadmill.transmits_descent);
    assert!(treadmill.transmits_ascent);
}
