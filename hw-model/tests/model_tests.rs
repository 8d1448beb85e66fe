// Licensed under the Apache-2.0 license

use histogram_emu_bus::Bus;
use histogram_emu_periph::{DrainPolicy, HistogramConfig, BIN_COUNT};
use histogram_emu_types::EmuSize;
use histogram_hw_model::{DefaultHwModel, HwModel, InitParams, ModelError};

const TIMEOUT: u64 = 5000;

fn run_model(config: HistogramConfig) -> DefaultHwModel {
    histogram_hw_model::new(InitParams {
        config,
        ..Default::default()
    })
    .unwrap()
}

fn default_model() -> DefaultHwModel {
    run_model(HistogramConfig::default())
}

fn retain_model() -> DefaultHwModel {
    run_model(HistogramConfig {
        drain_policy: DrainPolicy::Retain,
        ..Default::default()
    })
}

fn assert_only(values: &[u8; BIN_COUNT], expected: &[(usize, u8)]) {
    for (bin, value) in values.iter().enumerate() {
        let want = expected
            .iter()
            .find(|(b, _)| *b == bin)
            .map_or(0, |(_, v)| *v);
        assert_eq!(*value, want, "bin {bin}");
    }
}

#[test]
fn test_fill_wide_bin_to_overflow() {
    let mut model = default_model();
    for _ in 0..256 {
        model.write_bin(5, true);
    }
    let capture = model.capture_drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[(5, 255)]);
}

#[test]
fn test_fill_narrow_bin_to_overflow() {
    let mut model = default_model();
    for _ in 0..16 {
        model.write_bin(15, true);
    }
    let capture = model.capture_drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[(15, 15)]);
}

#[test]
fn test_width_boundary() {
    let mut model = default_model();
    for _ in 0..100 {
        model.write_bin(9, true);
    }
    for _ in 0..10 {
        model.write_bin(10, true);
    }
    let capture = model.drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[(9, 100), (10, 10)]);
}

#[test]
fn test_edge_bins() {
    let mut model = default_model();
    let expected = [(0, 10), (9, 10), (10, 10), (63, 10)];
    for (bin, count) in expected {
        for _ in 0..count {
            model.write_bin(bin as u8, true);
        }
    }
    let capture = model.drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &expected);
}

#[test]
fn test_write_enable_gating() {
    let mut model = default_model();
    for _ in 0..256 {
        model.write_bin(5, false);
    }
    assert_eq!(
        model.capture_drain(200),
        Err(ModelError::DrainTimeout { cycles: 200 })
    );
    let capture = model.drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[]);
}

#[test]
fn test_successive_drains_report_new_counts() {
    let mut model = default_model();
    for _ in 0..100 {
        model.write_bin(9, true);
    }
    assert_eq!(model.drain(TIMEOUT).unwrap().value(9), 100);

    for _ in 0..10 {
        model.write_bin(9, true);
    }
    assert_eq!(model.drain(TIMEOUT).unwrap().value(9), 10);
}

#[test]
fn test_retained_counts_accumulate() {
    let mut model = retain_model();
    for _ in 0..3 {
        model.write_bin(40, true);
    }
    assert_eq!(model.drain(TIMEOUT).unwrap().value(40), 3);
    model.write_bin(40, true);
    assert_eq!(model.drain(TIMEOUT).unwrap().value(40), 4);
}

#[test]
fn test_saturation_without_overflow_drain() {
    let mut model = run_model(HistogramConfig {
        overflow_drain: false,
        ..Default::default()
    });
    for _ in 0..300 {
        model.write_bin(3, true);
    }
    for _ in 0..20 {
        model.write_bin(30, true);
    }
    assert_eq!(model.take_drain(), None);
    let capture = model.drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[(3, 255), (30, 15)]);
}

#[test]
fn test_drain_order_and_framing() {
    let mut model = retain_model();
    // Give each narrow bin a distinct value so order is visible.
    for bin in 10..BIN_COUNT as u8 {
        for _ in 0..(bin % 15) {
            model.write_bin(bin, true);
        }
    }

    model.request_drain();
    let mut beats = vec![];
    let mut last_count = 0;
    for _ in 0..BIN_COUNT + 10 {
        model.step();
        let status = model.status();
        if status.valid {
            assert!(!status.ready);
            beats.push(model.output().uo_out);
        }
        if status.last_bin {
            assert!(status.valid);
            last_count += 1;
            assert_eq!(beats.len(), BIN_COUNT);
        }
    }
    assert_eq!(last_count, 1);
    assert_eq!(beats.len(), BIN_COUNT);
    for (bin, value) in beats.iter().enumerate().skip(10) {
        assert_eq!(*value as usize, bin % 15);
    }
    assert!(model.status().ready);
}

#[test]
fn test_out_of_range_index_is_masked() {
    let mut model = default_model();
    let input = model.input();
    input.ui_in = 0x80;
    input.uio_in = 0x40 | 7;
    model.step_n(2);
    model.drive(0, false, false);
    model.step();
    assert_eq!(model.drain(TIMEOUT).unwrap().value(7), 1);
}

#[test]
fn test_disabled_device() {
    let mut model = default_model();
    model.set_enable(false);
    for _ in 0..10 {
        model.write_bin(2, true);
    }
    model.request_drain();
    assert!(model.capture_drain(200).is_err());

    model.set_enable(true);
    let capture = model.drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[]);
}

#[test]
fn test_reset_while_disabled() {
    let mut model = default_model();
    model.set_enable(false);
    model.apply_reset(10);
    assert!(model.is_settled());
    assert!(!model.status().ready);

    model.set_enable(true);
    model.step();
    assert!(model.status().ready);
}

#[test]
fn test_capture_with_unbounded_timeout() {
    let mut model = default_model();
    for _ in 0..15 {
        model.write_bin(20, true);
    }
    let capture = model.capture_drain(u64::MAX).unwrap();
    assert_only(&capture.values, &[(20, 15)]);
}

#[test]
fn test_reset_within_budget() {
    let mut model = run_model(HistogramConfig {
        reset_settle_cycles: 1000,
        ..Default::default()
    });
    let start = model.cycle_count();
    assert!(!model.reset_within(10, 50));
    assert_eq!(model.cycle_count(), start + 50);
    assert!(!model.is_settled());

    assert!(model.reset_within(10, 2000));
    assert!(model.is_settled());
}

#[test]
fn test_drain_freezes_while_disabled() {
    let mut model = retain_model();
    model.write_bin(1, true);
    model.request_drain();
    model.step_n(20);
    model.set_enable(false);
    assert_eq!(
        model.capture_drain(500),
        Err(ModelError::IncompleteDrain { received: 20 })
    );

    model.set_enable(true);
    let capture = model.capture_drain(TIMEOUT).unwrap();
    assert_only(&capture.values, &[(1, 1)]);
}

#[test]
fn test_reset_mid_drain() {
    let mut model = retain_model();
    for _ in 0..5 {
        model.write_bin(33, true);
    }
    model.request_drain();
    model.step_n(30);
    model.apply_reset(10);
    assert_eq!(model.partial_drain_len(), 0);
    assert_eq!(
        model.capture_drain(200),
        Err(ModelError::DrainTimeout { cycles: 200 })
    );
    assert_only(&model.drain(TIMEOUT).unwrap().values, &[]);
}

#[test]
fn test_reset_is_idempotent() {
    let mut model = default_model();
    model.write_bin(12, true);
    model.apply_reset(10);
    model.apply_reset(3);
    assert!(model.status().ready);
    assert_only(&model.drain(TIMEOUT).unwrap().values, &[]);
}

#[test]
fn test_settle_window_drops_writes() {
    let mut model = run_model(HistogramConfig {
        reset_settle_cycles: 8,
        ..Default::default()
    });
    model.input().rst_n = false;
    model.step_n(10);
    model.input().rst_n = true;
    // Both writes land before the settle window closes.
    model.write_bin(20, true);
    model.write_bin(20, true);
    assert!(!model.status().ready);
    model.step_until(|m| m.status().ready);
    model.write_bin(20, true);
    assert_eq!(model.drain(TIMEOUT).unwrap().value(20), 1);
}

#[test]
fn test_register_view() {
    let mut model = default_model();
    {
        let mut bus = model.reg_bus();
        assert_eq!(bus.read(EmuSize::Byte, 0x02).unwrap(), 0b11);
        assert_eq!(bus.read(EmuSize::Byte, 0x06).unwrap(), 0x0f);
        bus.write(EmuSize::Byte, 0x01, 50).unwrap();
        bus.write(EmuSize::Byte, 0x00, 0x80).unwrap();
    }
    model.step();
    model.reg_bus().write(EmuSize::Byte, 0x00, 0).unwrap();
    model.step();

    assert!(model.reg_bus().read(EmuSize::Word, 0x04).is_err());
    assert!(model.reg_bus().write(EmuSize::Byte, 0x05, 0).is_err());
    assert_eq!(model.drain(TIMEOUT).unwrap().value(50), 1);
}
