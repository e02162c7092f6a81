//! Validation warnings reach the `log` facade.
//!
//! Installs its own logger, so it lives in a separate test binary.

use std::sync::Mutex;

use thickline::*;

struct CaptureLogger {
    records: Mutex<Vec<(log::Level, String)>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn warnings() -> Vec<String> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == log::Level::Warn)
        .map(|(_, message)| message.clone())
        .collect()
}

#[test]
fn validation_warnings_are_logged() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(log::LevelFilter::Warn);

    // Finite input stays quiet.
    let mut geometry = SegmentGeometry::from_line_segments(&[Vec3::ZERO, Vec3::X]);
    geometry.compute_bounding_sphere();
    assert!(warnings().is_empty());

    // A NaN coordinate is reported when the bounds are recomputed, and the
    // radius is still stored.
    geometry.set_points(&[Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0)]);
    assert!(geometry.bounding_sphere().unwrap().radius.is_nan());
    let logged = warnings();
    assert_eq!(logged.len(), 1, "expected one warning, got {logged:?}");
    assert!(logged[0].contains("compute_bounding_sphere"));
    assert!(logged[0].contains("NaN"));

    // A trailing partial instance is dropped with a warning.
    geometry.set_positions(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0]);
    assert_eq!(geometry.instance_count(), 1);
    assert_eq!(warnings().len(), 2);
}
