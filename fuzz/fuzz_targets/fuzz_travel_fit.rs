#![no_main]
use libfuzzer_sys::fuzz_target;
use lift_config::{TravelCalibration, TravelRow};

fuzz_target!(|pairs: Vec<(f64, f64)>| {
    let rows: Vec<TravelRow> = pairs
        .into_iter()
        .map(|(percent, seconds)| TravelRow { percent, seconds })
        .collect();
    // Any accepted fit must be usable as a calibration constant.
    if let Ok(fit) = TravelCalibration::from_rows(&rows) {
        assert!(fit.seconds_per_percent.is_finite() && fit.seconds_per_percent > 0.0);
        assert!(fit.inliers >= 1 && fit.inliers <= rows.len());
    }
});
