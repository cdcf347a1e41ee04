#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<lift_config::Config>(data) {
        if cfg.validate().is_ok() {
            let _ = cfg.missing_channels();
            let _ = cfg.calibration_path(std::path::Path::new("."));
        }
    }
});
