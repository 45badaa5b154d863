#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Interpret the input as panel readout text
    if let Ok(text) = std::str::from_utf8(data) {
        // Exercise the interpreters; none of them may panic on any input
        let _ = hestia::readout::parse_param(text);
        let _ = hestia::readout::parse_setting(text);
        let _ = hestia::readout::classify_status(text);
        let _ = hestia::readout::extract_rgb(text);
    }
});
