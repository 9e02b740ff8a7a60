#![no_main]

use ctw::utils::bits::{format_bits, parse_bits};
use ctw::Predictor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    // Garbage must be rejected, never crash.
    if let Ok(bits) = parse_bits(&text) {
        let clean: String =
            text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        assert_eq!(format_bits(&bits), clean);
        let _ = Predictor::new(&bits, 3);
    }
});
