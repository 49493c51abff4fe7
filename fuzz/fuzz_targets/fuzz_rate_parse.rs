#![no_main]

use libfuzzer_sys::fuzz_target;

use drip_types::Rate;

// Any string either parses to a rate that displays back to itself, or errors.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(rate) = text.parse::<Rate>() {
        let shown = rate.to_string();
        assert_eq!(shown.parse::<Rate>(), Ok(rate));
    }
});
