#![no_main]

use fiskal::num::{Amount, Percentage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(p) = s.parse::<Percentage>() {
            let _ = p.to_string();
            let _ = Amount::new(10_000, 2).checked_multiply(p.base());
        }
    }
});
