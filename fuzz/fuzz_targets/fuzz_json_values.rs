#![no_main]

use fiskal::num::{Amount, Percentage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are bugs.
    if let Ok(a) = serde_json::from_slice::<Amount>(data) {
        let _ = serde_json::to_string(&a);
    }
    if let Ok(p) = serde_json::from_slice::<Percentage>(data) {
        let json = serde_json::to_string(&p).expect("percentage serializes");
        // Whole fractions near the i64 limit cannot be written as percent.
        if let Ok(back) = serde_json::from_str::<Percentage>(&json) {
            assert_eq!(back, p);
        }
    }
});
