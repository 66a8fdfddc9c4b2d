#![no_main]

use fiskal::num::Amount;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything that parses must print back to the same value.
        if let Ok(a) = s.parse::<Amount>() {
            let back: Amount = a.to_string().parse().expect("display output parses");
            assert_eq!((back.value(), back.exp()), (a.value(), a.exp()));
            let _ = a.checked_rescale(a.exp().saturating_add(3));
            let _ = a.checked_multiply(a);
        }
    }
});
