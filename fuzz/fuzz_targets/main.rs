#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|s: &str| {
    let first = eval::parse(s);
    assert_eq!(first, eval::parse(s));
});
