#![no_main]

use libfuzzer_sys::fuzz_target;
use jarscope::{classfile::decode_class, profile::{profile_class, ProfileConfig}, scanner::scan_class_references};

fuzz_target!(|data: &[u8]| {
    if let Ok(class) = decode_class(data) {
        let _ = scan_class_references(&class);
        let _ = profile_class(&class, &ProfileConfig::default());
    }
});
