//! Decoding properties over valid and damaged class files.

mod common;

use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
};

use common::{service_class, Bytecode, ClassBuilder};
use jarscope::{
    classfile::{decode_class, decode_class_with, DecoderConfig},
    disassembler::opcodes::*,
    engine::{ClassInput, ScanEngine},
    rules::{RuleCatalog, SignaturePattern},
    scanner::scan_class_references,
    Error,
};

/// Tracks the largest single allocation made by the current thread.
struct PeakAllocation;

thread_local! {
    static PEAK: Cell<usize> = const { Cell::new(0) };
}

fn record(size: usize) {
    let _ = PEAK.try_with(|peak| peak.set(peak.get().max(size)));
}

unsafe impl GlobalAlloc for PeakAllocation {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOCATOR: PeakAllocation = PeakAllocation;

fn largest_allocation_while<T>(work: impl FnOnce() -> T) -> (T, usize) {
    PEAK.with(|peak| peak.set(0));
    let result = work();
    (result, PEAK.with(Cell::get))
}

/// Header and a `java/lang/Object` pool, cut off right after `tail`.
fn object_class_prefix(tail: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
    bytes.extend_from_slice(&[0x00, 0x03]);
    bytes.extend_from_slice(&[0x07, 0x00, 0x02]);
    bytes.push(0x01);
    bytes.extend_from_slice(&16u16.to_be_bytes());
    bytes.extend_from_slice(b"java/lang/Object");
    bytes.extend_from_slice(&[0x00, 0x21, 0x00, 0x01, 0x00, 0x00]);
    bytes.extend_from_slice(tail);
    bytes
}

#[test]
fn decoding_is_idempotent() {
    let bytes = service_class("com/acme/Service");
    let first = decode_class(&bytes).unwrap();
    let second = decode_class(&bytes).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.source_file.as_deref(), Some("Service.java"));
}

#[test]
fn every_truncation_is_malformed() {
    let bytes = service_class("com/acme/Service");
    for length in 0..bytes.len() {
        match decode_class(&bytes[..length]) {
            Err(Error::MalformedClass { offset, .. }) => {
                assert!(offset <= length, "offset {offset} past truncation at {length}");
            }
            other => panic!("truncation at {length}: expected MalformedClass, got {other:?}"),
        }
    }
}

#[test]
fn every_truncation_fails_lenient_decoding_too() {
    let bytes = service_class("com/acme/Service");
    let config = DecoderConfig::lenient();
    for length in 0..bytes.len() {
        assert!(
            decode_class_with(&bytes[..length], &config).is_err(),
            "truncation at {length} decoded"
        );
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = service_class("com/acme/Service");
    let end = bytes.len();
    bytes.push(0);
    assert!(matches!(
        decode_class(&bytes),
        Err(Error::MalformedClass { offset, .. }) if offset == end
    ));
}

#[test]
fn corrupt_reference_fails_only_its_file() {
    // invokevirtual pointing at a Fieldref survives decoding and fails the scan
    let mut builder = ClassBuilder::new("com/acme/Corrupt");
    let field = builder.field_ref("okhttp3/Call", "timeout", "J");
    let code = Bytecode::new()
        .op(ALOAD_0)
        .op_u16(INVOKEVIRTUAL, field)
        .op(RETURN)
        .build();
    let corrupt = builder.method(0x0001, "run", "()V", code).build();

    let class = decode_class(&corrupt).unwrap();
    assert!(matches!(
        scan_class_references(&class),
        Err(Error::CorruptReference { offset: 1, .. })
    ));

    let catalog = RuleCatalog::new([SignaturePattern::new("okhttp", "okhttp3/*")]).unwrap();
    let inputs = [
        ClassInput::new("bad.jar!/com/acme/Corrupt.class", corrupt),
        ClassInput::new("good.jar!/com/acme/Service.class", service_class("com/acme/Service")),
    ];
    let report = ScanEngine::new(&catalog).run(&inputs).unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].file, "bad.jar!/com/acme/Corrupt.class");
    assert!(report
        .findings_for("okhttp")
        .iter()
        .all(|finding| finding.file.starts_with("good.jar")));
    assert_eq!(report.findings_for("okhttp").len(), 1);
}

#[test]
fn unsupported_version_is_reported_per_file() {
    let future = ClassBuilder::new("com/acme/Future").version(99, 0).build();
    let catalog = RuleCatalog::empty();
    let report = ScanEngine::new(&catalog)
        .run(&[ClassInput::new("Future.class", future)])
        .unwrap();

    assert_eq!(report.files_scanned, 0);
    assert!(matches!(
        report.errors[0].error,
        Error::MalformedClass { offset: 4, .. }
    ));
}

#[test]
fn declared_counts_do_not_drive_allocation() {
    let inputs = [
        // methods_count = 0xFFFF
        object_class_prefix(&[0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF]),
        // fields_count = 0xFFFF
        object_class_prefix(&[0x00, 0x00, 0xFF, 0xFF]),
        // interfaces_count = 0xFFFF
        object_class_prefix(&[0xFF, 0xFF]),
        // constant_pool_count = 0xFFFF with a single entry present
        vec![
            0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34, 0xFF, 0xFF, 0x07, 0x00, 0x02,
        ],
    ];

    for bytes in &inputs {
        let (result, largest) = largest_allocation_while(|| decode_class(bytes));
        assert!(
            matches!(result, Err(Error::MalformedClass { .. })),
            "{} byte input decoded: {result:?}",
            bytes.len()
        );
        assert!(
            largest < 4096,
            "{} byte input made a {largest} byte allocation",
            bytes.len()
        );
    }
}
