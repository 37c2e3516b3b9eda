//! Fuzz target: wire record parser
//!
//! Feeds arbitrary bytes to `StatusRecord::from_wire` and verifies:
//! - No panics under arbitrary input
//! - Anything that parses re-serialises into the record buffer
//! - The re-serialised record parses back to the same timestamp and status
//!
//! cargo fuzz run fuzz_status_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use watersensor::app::record::StatusRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(record) = StatusRecord::from_wire(text) else {
        return;
    };

    // Values beyond f32 range parse to infinity, which has no JSON form.
    let values = [
        record.ph,
        record.temperature,
        record.tds,
        record.turbidity,
        record.vibration,
    ];
    if !values.iter().all(|v| v.is_finite()) {
        return;
    }

    let Ok(json) = record.to_wire_json() else {
        // Huge magnitudes can overflow the fixed buffer; that is a
        // reported error, not a panic.
        return;
    };
    let back = StatusRecord::from_wire(&json).expect("own output must parse");
    assert_eq!(back.timestamp_ms, record.timestamp_ms);
    assert_eq!(back.water_status, record.water_status);
    assert_eq!(back.vibration_detected, record.vibration_detected);
});
