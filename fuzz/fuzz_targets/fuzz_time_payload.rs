//! Fuzz target: `TimeReading::from_json` and `parse_datetime`
//!
//! Drives arbitrary bytes through the time-service payload parser and
//! asserts that it never panics and never accepts a reading that fails
//! range validation.  Valid UTF-8 inputs are also fed to the bare
//! datetime splitter, which must simply not panic.
//!
//! cargo fuzz run fuzz_time_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use netclock::app::reading::parse_datetime;
use netclock::app::TimeReading;
use netclock::calendar;

fuzz_target!(|data: &[u8]| {
    if let Ok(reading) = TimeReading::from_json(data) {
        assert!(reading.validate().is_ok(), "accepted an out-of-range reading");
        // Every accepted date must exist on the calendar.
        let days = calendar::days_from_civil(i32::from(reading.year), reading.month, reading.day);
        assert_eq!(
            calendar::civil_from_days(days),
            (i32::from(reading.year), reading.month, reading.day)
        );
    }

    if let Ok(s) = core::str::from_utf8(data) {
        // Range checks belong to `validate`; the splitter only has to
        // return rather than panic.
        let _ = parse_datetime(s);
    }
});
