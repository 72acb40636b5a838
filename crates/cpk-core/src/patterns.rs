//! Line patterns for the test-log convention
//!
//! Every pattern is anchored at the start of the line. The order of
//! [`LINE_PATTERNS`] decides which pattern claims a line when several could.

use lazy_static::lazy_static;
use regex::Regex;

/// Field separator used by usage lines and data lines.
pub const FIELD_SEPARATOR: char = ';';

/// Number of usage lines a well-formed log carries.
pub const USAGE_LINE_COUNT: usize = 4;

/// Which bucket a matched line feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    StVersion,
    RhelVersion,
    Workstation,
    Timestamp,
    TestSession,
    RunNumber,
    UsageLine,
    Data,
}

lazy_static! {
    /// ST version banner
    static ref ST_VERSION: Regex = Regex::new(r"^  ST Version: (?P<value>.+)").unwrap();

    /// RHEL version banner
    static ref RHEL_VERSION: Regex = Regex::new(r"^RHEL version: (?P<value>.+)").unwrap();

    /// Workstation banner
    static ref WORKSTATION: Regex = Regex::new(r"^ Workstation: (?P<value>.+)").unwrap();

    /// Session start timestamp, split into date and time
    static ref TIMESTAMP: Regex = Regex::new(
        r#"^TestSessionData\.StartTimeStamp="(?P<value>(?P<date>[0-9-]{10}) (?P<time>[0-9:.]{11}))"#
    )
    .unwrap();

    /// Hardware identification record of the test session
    static ref TEST_SESSION: Regex = Regex::new(concat!(
        r#"^TestSessionData\.(?P<hw_ids>.+)=""#,
        r"(?:HighLevelSerialNumber = (?P<high_level_serial_number>[-A-Z0-9 ]+)",
        r"(?:, Vendor = (?P<vendor>[A-Z0-9]{2}), PartNumber = (?P<part_number>[-A-Z0-9]{10,12}), ",
        r"SerialNumber = (?P<serial_number>[0-9]{1,6}), EdcOracle = (?P<edc_oracle>[0-9]{1,3}), ",
        r"ManufacturerProductionDate = (?P<manufacturer_production_date>[0-9]{0,3})",
        r"(?:(?:, FpgaBundle = (?P<fpga_bundle>.+))|(?:, FpgaRevision = (?P<fpga_revision>.+)))?)?)",
        r#"""#,
    ))
    .unwrap();

    /// Run number separator line
    static ref RUN_NUMBER: Regex = Regex::new(r"^[*]+ Run Number: (?P<value>[0-9]+)").unwrap();

    /// One of the four usage lines (`#1:` .. `#4:`)
    static ref USAGE_LINE: Regex = Regex::new(r"^#(?P<index>[1-4]):.+").unwrap();

    /// Measurement row, prefixed by its pass/fail marker
    static ref DATA_LINE: Regex = Regex::new(r"^[PF]_;>>;.+").unwrap();

    /// Ordered classifier table; first match wins.
    pub static ref LINE_PATTERNS: Vec<(LineKind, &'static Regex)> = vec![
        (LineKind::StVersion, &*ST_VERSION),
        (LineKind::RhelVersion, &*RHEL_VERSION),
        (LineKind::Workstation, &*WORKSTATION),
        (LineKind::Timestamp, &*TIMESTAMP),
        (LineKind::TestSession, &*TEST_SESSION),
        (LineKind::RunNumber, &*RUN_NUMBER),
        (LineKind::UsageLine, &*USAGE_LINE),
        (LineKind::Data, &*DATA_LINE),
    ];

    /// Short column code: one category letter followed by digits
    pub static ref COLUMN_CODE: Regex = Regex::new(r"^(?P<letter>[mAULRs])(?P<suffix>[0-9]+)$").unwrap();
}

/// Classify a line against [`LINE_PATTERNS`].
///
/// Returns the kind of the first matching pattern together with its captures,
/// or `None` when no pattern applies and the line should be ignored.
pub fn classify(line: &str) -> Option<(LineKind, regex::Captures<'_>)> {
    LINE_PATTERNS
        .iter()
        .find_map(|(kind, pattern)| pattern.captures(line).map(|caps| (*kind, caps)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_metadata_lines() {
        let (kind, caps) = classify("  ST Version: 4.2.1").unwrap();
        assert_eq!(kind, LineKind::StVersion);
        assert_eq!(&caps["value"], "4.2.1");

        let (kind, _) = classify("RHEL version: 7.6").unwrap();
        assert_eq!(kind, LineKind::RhelVersion);

        let (kind, caps) = classify(" Workstation: lab-17").unwrap();
        assert_eq!(kind, LineKind::Workstation);
        assert_eq!(&caps["value"], "lab-17");
    }

    #[test]
    fn test_classify_timestamp_before_session() {
        let line = r#"TestSessionData.StartTimeStamp="2018-08-14 12:52:35.123""#;
        let (kind, caps) = classify(line).unwrap();
        assert_eq!(kind, LineKind::Timestamp);
        assert_eq!(&caps["date"], "2018-08-14");
        assert_eq!(&caps["time"], "12:52:35.123");
    }

    #[test]
    fn test_classify_test_session() {
        let line = concat!(
            r#"TestSessionData.Board1="HighLevelSerialNumber = MY-1234, Vendor = AB, "#,
            r#"PartNumber = N2601-66601, SerialNumber = 1065, EdcOracle = 12, "#,
            r#"ManufacturerProductionDate = 123, FpgaRevision = 7.1""#
        );
        let (kind, caps) = classify(line).unwrap();
        assert_eq!(kind, LineKind::TestSession);
        assert_eq!(&caps["hw_ids"], "Board1");
        assert_eq!(&caps["vendor"], "AB");
        assert_eq!(&caps["serial_number"], "1065");
        assert_eq!(caps.name("fpga_revision").map(|m| m.as_str()), Some("7.1"));
        assert!(caps.name("fpga_bundle").is_none());
    }

    #[test]
    fn test_classify_empty_session_record() {
        let (kind, caps) = classify(r#"TestSessionData.Slot3="""#).unwrap();
        assert_eq!(kind, LineKind::TestSession);
        assert_eq!(&caps["hw_ids"], "Slot3");
        assert!(caps.name("high_level_serial_number").is_none());
    }

    #[test]
    fn test_classify_test_data_lines() {
        let (kind, caps) = classify("***** Run Number: 12").unwrap();
        assert_eq!(kind, LineKind::RunNumber);
        assert_eq!(&caps["value"], "12");

        let (kind, caps) = classify("#3:whatever;else").unwrap();
        assert_eq!(kind, LineKind::UsageLine);
        assert_eq!(&caps["index"], "3");

        assert_eq!(classify("P_;>>;1;2;3").unwrap().0, LineKind::Data);
        assert_eq!(classify("F_;>>;1;2;3").unwrap().0, LineKind::Data);
    }

    #[test]
    fn test_classify_ignores_unknown_lines() {
        assert!(classify("").is_none());
        assert!(classify("#5:not a usage line").is_none());
        assert!(classify("X_;>>;1;2").is_none());
        assert!(classify("random text").is_none());
    }

    #[test]
    fn test_column_code_full_match() {
        assert!(COLUMN_CODE.is_match("A1"));
        assert!(COLUMN_CODE.is_match("s0"));
        assert!(COLUMN_CODE.is_match("m12"));
        assert!(!COLUMN_CODE.is_match("A"));
        assert!(!COLUMN_CODE.is_match("A1x"));
        assert!(!COLUMN_CODE.is_match("#1:A1"));
        assert!(!COLUMN_CODE.is_match("S1"));
    }
}
