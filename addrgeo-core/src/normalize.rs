//! Construction of canonical address strings.
//!
//! Each text segment runs through the same passes, in this order:
//!
//! 1. umlaut substitution (`ä` → `ae`, `Ä` → `Ae`, `ß` → `ss`, ...)
//! 2. street suffix abbreviation (`straße`, `Strasse`, ... → `str.`)
//! 3. whitespace collapse and trim
//! 4. punctuation repair (no space before a comma, exactly one space
//!    after it, no repeated or dangling commas)

use crate::{entities::*, FormatError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STREET_SUFFIX_REGEX: Regex = Regex::new(r"(?i)stra(?:ss|ß)e\b").unwrap();
    static ref BLANK_RUN_REGEX: Regex = Regex::new(r"\s+").unwrap();
    static ref SPACE_BEFORE_COMMA_REGEX: Regex = Regex::new(r"\s+,").unwrap();
    static ref REPEATED_COMMA_REGEX: Regex = Regex::new(r",(?:\s*,)+").unwrap();
    static ref SPACE_AFTER_COMMA_REGEX: Regex = Regex::new(r",\s*").unwrap();
}

const STREET_SUFFIX_ABBREVIATION: &str = "str.";
const GERMAN_POSTAL_CODE_LEN: usize = 5;

fn replace_umlauts(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'Ä' => out.push_str("Ae"),
            'Ö' => out.push_str("Oe"),
            'Ü' => out.push_str("Ue"),
            'ß' => out.push_str("ss"),
            'ẞ' => out.push_str("SS"),
            _ => out.push(c),
        }
    }
    out
}

fn abbreviate_street_suffix(s: &str) -> String {
    STREET_SUFFIX_REGEX
        .replace_all(s, STREET_SUFFIX_ABBREVIATION)
        .into_owned()
}

fn collapse_whitespace(s: &str) -> String {
    BLANK_RUN_REGEX.replace_all(s, " ").trim().to_owned()
}

fn repair_punctuation(s: &str) -> String {
    let s = SPACE_BEFORE_COMMA_REGEX.replace_all(s, ",");
    let s = REPEATED_COMMA_REGEX.replace_all(&s, ",");
    let s = s.trim_matches(|c: char| c == ',' || c.is_whitespace());
    SPACE_AFTER_COMMA_REGEX.replace_all(s, ", ").into_owned()
}

/// Applies all normalization passes to free text.
pub fn normalize_text(s: &str) -> String {
    let s = replace_umlauts(s);
    let s = abbreviate_street_suffix(&s);
    let s = collapse_whitespace(&s);
    repair_punctuation(&s)
}

// Floats at or above this are not house numbers.
const HOUSE_NUMBER_MAX: f64 = 1e9;

fn parse_integral(s: &str) -> Option<String> {
    if let Ok(n) = s.parse::<u64>() {
        return Some(n.to_string());
    }
    let f = s
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f < HOUSE_NUMBER_MAX)?;
    Some(format!("{}", f.trunc() as u64))
}

/// Renders a house number as plain integer text.
///
/// Spreadsheet exports often turn `12` into `12.0`, so any decimal
/// component is discarded. Negative numbers are rejected.
pub fn normalize_house_number(raw: &str) -> Result<String, FormatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    parse_integral(raw).ok_or_else(|| FormatError::HouseNumber(raw.to_owned()))
}

/// A house number suffix is at most a single letter.
pub fn normalize_house_number_suffix(raw: &str) -> Result<String, FormatError> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(String::new()),
        (Some(c), None) if c.is_alphabetic() => Ok(raw.to_owned()),
        _ => Err(FormatError::HouseNumberSuffix(raw.to_owned())),
    }
}

/// Keeps a postal code as opaque digit text.
///
/// Leading zeros are preserved. The only accepted decoration is a
/// zero-only decimal tail like `.0` left behind by float-typed columns.
pub fn normalize_postal_code(raw: &str) -> Result<String, FormatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let digits = match raw.split_once('.') {
        None if is_digits(raw) => raw,
        Some((int, frac)) if is_digits(int) && is_digits(frac) && frac.bytes().all(|b| b == b'0') => {
            int
        }
        _ => return Err(FormatError::PostalCode(raw.to_owned())),
    };
    if digits.len() < GERMAN_POSTAL_CODE_LEN {
        log::warn!(
            "Postal code '{digits}' has less than {GERMAN_POSTAL_CODE_LEN} digits, leading zeros might have been lost upstream"
        );
    }
    Ok(digits.to_owned())
}

fn field(x: &Option<String>) -> &str {
    x.as_deref().map(str::trim).unwrap_or_default()
}

fn join_words<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the canonical form of a structured address:
///
/// `<street> <house_number><suffix>, <postal_code> <city>, <state>, <country>`
///
/// Missing fields are skipped without leaving separators behind.
pub fn canonicalize(addr: &AddressRecord) -> Result<CanonicalAddress, FormatError> {
    if addr.is_empty() {
        return Ok(CanonicalAddress::default());
    }
    let AddressRecord {
        street,
        house_number,
        house_number_suffix,
        postal_code,
        city,
        state,
        country,
    } = addr;
    let number = format!(
        "{}{}",
        normalize_house_number(field(house_number))?,
        normalize_house_number_suffix(field(house_number_suffix))?
    );
    let postal_code = normalize_postal_code(field(postal_code))?;
    let segments = [
        join_words([field(street), number.as_str()]),
        join_words([postal_code.as_str(), field(city)]),
        field(state).to_owned(),
        field(country).to_owned(),
    ];
    Ok(CanonicalAddress::from_segments(
        segments.iter().map(|s| normalize_text(s)),
    ))
}

/// Builds the canonical form of an address that has already been merged
/// into a single line, e.g. by an earlier run.
pub fn canonicalize_merged(address: &str) -> CanonicalAddress {
    let normalized = normalize_text(address);
    CanonicalAddress::from_segments(normalized.split(',').map(str::trim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrgeo_entities::builders::*;

    fn kurfuerstendamm() -> AddressRecord {
        AddressRecord::build()
            .street("Kurfürstendamm")
            .house_number("12")
            .house_number_suffix("")
            .postal_code("10719")
            .city("Berlin")
            .state("Berlin")
            .country("Germany")
            .finish()
    }

    #[test]
    fn canonicalize_full_record() {
        let addr = canonicalize(&kurfuerstendamm()).unwrap();
        assert_eq!(
            "Kurfuerstendamm 12, 10719 Berlin, Berlin, Germany",
            addr.to_string()
        );
        assert_eq!(4, addr.segments().len());
    }

    #[test]
    fn house_number_suffix_is_attached() {
        let mut record = kurfuerstendamm();
        record.house_number_suffix = Some("a".into());
        let addr = canonicalize(&record).unwrap().to_string();
        assert!(addr.contains("12a"));
        assert!(addr.starts_with("Kurfuerstendamm 12a,"));
    }

    #[test]
    fn float_house_numbers_are_truncated() {
        assert_eq!("12", normalize_house_number("12").unwrap());
        assert_eq!("12", normalize_house_number("12.0").unwrap());
        assert_eq!("12", normalize_house_number(" 12.7 ").unwrap());
        assert_eq!("", normalize_house_number("").unwrap());
        assert_eq!("", normalize_house_number("  ").unwrap());
    }

    #[test]
    fn non_numeric_house_number_is_a_format_error() {
        assert_eq!(
            Err(FormatError::HouseNumber("12a".into())),
            normalize_house_number("12a")
        );
        assert!(normalize_house_number("inf").is_err());
        assert!(normalize_house_number("NaN").is_err());
        assert!(normalize_house_number("-5").is_err());
        assert!(normalize_house_number("-5.0").is_err());
        assert!(normalize_house_number("1e30").is_err());

        let mut record = kurfuerstendamm();
        record.house_number = Some("twelve".into());
        assert_eq!(
            Err(FormatError::HouseNumber("twelve".into())),
            canonicalize(&record)
        );
    }

    #[test]
    fn house_number_suffix_is_a_single_letter() {
        assert_eq!("a", normalize_house_number_suffix(" a ").unwrap());
        assert_eq!("B", normalize_house_number_suffix("B").unwrap());
        assert_eq!("", normalize_house_number_suffix("").unwrap());
        assert_eq!(
            Err(FormatError::HouseNumberSuffix("7".into())),
            normalize_house_number_suffix("7")
        );
        assert!(normalize_house_number_suffix("ab").is_err());
        assert!(normalize_house_number_suffix("-").is_err());

        let mut record = kurfuerstendamm();
        record.house_number_suffix = Some("7".into());
        assert_eq!(
            Err(FormatError::HouseNumberSuffix("7".into())),
            canonicalize(&record)
        );
    }

    #[test]
    fn postal_codes_keep_leading_zeros() {
        assert_eq!("01067", normalize_postal_code("01067").unwrap());
        assert_eq!("01067", normalize_postal_code("01067.0").unwrap());
        assert_eq!("10719", normalize_postal_code("10719.00").unwrap());
        assert_eq!("", normalize_postal_code("").unwrap());
    }

    #[test]
    fn invalid_postal_codes() {
        assert!(normalize_postal_code("10719.5").is_err());
        assert!(normalize_postal_code("D-10719").is_err());
        assert!(normalize_postal_code(".0").is_err());
        assert!(normalize_postal_code("1e4").is_err());
    }

    #[test]
    fn replace_all_umlauts() {
        let text = normalize_text("ä ö ü ß Ä Ö Ü");
        assert_eq!("ae oe ue ss Ae Oe Ue", text);
        for c in ['ä', 'ö', 'ü', 'ß', 'Ä', 'Ö', 'Ü'] {
            assert!(!text.contains(c));
        }
    }

    #[test]
    fn abbreviate_street_suffixes() {
        assert_eq!("Friedrichstr.", normalize_text("Friedrichstraße"));
        assert_eq!("Torstr.", normalize_text("Torstrasse"));
        assert_eq!("Potsdamer str.", normalize_text("Potsdamer Straße"));
        assert_eq!("Leipziger str.", normalize_text("Leipziger STRASSE"));
        assert_eq!("Strassenbahnweg", normalize_text("Strassenbahnweg"));
    }

    #[test]
    fn collapse_whitespace_and_repair_commas() {
        assert_eq!("a, b", normalize_text("  a   ,   b  "));
        assert_eq!("a, b", normalize_text("a , , b"));
        assert_eq!("a, b", normalize_text(",a,,b,"));
        assert_eq!("a, b", normalize_text("a,b"));
        assert_eq!("a b", normalize_text("a\t\n b"));
    }

    #[test]
    fn empty_state_leaves_no_double_comma() {
        let mut record = kurfuerstendamm();
        record.state = None;
        let addr = canonicalize(&record).unwrap().to_string();
        assert_eq!("Kurfuerstendamm 12, 10719 Berlin, Germany", addr);
    }

    #[test]
    fn no_stray_separators_for_any_subset_of_fields() {
        let full = kurfuerstendamm();
        for mask in 0u8..(1 << 7) {
            let pick = |bit: u8, x: &Option<String>| {
                if mask & (1 << bit) != 0 {
                    x.clone()
                } else {
                    None
                }
            };
            let record = AddressRecord {
                street: pick(0, &full.street),
                house_number: pick(1, &full.house_number),
                house_number_suffix: pick(2, &Some("b".into())),
                postal_code: pick(3, &full.postal_code),
                city: pick(4, &full.city),
                state: pick(5, &full.state),
                country: pick(6, &full.country),
            };
            let s = canonicalize(&record).unwrap().to_string();
            assert!(!s.contains(",,"), "{s}");
            assert!(!s.contains(", ,"), "{s}");
            assert!(!s.contains("  "), "{s}");
            assert!(!s.starts_with(','), "{s}");
            assert!(!s.ends_with(','), "{s}");
            assert!(!s.starts_with(' '), "{s}");
            assert!(!s.ends_with(' '), "{s}");
        }
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let records = [
            kurfuerstendamm(),
            AddressRecord::build()
                .street("  Schönhauser   Allee ")
                .house_number("44.0")
                .house_number_suffix("c")
                .postal_code("10435")
                .city("Berlin")
                .country("Germany")
                .finish(),
            AddressRecord::build()
                .street("Warschauer Straße")
                .postal_code("01067.0")
                .city("Dresden")
                .finish(),
        ];
        for record in &records {
            let once = canonicalize(record).unwrap().to_string();
            let twice = canonicalize_merged(&once).to_string();
            assert_eq!(once, twice);
            let single_field = AddressRecord {
                street: Some(once.clone()),
                ..Default::default()
            };
            assert_eq!(once, canonicalize(&single_field).unwrap().to_string());
        }
    }

    #[test]
    fn comma_inside_a_field_is_idempotent() {
        let record = AddressRecord::build()
            .street("Am Markt,Hinterhaus")
            .house_number("3")
            .postal_code("10719")
            .city("Berlin")
            .finish();
        let once = canonicalize(&record).unwrap().to_string();
        assert_eq!("Am Markt, Hinterhaus 3, 10719 Berlin", once);
        assert_eq!(once, canonicalize_merged(&once).to_string());
    }

    #[test]
    fn canonicalize_merged_splits_segments() {
        let addr = canonicalize_merged(" Torstraße 5 ,10119 Berlin,, Berlin , Germany,");
        assert_eq!(
            vec!["Torstr. 5", "10119 Berlin", "Berlin", "Germany"],
            addr.segments()
        );
        assert_eq!("Torstr. 5, 10119 Berlin, Berlin, Germany", addr.to_string());
        assert!(canonicalize_merged(" , ").is_empty());
    }

    #[test]
    fn empty_record_yields_empty_address() {
        assert!(canonicalize(&AddressRecord::default()).unwrap().is_empty());
    }
}
