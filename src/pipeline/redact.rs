use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::PHONE_MASK;
use crate::types::{FieldNames, RawRecord};

// Bare ten-digit number: keep the first three and last three digits
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{3})[0-9]{4}([0-9]{3})$").expect("phone pattern is valid")
});

/// Mask the middle four digits of a bare ten-digit phone number.
///
/// Anything else (other lengths, separators, letters, an already masked
/// value) is returned unchanged.
pub fn mask_phone(phone: &str) -> String {
    match PHONE_RE.captures(phone) {
        Some(caps) => format!("{}{}{}", &caps[1], PHONE_MASK, &caps[2]),
        None => phone.to_string(),
    }
}

/// Replace the publisher phone field with its masked form
pub fn redact_phone(mut record: RawRecord, fields: &FieldNames) -> RawRecord {
    if let Some(phone) = record.get(&fields.publisher_phone) {
        let masked = mask_phone(phone);
        record.insert(fields.publisher_phone.clone(), masked);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_ten_digits() {
        assert_eq!(mask_phone("9876543210"), "987****210");
    }

    #[test]
    fn test_wrong_length_is_unchanged() {
        assert_eq!(mask_phone("987654321"), "987654321");
        assert_eq!(mask_phone("98765432101"), "98765432101");
        assert_eq!(mask_phone(""), "");
    }

    #[test]
    fn test_non_digits_are_unchanged() {
        assert_eq!(mask_phone("987-654-3210"), "987-654-3210");
        assert_eq!(mask_phone("+919876543210"), "+919876543210");
        assert_eq!(mask_phone("98765abc10"), "98765abc10");
    }

    #[test]
    fn test_already_masked_is_unchanged() {
        assert_eq!(mask_phone("987****210"), "987****210");
    }

    #[test]
    fn test_non_ascii_digits_are_unchanged() {
        // Devanagari digits are \d in Unicode regex but not a phone number here
        let phone = "९८७६५४३२१०";
        assert_eq!(mask_phone(phone), phone);
    }

    #[test]
    fn test_redact_phone_only_touches_phone_field() {
        let fields = FieldNames::default();
        let record: RawRecord = [
            (fields.publisher_phone.as_str(), "1234567890"),
            (fields.title.as_str(), "1234567890"),
        ]
        .into_iter()
        .collect();

        let redacted = redact_phone(record, &fields);
        assert_eq!(redacted.field(&fields.publisher_phone), "123****890");
        assert_eq!(redacted.field(&fields.title), "1234567890");
    }

    #[test]
    fn test_redact_phone_without_phone_field_is_noop() {
        let fields = FieldNames::default();
        let record: RawRecord = [(fields.title.as_str(), "Title")].into_iter().collect();
        let redacted = redact_phone(record.clone(), &fields);
        assert_eq!(redacted, record);
        assert!(!redacted.contains(&fields.publisher_phone));
    }
}
