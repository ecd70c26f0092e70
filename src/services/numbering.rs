// src/services/numbering.rs

use crate::{common::error::AppError, models::orders::DocumentKind};

const NUMBER_WIDTH: usize = 5;

/// Next document number for `kind`, given the number of the newest existing
/// document of that kind (`None` when there is none yet).
///
/// `VEN-00041` → `VEN-00042`. A previous number whose suffix after the last
/// `-` is not a non-negative integer is rejected instead of restarting the
/// sequence at 1, which would hand out a number that may already exist.
pub fn next_document_number(kind: DocumentKind, last: Option<&str>) -> Result<String, AppError> {
    let seed = match last {
        None => 0,
        Some(number) => parse_sequence(number)
            .ok_or_else(|| AppError::CorruptDocumentNumber(number.to_string()))?,
    };

    let next = seed
        .checked_add(1)
        .ok_or_else(|| AppError::CorruptDocumentNumber(last.unwrap_or_default().to_string()))?;

    Ok(format!("{}-{:0width$}", kind.prefix(), next, width = NUMBER_WIDTH))
}

fn parse_sequence(number: &str) -> Option<u64> {
    let suffix = match number.rsplit_once('-') {
        Some((_, suffix)) => suffix,
        None => number,
    };
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_document_of_each_kind() {
        assert_eq!(next_document_number(DocumentKind::Sale, None).unwrap(), "VEN-00001");
        assert_eq!(next_document_number(DocumentKind::Purchase, None).unwrap(), "COM-00001");
    }

    #[test]
    fn increments_the_suffix() {
        assert_eq!(
            next_document_number(DocumentKind::Sale, Some("VEN-00041")).unwrap(),
            "VEN-00042"
        );
        assert_eq!(
            next_document_number(DocumentKind::Purchase, Some("COM-00999")).unwrap(),
            "COM-01000"
        );
    }

    #[test]
    fn keeps_growing_past_five_digits() {
        assert_eq!(
            next_document_number(DocumentKind::Sale, Some("VEN-99999")).unwrap(),
            "VEN-100000"
        );
    }

    #[test]
    fn only_the_part_after_the_last_dash_counts() {
        assert_eq!(
            next_document_number(DocumentKind::Sale, Some("VEN-2024-00007")).unwrap(),
            "VEN-00008"
        );
    }

    #[test]
    fn malformed_suffix_is_an_error() {
        for bad in ["VEN-", "VEN-00A12", "garbage-x", "VEN- 12", "VEN-+12"] {
            let err = next_document_number(DocumentKind::Sale, Some(bad)).unwrap_err();
            assert!(
                matches!(err, AppError::CorruptDocumentNumber(ref n) if n == bad),
                "unexpected result for {bad:?}: {err:?}"
            );
        }
    }
}
