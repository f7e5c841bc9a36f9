use crate::error::{Error, Result};

pub const EAN13_LEN: usize = 13;

/// True for exactly 13 ASCII digits. The check digit is not verified.
pub fn is_valid(code: &str) -> bool {
    code.len() == EAN13_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate(code: &str) -> Result<&str> {
    if is_valid(code) {
        Ok(code)
    } else {
        Err(Error::InvalidEan {
            code: code.to_string(),
        })
    }
}

/// Numeric value of each digit, for barcode encoding.
pub fn digits(code: &str) -> Result<[u8; EAN13_LEN]> {
    let code = validate(code)?;
    let mut out = [0u8; EAN13_LEN];
    for (slot, b) in out.iter_mut().zip(code.bytes()) {
        *slot = b - b'0';
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_thirteen_digits() {
        assert!(is_valid("1234567890123"));
        assert!(is_valid("0000000000000"));
    }

    #[test]
    fn rejects_wrong_length_or_non_digits() {
        for code in ["", "123456789012", "12345678901234", "12345678901a3", " 234567890123", "１２３４５６７８９０１２３"] {
            assert!(!is_valid(code), "{code:?} should be invalid");
            assert!(matches!(validate(code), Err(Error::InvalidEan { .. })));
        }
    }

    #[test]
    fn digits_are_numeric_values() {
        assert_eq!(
            digits("4006381333931").unwrap(),
            [4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3, 1]
        );
    }
}
