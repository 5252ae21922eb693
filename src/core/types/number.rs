//! Number/string conversions needed to atomize property keys.

use crate::consts::MAX_NUMBER_ATOM;

/// Returns `value` as a numeric atom payload if it takes the fast path.
///
/// The value must be finite, integral, non-negative with a clear sign bit,
/// and no larger than [`MAX_NUMBER_ATOM`]. The range check happens before the
/// conversion, so no float is ever truncated into range.
#[inline]
pub fn number_index(value: f64) -> Option<u32> {
  if value.is_sign_negative() || !(value <= MAX_NUMBER_ATOM as f64) || value.fract() != 0.0 {
    return None;
  }

  Some(value as u32)
}

/// Renders `value` the way script code prints a number.
///
/// Uses the shortest digit string that round-trips, placed in positional
/// notation for decimal exponents in `-6..21` and in `1e+21` style
/// otherwise. Both zeros render as `"0"`.
pub fn number_to_string(value: f64) -> String {
  if value.is_nan() {
    return String::from("NaN");
  }

  if value.is_infinite() {
    return String::from(if value > 0.0 { "Infinity" } else { "-Infinity" });
  }

  if value == 0.0 {
    return String::from("0");
  }

  let mut buffer: ryu::Buffer = ryu::Buffer::new();
  let (digits, point): (String, i32) = decompose(buffer.format_finite(value.abs()));
  let mut output: String = String::with_capacity(digits.len() + 8);

  if value < 0.0 {
    output.push('-');
  }

  let count: i32 = digits.len() as i32;

  if count <= point && point <= 21 {
    output.push_str(&digits);
    output.extend((0..point - count).map(|_| '0'));
  } else if 0 < point && point <= 21 {
    output.push_str(&digits[..point as usize]);
    output.push('.');
    output.push_str(&digits[point as usize..]);
  } else if -6 < point && point <= 0 {
    output.push_str("0.");
    output.extend((0..-point).map(|_| '0'));
    output.push_str(&digits);
  } else {
    let exponent: i32 = point - 1;

    output.push_str(&digits[..1]);

    if count > 1 {
      output.push('.');
      output.push_str(&digits[1..]);
    }

    output.push('e');
    output.push(if exponent < 0 { '-' } else { '+' });
    output.push_str(&exponent.unsigned_abs().to_string());
  }

  output
}

/// Splits a positive shortest representation into significant digits and
/// the position of the decimal point relative to them.
///
/// The result satisfies `value == 0.DIGITS * 10^point`.
fn decompose(text: &str) -> (String, i32) {
  let (mantissa, exponent): (&str, i32) = match text.split_once(['e', 'E']) {
    Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
    None => (text, 0),
  };

  let (integral, fraction): (&str, &str) = mantissa.split_once('.').unwrap_or((mantissa, ""));
  let mut point: i32 = integral.len() as i32 + exponent;
  let mut digits: String = String::with_capacity(integral.len() + fraction.len());

  for byte in integral.bytes().chain(fraction.bytes()) {
    if byte == b'0' && digits.is_empty() {
      point -= 1;
    } else {
      digits.push(byte as char);
    }
  }

  let trimmed: usize = digits.trim_end_matches('0').len();

  digits.truncate(trimmed);

  (digits, point)
}

/// Returns the number named by `bytes` if they are its canonical rendering.
///
/// This is the test a string key must pass to be treated as a number: the
/// bytes must be exactly what [`number_to_string`] prints for the parsed
/// value, so `"00"`, `"1.50"` and `"+1"` are rejected while `"-0"` yields
/// negative zero.
pub fn canonical_numeric_index(bytes: &[u8]) -> Option<f64> {
  match bytes {
    [] => return None,
    b"-0" => return Some(-0.0),
    [b'0'..=b'9', ..] | [b'-', ..] | [b'I', ..] | [b'N', ..] => {}
    _ => return None,
  }

  if let Some(value) = parse_index(bytes) {
    return Some(value as f64);
  }

  let text: &str = std::str::from_utf8(bytes).ok()?;
  let value: f64 = text.parse().ok()?;

  if number_to_string(value) == text {
    Some(value)
  } else {
    None
  }
}

/// Parses a plain decimal integer without leading zeros.
#[inline]
fn parse_index(bytes: &[u8]) -> Option<u64> {
  if bytes.len() > 15 || (bytes.len() > 1 && bytes[0] == b'0') {
    return None;
  }

  bytes.iter().try_fold(0_u64, |total, byte| {
    byte
      .is_ascii_digit()
      .then(|| total * 10 + u64::from(byte - b'0'))
  })
}

/// Returns the number of characters encoded in the UTF-8 `bytes`.
#[inline]
pub fn utf8_length(bytes: &[u8]) -> usize {
  bytes.iter().filter(|byte| (**byte as i8) >= -0x40).count()
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_number_index_accepts_small_integers() {
    assert_eq!(number_index(0.0), Some(0));
    assert_eq!(number_index(42.0), Some(42));
    assert_eq!(number_index(MAX_NUMBER_ATOM as f64), Some(MAX_NUMBER_ATOM));
  }

  #[test]
  fn test_number_index_rejects() {
    assert_eq!(number_index(-0.0), None);
    assert_eq!(number_index(-1.0), None);
    assert_eq!(number_index(1.5), None);
    assert_eq!(number_index(MAX_NUMBER_ATOM as f64 + 1.0), None);
    assert_eq!(number_index(4294967296.0), None);
    assert_eq!(number_index(1e300), None);
    assert_eq!(number_index(f64::NAN), None);
    assert_eq!(number_index(f64::INFINITY), None);
  }

  #[test]
  fn test_number_to_string_integers() {
    assert_eq!(number_to_string(0.0), "0");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(1.0), "1");
    assert_eq!(number_to_string(-42.0), "-42");
    assert_eq!(number_to_string(4294967296.0), "4294967296");
    assert_eq!(number_to_string(1e20), "100000000000000000000");
    assert_eq!(number_to_string(123456789012345680000.0), "123456789012345680000");
  }

  #[test]
  fn test_number_to_string_fractions() {
    assert_eq!(number_to_string(1.5), "1.5");
    assert_eq!(number_to_string(-0.25), "-0.25");
    assert_eq!(number_to_string(0.1), "0.1");
    assert_eq!(number_to_string(0.000001), "0.000001");
    assert_eq!(number_to_string(123.456), "123.456");
  }

  #[test]
  fn test_number_to_string_exponents() {
    assert_eq!(number_to_string(1e21), "1e+21");
    assert_eq!(number_to_string(1.5e300), "1.5e+300");
    assert_eq!(number_to_string(1e-7), "1e-7");
    assert_eq!(number_to_string(-2.5e-10), "-2.5e-10");
    assert_eq!(number_to_string(5e-324), "5e-324");
  }

  #[test]
  fn test_number_to_string_specials() {
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::INFINITY), "Infinity");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
  }

  #[test]
  fn test_canonical_numeric_index() {
    assert_eq!(canonical_numeric_index(b"0"), Some(0.0));
    assert_eq!(canonical_numeric_index(b"42"), Some(42.0));
    assert_eq!(canonical_numeric_index(b"1.5"), Some(1.5));
    assert_eq!(canonical_numeric_index(b"4294967296"), Some(4294967296.0));
    assert_eq!(canonical_numeric_index(b"1e+21"), Some(1e21));
    assert_eq!(canonical_numeric_index(b"Infinity"), Some(f64::INFINITY));
  }

  #[test]
  fn test_canonical_numeric_index_negative_zero() {
    let value: f64 = canonical_numeric_index(b"-0").unwrap();

    assert_eq!(value, 0.0);
    assert!(value.is_sign_negative());
  }

  #[test]
  fn test_canonical_numeric_index_rejects() {
    for text in ["", "00", "01", "+1", "1.50", "1e21", " 1", "1 ", "length", "-", "0x10", "inf"] {
      assert_eq!(canonical_numeric_index(text.as_bytes()), None, "{text:?}");
    }
  }

  #[test]
  fn test_utf8_length() {
    assert_eq!(utf8_length(b""), 0);
    assert_eq!(utf8_length(b"abc"), 3);
    assert_eq!(utf8_length("héllo".as_bytes()), 5);
    assert_eq!(utf8_length("🦀🦀".as_bytes()), 2);
  }
}
