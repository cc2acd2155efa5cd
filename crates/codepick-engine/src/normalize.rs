//! Code string normalization helpers.
//!
//! External sources format the same code in different ways: ICD-10-CM codes
//! with or without the decimal point, HCPCS codes with stray whitespace, NDC
//! codes as 10 or 11 digits with or without separators. These helpers turn
//! such strings into the forms the catalog indices are keyed by.

/// Returns the ICD-10-CM hierarchy level implied by a code's length.
///
/// Dots are ignored: `A00` is level 1, `A00.0` level 2, `A00.00` level 3,
/// `A00.000` level 4 and anything longer level 5.
pub fn diagnosis_level(code: &str) -> u8 {
    match strip_dots(code).chars().count() {
        0..=3 => 1,
        4 => 2,
        5 => 3,
        6 => 4,
        _ => 5,
    }
}

/// Removes every `.` from a code.
pub fn strip_dots(code: &str) -> String {
    code.chars().filter(|&c| c != '.').collect()
}

/// Inserts the ICD-10-CM decimal point after the third character.
///
/// Only applies to dotless input that looks like a diagnosis code: a letter,
/// two digits and at least one more character. Returns `None` otherwise.
///
/// ```
/// use codepick_engine::normalize::insert_diagnosis_point;
///
/// assert_eq!(insert_diagnosis_point("A000").as_deref(), Some("A00.0"));
/// assert_eq!(insert_diagnosis_point("A00"), None);
/// assert_eq!(insert_diagnosis_point("A00.0"), None);
/// ```
pub fn insert_diagnosis_point(raw: &str) -> Option<String> {
    if raw.contains('.') {
        return None;
    }

    let bytes = raw.as_bytes();
    let looks_like_diagnosis = bytes.len() > 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit();

    if !looks_like_diagnosis {
        return None;
    }

    // The first three bytes are ASCII, so index 3 is a char boundary.
    Some(format!("{}.{}", &raw[..3], &raw[3..]))
}

/// Removes all whitespace from a code.
pub fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Keeps only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Reduces an NDC digit string to its 10-digit form.
///
/// Ten digits are returned unchanged. Eleven digits are the 5-4-2 billing
/// form of a 4-4-2, 5-3-2 or 5-4-1 code padded with one leading zero; the
/// padding is looked for at the start of the first segment, then the second
/// (position 5), then the third (position 9), and the first zero found is
/// removed. When none of those positions holds a zero the last digit is
/// dropped. Any other length returns `None`.
///
/// The check order decides between positions that could all be padding, so
/// the result is a heuristic rather than an exact inverse of the padding.
///
/// ```
/// use codepick_engine::normalize::reduce_ndc_digits;
///
/// assert_eq!(reduce_ndc_digits("00069270030").as_deref(), Some("0069270030"));
/// assert_eq!(reduce_ndc_digits("0069270030").as_deref(), Some("0069270030"));
/// assert_eq!(reduce_ndc_digits("123"), None);
/// ```
pub fn reduce_ndc_digits(digits: &str) -> Option<String> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match digits.len() {
        10 => Some(digits.to_string()),
        11 => {
            let bytes = digits.as_bytes();
            let padding = [0usize, 5, 9].into_iter().find(|&i| bytes[i] == b'0');
            let reduced = match padding {
                Some(i) => format!("{}{}", &digits[..i], &digits[i + 1..]),
                None => digits[..10].to_string(),
            };
            Some(reduced)
        }
        _ => None,
    }
}

/// Formats a bare NDC digit string with dashes.
///
/// Eleven digits become 5-4-2 and ten digits become 4-4-2. Input that
/// already has separators, or another length, is returned unchanged.
pub fn format_ndc(code: &str) -> String {
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return code.to_string();
    }

    match code.len() {
        11 => format!("{}-{}-{}", &code[..5], &code[5..9], &code[9..]),
        10 => format!("{}-{}-{}", &code[..4], &code[4..8], &code[8..]),
        _ => code.to_string(),
    }
}

/// Derives an HCPCS category name from a procedure code.
///
/// Level II codes are bucketed by their leading letter, numeric (CPT range)
/// codes by the range their first five digits fall in.
pub fn procedure_category(code: &str) -> &'static str {
    let code = code.trim();
    let first = code.chars().next().map(|c| c.to_ascii_uppercase());

    let by_letter = match first {
        Some('A') => Some("Medical and Surgical Supplies"),
        Some('B') => Some("Enteral and Parenteral Therapy"),
        Some('C') | Some('K') | Some('Q') | Some('T') => Some("Temporary Codes"),
        Some('D') => Some("Dental Procedures"),
        Some('E') => Some("Durable Medical Equipment"),
        Some('G') => Some("Temporary Procedures/Professional Services"),
        Some('H') => Some("Alcohol and Drug Abuse Treatment Services"),
        Some('J') => Some("Drugs Administered Other Than Oral Method"),
        Some('L') => Some("Orthotic and Prosthetic Procedures"),
        Some('M') => Some("Medical Services"),
        Some('P') => Some("Pathology and Laboratory Services"),
        Some('R') => Some("Diagnostic Radiology Services"),
        Some('S') => Some("Temporary National Codes"),
        Some('U') => Some("Clinical Laboratory Services"),
        Some('V') => Some("Vision Services"),
        _ => None,
    };
    if let Some(category) = by_letter {
        return category;
    }

    let numeric = digits_only(&code.chars().take(5).collect::<String>());
    match numeric.parse::<u32>() {
        Ok(10000..=19999) => "Integumentary System",
        Ok(20000..=29999) => "Musculoskeletal System",
        Ok(30000..=39999) => "Respiratory System",
        Ok(40000..=49999) => "Cardiovascular System",
        Ok(50000..=59999) => "Digestive System",
        Ok(60000..=69999) => "Urinary System",
        Ok(70000..=79999) => "Nervous System",
        Ok(80000..=89999) => "Pathology and Laboratory",
        Ok(90000..=99999) => "Evaluation and Management",
        _ => "Uncategorized",
    }
}
