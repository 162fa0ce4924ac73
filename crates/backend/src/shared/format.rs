/// Formats an integer with comma thousands separators.
///
/// # Examples
/// ```ignore
/// assert_eq!(format_thousands(1234567), "1,234,567");
/// assert_eq!(format_thousands(-1234), "-1,234");
/// ```
pub fn format_thousands(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Fixed-point formatting; negative zero is printed as `0`.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.prec$}", value, prec = decimals);
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}
