/// Compares column widths in points, ignoring rounding noise.
pub fn float_slices_fuzzy_eq(a: &[f32], b: &[f32]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    const EPSILON: f32 = 0.01;
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPSILON)
}

/// Formats a whole currency amount with thousands separators, e.g. `-¥1,234,567`.
pub fn format_price(amount: i64, symbol: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, grouped)
}
