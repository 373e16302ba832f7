//! Currency formatting shared by the report and the terminal display.

/// Currency symbol prefixed to printed prices (South African rand).
pub const CURRENCY_SYMBOL: &str = "R";

/// Formats an amount with thousands separators and two decimals.
///
/// `452345.675` becomes `"452,345.68"`; negative values keep their sign in
/// front of the first digit group.
#[must_use]
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (sign, digits) = fixed
        .strip_prefix('-')
        .map_or(("", fixed.as_str()), |rest| ("-", rest));
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(fixed.len() + whole.len() / 3);
    grouped.push_str(sign);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(fraction);
    grouped
}

/// Formats a price with the currency symbol, e.g. `"R452,345.67"`.
#[must_use]
pub fn format_price(value: f64) -> String {
    format!("{CURRENCY_SYMBOL}{}", format_amount(value))
}
