//! Display convention for monetary and percentage figures: two decimal
//! places, period for thousands, comma for decimals (1800.00 → "1.800,00").

use rust_decimal::Decimal;

pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let raw = rounded.abs().to_string();
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    let mut frac = frac_part.to_string();
    while frac.len() < 2 {
        frac.push('0');
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, int_grouped, frac)
}
