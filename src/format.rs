use crate::currency::Currency;

/// Rounds to a whole unit (half away from zero) and groups thousands with `,`.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    // avoid printing "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_money(currency: Currency, value: f64) -> String {
    format!("{}{}", currency.symbol(), format_grouped(value))
}

pub fn format_rate(percent: f64) -> String {
    format!("{}%", percent)
}
