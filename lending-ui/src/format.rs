use num_format::{Locale, ToFormattedString};

/// Whole-dollar amount with thousands separators, e.g. `$25,000`.
pub fn currency(amount: f64) -> String {
    let whole = amount.round() as i64;
    if whole < 0 {
        format!("-${}", (-whole).to_formatted_string(&Locale::en))
    } else {
        format!("${}", whole.to_formatted_string(&Locale::en))
    }
}

/// Short form for metric cards: `$485K`, `$2.5M`.
pub fn compact_currency(amount: f64) -> String {
    let abs = amount.abs();
    // Anything that would round up to "$1000K" is shown in millions.
    if abs >= 999_500.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.0}K", amount / 1_000.0)
    } else {
        currency(amount)
    }
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

/// Current `(year, month)` from the browser clock.
pub fn current_year_month() -> (i32, u32) {
    let now = js_sys::Date::new_0();
    (now.get_full_year() as i32, now.get_month() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency(25000.0), "$25,000");
        assert_eq!(currency(743.64), "$744");
        assert_eq!(currency(-1250.0), "-$1,250");
    }

    #[test]
    fn compact_currency_picks_unit() {
        assert_eq!(compact_currency(65000.0), "$65K");
        assert_eq!(compact_currency(2_500_000.0), "$2.5M");
        assert_eq!(compact_currency(950.0), "$950");
    }

    #[test]
    fn compact_currency_rolls_over_to_millions() {
        assert_eq!(compact_currency(999_400.0), "$999K");
        assert_eq!(compact_currency(999_600.0), "$1.0M");
    }

    #[test]
    fn first_name_takes_leading_word() {
        assert_eq!(first_name("Jessica Martinez"), "Jessica");
        assert_eq!(first_name(""), "");
    }
}
