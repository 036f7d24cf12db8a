//! Small display helpers.

/// Whole-number amount with comma thousands grouping, e.g. `-1,234,568`.
pub fn group_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

pub fn money(symbol: &str, v: f64) -> String {
    format!("{}{}", symbol, group_thousands(v))
}

pub fn percent(v: f64) -> String {
    format!("{:.2}%", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(13451.75), "13,452");
        assert_eq!(group_thousands(1200000.0), "1,200,000");
        assert_eq!(group_thousands(-3150.0), "-3,150");
        assert_eq!(group_thousands(-0.2), "0");
    }

    #[test]
    fn money_and_percent() {
        assert_eq!(money("₹", 26647.75), "₹26,648");
        assert_eq!(percent(2.2212), "2.22%");
        assert_eq!(percent(0.0), "0.00%");
    }
}
