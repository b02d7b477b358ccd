// src/format.rs
//
// Stateless display formatting. The report is presented in Indian locale
// conventions: rupee symbol, lakh/crore digit grouping, zero decimal
// places for currency amounts.

/// Formats a currency amount with Indian digit grouping: the last three
/// digits form one group, every group above that has two digits.
/// `1200000` renders as `₹12,00,000`.
pub fn format_inr(value: f64) -> String {
    let rounded = value.round() as i64;
    let grouped = group_indian(&rounded.abs().to_string());
    if rounded < 0 {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}

/// One decimal place plus a percent sign.
pub fn format_pct(value: f64) -> String {
    format!("{value:.1}%")
}

/// Combined DSO / DPO label for the liquidity KPI card.
pub fn format_dso_dpo(dso: f64, dpo: f64) -> String {
    format!("{dso:.0} / {dpo:.0}")
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
