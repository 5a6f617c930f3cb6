//! Display formatting for money. Presentation only; stored amounts are never rounded.

/// Format rupees with Indian digit grouping and no paise, e.g. `₹1,23,457`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_indian(&digits);
    if rounded < 0.0 {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}

// Last three digits form one group, every group before that has two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = vec![tail];
    while head.len() > 2 {
        let (rest, group) = head.split_at(head.len() - 2);
        groups.push(group);
        head = rest;
    }
    groups.push(head);
    groups.reverse();
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(format_currency(0.0), "₹0");
        assert_eq!(format_currency(15.5), "₹16");
        assert_eq!(format_currency(999.4), "₹999");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_currency(1200.0), "₹1,200");
        assert_eq!(format_currency(123456.0), "₹1,23,456");
        assert_eq!(format_currency(12345678.0), "₹1,23,45,678");
        assert_eq!(format_currency(1808.69), "₹1,809");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(format_currency(-1500.0), "-₹1,500");
        assert_eq!(format_currency(-0.4), "₹0");
    }
}
