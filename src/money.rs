// ₹ Currency presentation - whole rupees with Indian digit grouping

/// Format whole rupees the en-IN way: `₹1,50,000`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);

    // Everything above the thousands is grouped in pairs
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("₹{},{}", groups.join(","), last_three)
}

pub fn fee_label(amount: u64) -> String {
    if amount == 0 {
        "Free".to_string()
    } else {
        format_inr(amount)
    }
}
