/// Format an unsigned count with a space between each group of three digits,
/// e.g. `1234567` renders as `1 234 567`.
pub fn longint(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Render a UTC instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn iso8601_z(when: chrono::DateTime<chrono::Utc>) -> String {
    when.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
