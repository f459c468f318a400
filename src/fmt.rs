/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Whole-dollar variant for dashboards and technician stats: $1,235
pub fn money_whole(val: f64) -> String {
    let full = money(val.round());
    full.trim_end_matches(".00").to_string()
}

/// Fractional job counts shown to one decimal, trimming ".0" for whole numbers.
pub fn job_count(val: f64) -> String {
    let rounded = (val * 10.0).round() / 10.0;
    if (rounded - rounded.trunc()).abs() < f64::EPSILON {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

/// Human-readable file size: 512 B, 1.2 KB, 3.4 MB
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_money_whole() {
        assert_eq!(money_whole(1234.56), "$1,235");
        assert_eq!(money_whole(0.2), "$0");
        assert_eq!(money_whole(-500.4), "-$500");
        assert_eq!(money_whole(999999.5), "$1,000,000");
    }

    #[test]
    fn test_job_count() {
        assert_eq!(job_count(1.0), "1");
        assert_eq!(job_count(0.5), "0.5");
        assert_eq!(job_count(1.0 / 3.0), "0.3");
        assert_eq!(job_count(2.249), "2.2");
        assert_eq!(job_count(0.0), "0");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
