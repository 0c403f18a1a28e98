//! Cron expression helpers.

/// Bring a schedule expression into the 6-field form the `cron` crate parses.
///
/// Standard 5-field expressions (`min hour dom month dow`) get a leading `0`
/// seconds field. Runs of whitespace collapse to single spaces. Any other
/// field count is rejected.
pub fn normalize_cron(expr: &str) -> Result<String, String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 => Ok(fields.join(" ")),
        n => Err(format!(
            "cron expression '{}' has {n} fields, expected 5 or 6",
            expr.trim()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_fields_gain_seconds() {
        assert_eq!(normalize_cron("0 9 * * *").unwrap(), "0 0 9 * * *");
        assert_eq!(normalize_cron("30 8 * * 1-5").unwrap(), "0 30 8 * * 1-5");
    }

    #[test]
    fn six_fields_kept() {
        assert_eq!(normalize_cron("15 0 9 * * *").unwrap(), "15 0 9 * * *");
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(normalize_cron("  0  9 * *\t* ").unwrap(), "0 0 9 * * *");
    }

    #[test]
    fn wrong_field_count_rejected() {
        let err = normalize_cron("every morning").unwrap_err();
        assert!(err.contains("every morning"));
        assert!(normalize_cron("").is_err());
    }
}
