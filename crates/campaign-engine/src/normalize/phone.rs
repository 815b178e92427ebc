//! Phone number cleanup

use crate::config::PhoneConfig;

/// Normalize a raw phone cell to a digits-only string
///
/// Non-digits are stripped and every remaining digit is kept. With
/// `add_country_code`, leading trunk zeros are dropped first when configured,
/// then local-length numbers that do not already start with the country
/// prefix get it prepended. A leading `+` is not special: the check works on
/// digits only. Returns `None` when no digit is left.
///
/// The function is idempotent: feeding its output back in returns the same
/// value.
///
/// ```
/// use campaign_engine::config::PhoneConfig;
/// use campaign_engine::normalize::normalize_phone;
///
/// let config = PhoneConfig::default();
/// assert_eq!(
///     normalize_phone("(21) 98888-7777", true, &config).as_deref(),
///     Some("5521988887777")
/// );
/// assert_eq!(normalize_phone("n/d", true, &config), None);
/// ```
pub fn normalize_phone(raw: &str, add_country_code: bool, config: &PhoneConfig) -> Option<String> {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if !add_country_code {
        return Some(digits);
    }

    if config.strip_trunk_zeros {
        let zeros = digits.len() - digits.trim_start_matches('0').len();
        digits.drain(..zeros);
        if digits.is_empty() {
            return None;
        }
    }
    if needs_country_code(&digits, config) {
        digits.insert_str(0, &config.country_prefix);
    }
    Some(digits)
}

fn needs_country_code(digits: &str, config: &PhoneConfig) -> bool {
    !config.country_prefix.is_empty()
        && !digits.starts_with(&config.country_prefix)
        && (config.local_min_digits..=config.local_max_digits).contains(&digits.len())
}
