//! Record name helpers

/// Strip exactly one trailing `.` from a fully-qualified name
pub fn trim_trailing_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Name of a record relative to its zone.
///
/// The gateway indexes TXT records by their name inside the zone, so
/// `_acme-challenge.example.com.` in zone `example.com.` becomes
/// `_acme-challenge`. If the FQDN is not inside the zone, the first label is
/// used.
pub fn short_record_name(fqdn: &str, zone: &str) -> String {
    let fqdn = trim_trailing_dot(fqdn);
    let zone = trim_trailing_dot(zone);

    if !zone.is_empty() && fqdn.len() > zone.len() + 1 {
        let split = fqdn.len() - zone.len();
        if let (Some(prefix), Some(suffix)) = (fqdn.get(..split - 1), fqdn.get(split..)) {
            if suffix.eq_ignore_ascii_case(zone) && fqdn.as_bytes()[split - 1] == b'.' {
                return prefix.to_string();
            }
        }
    }

    fqdn.split('.').next().unwrap_or_default().to_string()
}
