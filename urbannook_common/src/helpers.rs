/// Interprets an optional environment value as a boolean flag.
///
/// `1/true/yes/on` and `0/false/no/off` are recognised (case-insensitive, surrounding whitespace ignored).
/// Anything else, including a missing value, yields `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .and_then(|v| match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
