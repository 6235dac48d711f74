//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Read an optional string variable, treating blank values as unset.
#[must_use]
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(var: &str, value: &str) {
        // SAFETY: each test uses a unique variable name.
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        // SAFETY: each test uses a unique variable name.
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn parses_valid_value() {
        let var_name = "EDUMATE_TEST_ENV_VALID_41021";
        set(var_name, " 42 ");
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unset(var_name);
    }

    #[test]
    fn invalid_value_falls_back() {
        let var_name = "EDUMATE_TEST_ENV_INVALID_41022";
        set(var_name, "banana");
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unset(var_name);
    }

    #[test]
    fn missing_value_falls_back() {
        let var_name = "EDUMATE_TEST_ENV_MISSING_41023";
        unset(var_name);
        let result: u32 = env_parse_with_default(var_name, 7);
        assert_eq!(result, 7);
    }

    #[test]
    fn blank_string_is_unset() {
        let var_name = "EDUMATE_TEST_ENV_BLANK_41024";
        set(var_name, "   ");
        assert_eq!(env_non_empty(var_name), None);
        set(var_name, "key");
        assert_eq!(env_non_empty(var_name).as_deref(), Some("key"));
        unset(var_name);
    }
}
