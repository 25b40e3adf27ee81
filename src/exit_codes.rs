//! Exit code constants for the allot CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable task or agent files)
//! - 2: Configuration error (invalid config.yaml or agents.yaml)
//! - 3: Agent not found (unknown agent id)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or unreadable input.
pub const USER_ERROR: i32 = 1;

/// Configuration error: config.yaml or agents.yaml failed to parse or validate.
pub const CONFIG_ERROR: i32 = 2;

/// Lookup of an agent id that is not in the catalog.
pub const NOT_FOUND: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, CONFIG_ERROR, NOT_FOUND];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
