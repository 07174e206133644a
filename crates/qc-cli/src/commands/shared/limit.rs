/// Compute effective limit with precedence: local arg -> configured default.
#[must_use]
pub fn effective_limit(local: Option<u32>, fallback: u32) -> u32 {
    local.unwrap_or(fallback).max(1)
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn local_takes_precedence() {
        assert_eq!(effective_limit(Some(5), 20), 5);
    }

    #[test]
    fn fallback_used_when_none_set() {
        assert_eq!(effective_limit(None, 20), 20);
    }

    #[test]
    fn zero_is_clamped() {
        assert_eq!(effective_limit(Some(0), 20), 1);
    }
}
