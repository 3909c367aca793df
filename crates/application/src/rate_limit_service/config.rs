/// Configuration for a rate limit rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    /// The operation name or category (e.g. "create_role").
    pub category: String,
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }

    /// Creates a calls-per-minute rule for a named operation.
    #[must_use]
    pub fn per_minute(operation: impl Into<String>, max_calls: i32) -> Self {
        Self::new(operation, max_calls, 60)
    }
}

/// Calls-per-minute limits applied per registry operation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRateLimits {
    /// Limit for every mutating operation.
    pub mutations_per_minute: i32,
    /// Limit for every read operation.
    pub reads_per_minute: i32,
}

impl OperationRateLimits {
    /// Returns the rule gating a named operation.
    #[must_use]
    pub fn rule_for(&self, operation: &str, is_mutation: bool) -> RateLimitRule {
        let limit = if is_mutation {
            self.mutations_per_minute
        } else {
            self.reads_per_minute
        };

        RateLimitRule::per_minute(operation, limit)
    }
}

impl Default for OperationRateLimits {
    fn default() -> Self {
        Self {
            mutations_per_minute: 30,
            reads_per_minute: 120,
        }
    }
}
