/// Per-brand, per-invocation count of video API calls against a hard cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaBudget {
    limit: u32,
    used: u32,
}

impl QuotaBudget {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    /// Reserves one call. Returns `false` once the cap is reached.
    pub fn try_spend(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }
}
