use serde::Deserialize;

/// Tunables for locating hunks. Defaults were picked against the fixture corpus.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum fraction of fuzzily equal lines for windows longer than
    /// `short_anchor_len`.
    pub acceptance_threshold: f64,
    /// Patterns of this many lines or fewer must match fully.
    pub short_anchor_len: usize,
    /// Lines above and below a candidate compared against the hunk's context.
    pub context_window: usize,
    pub tab_width: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.8,
            short_anchor_len: 2,
            context_window: 3,
            tab_width: 4,
        }
    }
}

impl MatchConfig {
    /// Score a window of `len` lines must reach to be kept.
    pub fn required_score(&self, len: usize) -> f64 {
        if len <= self.short_anchor_len {
            1.0
        } else {
            self.acceptance_threshold
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.acceptance_threshold > 0.0 && self.acceptance_threshold <= 1.0) {
            return Err(format!(
                "acceptance_threshold must be in (0, 1], got {}",
                self.acceptance_threshold
            ));
        }
        if self.tab_width == 0 {
            return Err("tab_width must be at least 1".to_string());
        }
        Ok(())
    }
}
