use super::status::Status;
use std::collections::HashSet;

/// Classification rules for one watch
#[derive(Debug, Clone)]
pub(crate) struct Rules {
    pub pending: HashSet<Status>,
    pub target: HashSet<Status>,
    pub tolerated: HashSet<Status>,
    pub continuous_target_occurrence: u32,
    pub not_found_checks: u32,
}

impl Rules {
    /// Human readable list of statuses the watch accepts, for diagnostics
    pub fn expected(&self) -> String {
        let mut names: Vec<String> = self
            .target
            .iter()
            .chain(&self.pending)
            .chain(&self.tolerated)
            .map(ToString::to_string)
            .collect();
        names.sort();
        names.dedup();
        names.join(", ")
    }
}

/// What a single observation means for the watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Target reached often enough in a row
    Reached,
    /// Target observed, more consecutive observations needed
    Confirming { streak: u32, needed: u32 },
    Pending,
    /// Explicitly allowed intermediate status
    Tolerated,
    /// Resource missing, still within the not-found allowance
    Missing { streak: u32, allowed: u32 },
    /// Resource stayed missing past the allowance
    MissingExhausted { checks: u32 },
    Unexpected,
}

/// Consecutive-observation counters for one watch
#[derive(Debug, Default)]
pub(crate) struct Tally {
    target_streak: u32,
    not_found_streak: u32,
}

impl Tally {
    pub fn observe(&mut self, rules: &Rules, status: &Status) -> Step {
        if !status.is_not_found() {
            self.not_found_streak = 0;
        }

        if rules.target.contains(status) {
            self.target_streak += 1;
            if self.target_streak >= rules.continuous_target_occurrence {
                return Step::Reached;
            }
            return Step::Confirming {
                streak: self.target_streak,
                needed: rules.continuous_target_occurrence,
            };
        }

        // Occurrence counting only covers uninterrupted runs
        self.target_streak = 0;

        if rules.pending.contains(status) {
            return Step::Pending;
        }
        if rules.tolerated.contains(status) {
            return Step::Tolerated;
        }
        if status.is_not_found() && rules.not_found_checks > 0 {
            self.not_found_streak += 1;
            if self.not_found_streak > rules.not_found_checks {
                return Step::MissingExhausted {
                    checks: rules.not_found_checks,
                };
            }
            return Step::Missing {
                streak: self.not_found_streak,
                allowed: rules.not_found_checks,
            };
        }
        Step::Unexpected
    }
}
