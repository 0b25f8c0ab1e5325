use crate::run::RunReport;

/// Minimum number of hooks a run must leave in place by default.
pub const DEFAULT_MIN_HOOKS: usize = 8;

/// Which outcomes count toward the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountPolicy {
    /// Hooks present in the output: applied this run or already there.
    #[default]
    Installed,
    /// Only hooks inserted by this run.
    FreshOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Pass,
    Fail { counted: usize, minimum: usize },
}

impl Validation {
    pub fn is_pass(&self) -> bool {
        matches!(self, Validation::Pass)
    }
}

pub fn counted(report: &RunReport, policy: CountPolicy) -> usize {
    match policy {
        CountPolicy::Installed => report.applied() + report.already_present(),
        CountPolicy::FreshOnly => report.applied(),
    }
}

/// Judge a finished run against `minimum`.
pub fn validate(report: &RunReport, minimum: usize, policy: CountPolicy) -> Validation {
    let counted = counted(report, policy);
    if counted >= minimum {
        Validation::Pass
    } else {
        Validation::Fail { counted, minimum }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ApplyOutcome;
    use crate::run::HookResult;

    fn report(outcomes: &[ApplyOutcome]) -> RunReport {
        const NAMES: [&str; 10] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        RunReport {
            hooks: outcomes
                .iter()
                .zip(NAMES)
                .map(|(outcome, name)| HookResult {
                    name,
                    outcome: *outcome,
                    optional: false,
                })
                .collect(),
        }
    }

    const APPLIED: ApplyOutcome = ApplyOutcome::Applied { strategy: 0 };

    #[test]
    fn five_of_eight_fails() {
        let mut outcomes = vec![APPLIED; 5];
        outcomes.extend([ApplyOutcome::NotFound; 3]);
        assert_eq!(
            validate(&report(&outcomes), 8, CountPolicy::Installed),
            Validation::Fail {
                counted: 5,
                minimum: 8
            }
        );
    }

    #[test]
    fn meeting_the_minimum_passes() {
        let mut outcomes = vec![APPLIED; 8];
        outcomes.extend([ApplyOutcome::NotFound; 2]);
        assert!(validate(&report(&outcomes), 8, CountPolicy::Installed).is_pass());
    }

    #[test]
    fn already_present_counts_only_under_installed() {
        let outcomes = vec![ApplyOutcome::AlreadyPresent; 10];
        let r = report(&outcomes);
        assert!(validate(&r, 8, CountPolicy::Installed).is_pass());
        assert_eq!(
            validate(&r, 8, CountPolicy::FreshOnly),
            Validation::Fail {
                counted: 0,
                minimum: 8
            }
        );
    }

    #[test]
    fn zero_minimum_always_passes() {
        let r = report(&[ApplyOutcome::NotFound; 4]);
        assert!(validate(&r, 0, CountPolicy::FreshOnly).is_pass());
    }
}
