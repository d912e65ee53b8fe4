//! Sequencer phase machine.
//!
//! Linear sequence with no skips:
//! `Idle → Staging → Configuring → Building → Launched → Terminated`

/// Phases of the build-and-launch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    Staging,
    Configuring,
    Building,
    Launched,
    Terminated,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Staging => "staging",
            Self::Configuring => "configuring",
            Self::Building => "building",
            Self::Launched => "launched",
            Self::Terminated => "terminated",
        }
    }

    /// The phase that follows this one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Staging),
            Self::Staging => Some(Self::Configuring),
            Self::Configuring => Some(Self::Building),
            Self::Building => Some(Self::Launched),
            Self::Launched => Some(Self::Terminated),
            Self::Terminated => None,
        }
    }

    /// Whether `next` is the legal successor (no transition skips).
    pub fn can_advance_to(self, next: Self) -> bool {
        self.next() == Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_order() {
        let mut phase = Phase::Idle;
        let expected = [
            Phase::Staging,
            Phase::Configuring,
            Phase::Building,
            Phase::Launched,
            Phase::Terminated,
        ];
        for next in expected {
            assert!(phase.can_advance_to(next));
            phase = next;
        }
        assert_eq!(phase.next(), None);
    }

    #[test]
    fn test_no_skips() {
        assert!(!Phase::Idle.can_advance_to(Phase::Building));
        assert!(!Phase::Staging.can_advance_to(Phase::Launched));
        assert!(!Phase::Building.can_advance_to(Phase::Terminated));
        // no going back either
        assert!(!Phase::Launched.can_advance_to(Phase::Staging));
    }
}
