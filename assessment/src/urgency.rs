//! Deadline urgency tiers for badges and live countdowns.

use chrono::TimeDelta;
use serde::Serialize;
use strum::{Display, EnumIter};

/// Upper bounds, in hours, of the critical, urgent and soon tiers.
pub const CRITICAL_HOURS: i64 = 24;
pub const URGENT_HOURS: i64 = 48;
pub const SOON_HOURS: i64 = 72;

/// Ordered from most to least urgent, so `a < b` means `a` is more urgent than `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UrgencyTier {
    Overdue,
    Critical,
    Urgent,
    Soon,
    Normal,
}

/// Buckets a remaining duration. Each boundary belongs to the more urgent tier:
/// exactly 24h is `Critical`, 24h + 1s is `Urgent`.
pub fn classify(remaining: TimeDelta) -> UrgencyTier {
    if remaining <= TimeDelta::zero() {
        UrgencyTier::Overdue
    } else if remaining <= TimeDelta::hours(CRITICAL_HOURS) {
        UrgencyTier::Critical
    } else if remaining <= TimeDelta::hours(URGENT_HOURS) {
        UrgencyTier::Urgent
    } else if remaining <= TimeDelta::hours(SOON_HOURS) {
        UrgencyTier::Soon
    } else {
        UrgencyTier::Normal
    }
}

/// Non-negative day/hour/minute/second breakdown of a remaining duration.
/// Elapsed durations collapse to all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RemainingParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl From<TimeDelta> for RemainingParts {
    fn from(remaining: TimeDelta) -> Self {
        let total = remaining.num_seconds().max(0);
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(TimeDelta::zero()), UrgencyTier::Overdue);
        assert_eq!(classify(TimeDelta::seconds(-30)), UrgencyTier::Overdue);
        assert_eq!(classify(TimeDelta::seconds(1)), UrgencyTier::Critical);
        assert_eq!(classify(TimeDelta::hours(24)), UrgencyTier::Critical);
        assert_eq!(
            classify(TimeDelta::hours(24) + TimeDelta::seconds(1)),
            UrgencyTier::Urgent
        );
        assert_eq!(classify(TimeDelta::hours(48)), UrgencyTier::Urgent);
        assert_eq!(classify(TimeDelta::hours(72)), UrgencyTier::Soon);
        assert_eq!(
            classify(TimeDelta::hours(72) + TimeDelta::milliseconds(1)),
            UrgencyTier::Normal
        );
    }

    #[test]
    fn test_tier_ordering_most_urgent_first() {
        assert!(UrgencyTier::Overdue < UrgencyTier::Critical);
        assert!(UrgencyTier::Critical < UrgencyTier::Urgent);
        assert!(UrgencyTier::Urgent < UrgencyTier::Soon);
        assert!(UrgencyTier::Soon < UrgencyTier::Normal);
    }

    #[test]
    fn test_remaining_parts() {
        let delta = TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(4) + TimeDelta::seconds(5);
        assert_eq!(
            RemainingParts::from(delta),
            RemainingParts {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert_eq!(RemainingParts::from(TimeDelta::hours(-1)), RemainingParts::default());
    }
}
