use crate::domain::stats::StatsSnapshot;

/// Counter a badge condition is checked against.
#[derive(Debug, Clone, Copy)]
pub enum Threshold {
    TotalQuizzes(i32),
    TotalMoodEntries(i32),
    CurrentStreak(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct Badge {
    /// Stable key, unique per user in storage.
    pub kind: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub threshold: Threshold,
}

impl Badge {
    pub fn unlocked_by(&self, stats: &StatsSnapshot) -> bool {
        match self.threshold {
            Threshold::TotalQuizzes(n) => stats.total_quizzes >= n,
            Threshold::TotalMoodEntries(n) => stats.total_mood_entries >= n,
            Threshold::CurrentStreak(n) => stats.current_streak >= n,
        }
    }
}

pub const BADGES: [Badge; 5] = [
    Badge {
        kind: "first_steps",
        name: "First Steps",
        icon: "🌱",
        description: "Completed first assessment",
        threshold: Threshold::TotalQuizzes(1),
    },
    Badge {
        kind: "consistent_tracker",
        name: "Consistent Tracker",
        icon: "📊",
        description: "Completed 5 assessments",
        threshold: Threshold::TotalQuizzes(5),
    },
    Badge {
        kind: "wellness_warrior",
        name: "Wellness Warrior",
        icon: "⭐",
        description: "Completed 10 assessments",
        threshold: Threshold::TotalQuizzes(10),
    },
    Badge {
        kind: "mood_master",
        name: "Mood Master",
        icon: "🌈",
        description: "Tracked mood for 7 days",
        threshold: Threshold::TotalMoodEntries(7),
    },
    Badge {
        kind: "streak_champion",
        name: "Streak Champion",
        icon: "🔥",
        description: "3-day mood tracking streak",
        threshold: Threshold::CurrentStreak(3),
    },
];

/// Badges whose condition now holds and whose kind is not yet in `earned`.
/// Conditions are independent; one write can unlock several at once.
pub fn newly_unlocked<'a>(stats: &StatsSnapshot, earned: &[String]) -> Vec<&'a Badge> {
    BADGES
        .iter()
        .filter(|b| b.unlocked_by(stats) && !earned.iter().any(|e| e == b.kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(quizzes: i32, moods: i32, streak: i32) -> StatsSnapshot {
        StatsSnapshot {
            total_quizzes: quizzes,
            total_mood_entries: moods,
            current_streak: streak,
            longest_streak: streak,
            wellness_points: 0,
        }
    }

    #[test]
    fn test_first_quiz_unlocks_first_steps() {
        let unlocked = newly_unlocked(&stats(1, 0, 0), &[]);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].kind, "first_steps");
    }

    #[test]
    fn test_quiz_milestones() {
        let kinds: Vec<&str> = newly_unlocked(&stats(10, 0, 0), &[])
            .iter()
            .map(|b| b.kind)
            .collect();
        assert_eq!(
            kinds,
            vec!["first_steps", "consistent_tracker", "wellness_warrior"]
        );
    }

    #[test]
    fn test_mood_master_and_streak_champion() {
        let kinds: Vec<&str> = newly_unlocked(&stats(0, 7, 3), &[])
            .iter()
            .map(|b| b.kind)
            .collect();
        assert_eq!(kinds, vec!["mood_master", "streak_champion"]);
    }

    #[test]
    fn test_already_earned_stays_earned() {
        let earned = vec!["first_steps".to_string()];
        let unlocked = newly_unlocked(&stats(2, 0, 0), &earned);
        assert!(unlocked.is_empty());
    }

    #[test]
    fn test_nothing_unlocks_below_thresholds() {
        assert!(newly_unlocked(&stats(0, 6, 2), &[]).is_empty());
    }

    #[test]
    fn test_badge_kinds_are_unique() {
        for (i, a) in BADGES.iter().enumerate() {
            for b in BADGES.iter().skip(i + 1) {
                assert_ne!(a.kind, b.kind);
            }
        }
    }
}
