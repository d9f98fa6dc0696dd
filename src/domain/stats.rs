use chrono::{Duration, NaiveDate};

pub const STREAK_WINDOW_DAYS: i64 = 7;
pub const POINTS_PER_QUIZ: i32 = 10;
pub const POINTS_PER_MOOD: i32 = 5;

/// Derived counters for one user. Every field is recomputable from the
/// user's rows except `longest_streak`, which is a watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_quizzes: i32,
    pub total_mood_entries: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub wellness_points: i32,
}

/// Number of distinct calendar days in the trailing 7-day window (today
/// inclusive) with at least one mood entry. The days need not be
/// consecutive.
pub fn current_streak(entry_days: &[NaiveDate], today: NaiveDate) -> i32 {
    let window_start = today - Duration::days(STREAK_WINDOW_DAYS - 1);
    let mut days: Vec<NaiveDate> = entry_days
        .iter()
        .copied()
        .filter(|d| *d >= window_start && *d <= today)
        .collect();
    days.sort();
    days.dedup();
    days.len() as i32
}

pub fn wellness_points(total_quizzes: i32, total_mood_entries: i32) -> i32 {
    POINTS_PER_QUIZ * total_quizzes + POINTS_PER_MOOD * total_mood_entries
}

/// Rebuilds the full snapshot from raw counts and mood entry dates.
/// Calling it again with the same inputs yields the same snapshot.
pub fn recompute(
    total_quizzes: i32,
    total_mood_entries: i32,
    entry_days: &[NaiveDate],
    longest_so_far: i32,
    today: NaiveDate,
) -> StatsSnapshot {
    let streak = current_streak(entry_days, today);
    StatsSnapshot {
        total_quizzes,
        total_mood_entries,
        current_streak: streak,
        longest_streak: longest_so_far.max(streak),
        wellness_points: wellness_points(total_quizzes, total_mood_entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_streak_counts_distinct_days_in_window() {
        let today = day("2025-03-10");
        let days = vec![today, today - Duration::days(1), today - Duration::days(3)];
        assert_eq!(current_streak(&days, today), 3);
    }

    #[test]
    fn test_streak_window_boundaries() {
        let today = day("2025-03-10");
        // today-6 is the oldest day still inside the window; today-7 is out.
        assert_eq!(current_streak(&[today - Duration::days(6)], today), 1);
        assert_eq!(current_streak(&[today - Duration::days(7)], today), 0);
        // Future-dated entries never count.
        assert_eq!(current_streak(&[today + Duration::days(1)], today), 0);
    }

    #[test]
    fn test_streak_dedups_same_day() {
        let today = day("2025-03-10");
        let days = vec![today, today, today - Duration::days(2), today - Duration::days(2)];
        assert_eq!(current_streak(&days, today), 2);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let today = day("2025-03-10");
        let days = vec![today, today - Duration::days(1)];
        let first = recompute(3, 2, &days, 0, today);
        let second = recompute(3, 2, &days, first.longest_streak, today);
        assert_eq!(first, second);
    }

    #[test]
    fn test_longest_streak_is_a_watermark() {
        let today = day("2025-03-10");
        // A previous high of 5 survives a window that now only holds 1 day.
        let snap = recompute(0, 8, &[today], 5, today);
        assert_eq!(snap.current_streak, 1);
        assert_eq!(snap.longest_streak, 5);

        // A new high raises it.
        let days: Vec<NaiveDate> = (0..4).map(|i| today - Duration::days(i)).collect();
        let snap = recompute(0, 8, &days, 2, today);
        assert_eq!(snap.current_streak, 4);
        assert_eq!(snap.longest_streak, 4);
    }

    #[test]
    fn test_points_formula() {
        assert_eq!(wellness_points(0, 0), 0);
        assert_eq!(wellness_points(1, 0), 10);
        assert_eq!(wellness_points(0, 1), 5);
        assert_eq!(wellness_points(2, 3), 35);
    }
}
