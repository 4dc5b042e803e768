use super::value_objects::{Day, Habit};

/// A day is a diamond day when every current habit is marked done.
///
/// Uses `>=` so stale completion entries of removed habits still count.
pub fn is_diamond_day(day: &Day, habits: &[Habit]) -> bool {
    !habits.is_empty() && day.completion_count() >= habits.len()
}

/// Number of fully completed days.
pub fn calculate_diamonds(days: &[Day], habits: &[Habit]) -> u32 {
    if habits.is_empty() {
        return 0;
    }

    days.iter()
        .filter(|day| is_diamond_day(day, habits))
        .count() as u32
}

/// Longest run of adjacent diamond days, in list order.
pub fn longest_diamond_streak(days: &[Day], habits: &[Habit]) -> u32 {
    let mut current_streak = 0u32;
    let mut longest_streak = 0u32;

    for day in days {
        if is_diamond_day(day, habits) {
            current_streak += 1;
            longest_streak = longest_streak.max(current_streak);
        } else {
            current_streak = 0;
        }
    }

    longest_streak
}
