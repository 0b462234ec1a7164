//! Streak rule and time-based decay.
//!
//! The streak advances at most once per calendar date, and only when a
//! day of the program is completed. Decay is driven by the caller.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::ProgressState;

/// Apply the streak rule for a day completion on `today`.
/// Returns true if the streak count changed.
pub fn record_day_completion(state: &mut ProgressState, today: NaiveDate) -> bool {
    let changed = state.last_active_date != Some(today);
    if changed {
        state.streak_count = state.streak_count.saturating_add(1);
    }
    state.last_active_date = Some(today);
    changed
}

/// Reset the streak when the last active date is neither `today` nor
/// the day before. Returns true if the streak was reset.
pub fn apply_streak_decay(state: &mut ProgressState, today: NaiveDate) -> bool {
    let yesterday = today.pred_opt();
    let alive = match state.last_active_date {
        Some(last) => last == today || Some(last) == yesterday,
        None => false,
    };
    if alive || state.streak_count == 0 {
        return false;
    }
    debug!(
        previous = state.streak_count,
        last_active = ?state.last_active_date,
        %today,
        "streak decayed"
    );
    state.streak_count = 0;
    true
}

/// Pure form of `apply_streak_decay`.
pub fn check_streak_decay(state: &ProgressState, today: NaiveDate) -> ProgressState {
    let mut next = state.clone();
    apply_streak_decay(&mut next, today);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProgressionConstants;
    use crate::state::create_initial_state;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn completion_counts_once_per_date() {
        let mut s = create_initial_state(None, "", &ProgressionConstants::default());
        assert!(record_day_completion(&mut s, date(1)));
        assert!(!record_day_completion(&mut s, date(1)));
        assert_eq!(s.streak_count, 1);
        assert!(record_day_completion(&mut s, date(2)));
        assert_eq!(s.streak_count, 2);
        assert_eq!(s.last_active_date, Some(date(2)));
    }

    #[test]
    fn decay_keeps_today_and_yesterday() {
        let mut s = create_initial_state(None, "", &ProgressionConstants::default());
        record_day_completion(&mut s, date(10));
        assert_eq!(check_streak_decay(&s, date(10)).streak_count, 1);
        assert_eq!(check_streak_decay(&s, date(11)).streak_count, 1);
        assert_eq!(check_streak_decay(&s, date(12)).streak_count, 0);
        // Pure: input untouched.
        assert_eq!(s.streak_count, 1);
    }
}
