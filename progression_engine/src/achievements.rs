//! Achievement unlock scan.
//!
//! Unlocking is insert-only and idempotent: re-triggering a key that is
//! already present changes nothing and is not reported.

use tracing::info;

use crate::domain::{ProgressState, ProgressionConstants};

/// Insert `key` if absent. Returns true only when newly unlocked.
pub fn unlock_achievement(state: &mut ProgressState, key: &str) -> bool {
    if state.unlocked_achievement_ids.contains(key) {
        return false;
    }
    state.unlocked_achievement_ids.insert(key.to_string());
    info!(achievement = key, "achievement unlocked");
    true
}

/// Unlock every skill milestone whose threshold the current skill
/// count meets. Returns the newly unlocked ids in milestone order.
pub fn scan_skill_milestones(
    state: &mut ProgressState,
    constants: &ProgressionConstants,
) -> Vec<String> {
    let skills = state.unlocked_skills.len();
    let mut unlocked = Vec::new();
    for milestone in &constants.skill_milestones {
        if skills >= milestone.required_skills
            && unlock_achievement(state, &milestone.achievement_id)
        {
            unlocked.push(milestone.achievement_id.clone());
        }
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    #[test]
    fn unlock_is_idempotent() {
        let mut s = create_initial_state(None, "", &ProgressionConstants::default());
        assert!(unlock_achievement(&mut s, "day_5_complete"));
        assert!(!unlock_achievement(&mut s, "day_5_complete"));
        assert_eq!(s.unlocked_achievement_ids.len(), 1);
    }

    #[test]
    fn milestones_unlock_by_count() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(None, "", &constants);
        for i in 0..5 {
            s.unlocked_skills.insert(format!("skill_{i}"));
        }
        let unlocked = scan_skill_milestones(&mut s, &constants);
        assert_eq!(unlocked, vec!["first_skill", "skill_collector"]);
        assert!(scan_skill_milestones(&mut s, &constants).is_empty());
    }
}
