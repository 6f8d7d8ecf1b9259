//! Day counter, location mapping and the shared monster pool.

use super::catalog::Catalog;
use super::config::EngineConfig;
use super::rules::Report;
use super::state::{GameEvent, GameState, Location, PlayerId, PLAYER_ONE};

/// `sequence[min((day - 1) / span, len - 1)]`: each location lasts `span`
/// days and the last one holds once the sequence runs out.
pub fn location_for_day(day: u32, days_per_location: u32) -> Location {
    let span = days_per_location.max(1);
    let index = usize::try_from(day.saturating_sub(1) / span).unwrap_or(usize::MAX);
    Location::ALL[index.min(Location::ALL.len() - 1)]
}

/// Day that applies once `player_id` begins a turn.
///
/// Only player one's turn advances the calendar, and the opening turn
/// (day 1 with player one already current) does not.
pub fn day_for_turn(state: &GameState, player_id: PlayerId) -> u32 {
    if player_id != PLAYER_ONE {
        return state.day;
    }
    if state.day == 1 && state.current_player == PLAYER_ONE {
        1
    } else {
        state.day.saturating_add(1)
    }
}

pub fn past_day_limit(day: u32, config: &EngineConfig) -> bool {
    day > config.day_limit
}

/// Tops the shared pool back up to the configured size for the current location.
pub(crate) fn refill_monsters<C: Catalog>(
    state: &mut GameState,
    catalog: &mut C,
    config: &EngineConfig,
    report: &mut Report,
) {
    let missing = config.monster_pool_size.saturating_sub(state.monsters.len());
    if missing == 0 {
        return;
    }
    let spawned = catalog.generate_monsters(state.location, missing);
    if spawned.is_empty() {
        return;
    }
    report.event(GameEvent::MonstersSpawned {
        location: state.location,
        monster_ids: spawned.iter().map(|monster| monster.id).collect(),
    });
    state.monsters.extend(spawned);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::FixedCatalog;
    use crate::game::state::PLAYER_TWO;

    #[test]
    fn each_location_spans_three_days() {
        for day in 1..=3 {
            assert_eq!(location_for_day(day, 3), Location::Forest);
        }
        for day in 4..=6 {
            assert_eq!(location_for_day(day, 3), Location::Ruins);
        }
        assert_eq!(location_for_day(16, 3), Location::Crypt);
        assert_eq!(location_for_day(18, 3), Location::Crypt);
    }

    #[test]
    fn last_location_holds_past_the_sequence() {
        assert_eq!(location_for_day(40, 3), Location::Crypt);
        assert_eq!(location_for_day(u32::MAX, 1), Location::Crypt);
        assert_eq!(location_for_day(0, 3), Location::Forest);
    }

    #[test]
    fn only_player_one_advances_the_day() {
        let mut state = GameState::sample();
        state.current_player = PLAYER_ONE;
        state.day = 4;
        assert_eq!(day_for_turn(&state, PLAYER_TWO), 4);
        state.current_player = PLAYER_TWO;
        assert_eq!(day_for_turn(&state, PLAYER_ONE), 5);
    }

    #[test]
    fn opening_turn_stays_on_day_one() {
        let mut state = GameState::new();
        state.current_player = PLAYER_ONE;
        assert_eq!(day_for_turn(&state, PLAYER_ONE), 1);
        state.current_player = PLAYER_TWO;
        assert_eq!(day_for_turn(&state, PLAYER_ONE), 2);
    }

    #[test]
    fn day_nineteen_is_past_the_limit() {
        let config = EngineConfig::default();
        assert!(!past_day_limit(18, &config));
        assert!(past_day_limit(19, &config));
    }

    #[test]
    fn refill_tops_pool_up_for_current_location() {
        let mut state = GameState::sample();
        state.monsters.truncate(0);
        state.location = Location::Necropolis;
        let mut report = Report::default();
        refill_monsters(
            &mut state,
            &mut FixedCatalog::new(),
            &EngineConfig::default(),
            &mut report,
        );
        assert_eq!(state.monsters.len(), 2);
        assert!(state.monsters.iter().all(|m| m.location == Location::Necropolis));
        assert_eq!(report.events.len(), 1);

        let mut quiet = Report::default();
        refill_monsters(
            &mut state,
            &mut FixedCatalog::new(),
            &EngineConfig::default(),
            &mut quiet,
        );
        assert_eq!(state.monsters.len(), 2);
        assert!(quiet.events.is_empty());
    }
}
