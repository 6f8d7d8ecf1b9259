//! Turn and sub-phase transitions, including the auto-skip cascade.

use super::catalog::Catalog;
use super::config::{EngineConfig, StipendPolicy};
use super::economy::{can_afford_any, restock_shop};
use super::progression::{day_for_turn, location_for_day, past_day_limit, refill_monsters};
use super::rules::{Outcome, Report};
use super::state::{
    ActionPhase, ActionsUsed, GameEvent, GamePhase, GameState, PlayerId, VictoryReason,
    PLAYER_ONE,
};

/// Buy, hero action and unit action can each be skipped at most once per turn.
const MAX_SKIP_CASCADE: usize = 3;

/// Whether `phase` has nothing the current player could do in it.
pub fn should_skip(state: &GameState, phase: ActionPhase) -> bool {
    let Some(player) = state.current() else {
        return false;
    };
    match phase {
        ActionPhase::Buy => !can_afford_any(&state.shop, player.gold),
        ActionPhase::HeroAction => {
            state.remaining_hero_actions == 0
                || player.hero.as_ref().is_some_and(|hero| !hero.can_attack())
        }
        ActionPhase::UnitAction => player.units.is_empty() || state.actions_used.unit_action,
        ActionPhase::End => false,
    }
}

/// Re-applies the skip predicate until the phase is stable.
///
/// Never leaves `End` and never runs while an actor is selected, so calling it
/// on a settled state changes nothing.
pub(crate) fn settle(state: &mut GameState, report: &mut Report) {
    for _ in 0..MAX_SKIP_CASCADE {
        if !state.is_player_turn() || state.targeting_mode {
            return;
        }
        let phase = state.action_phase;
        let Some(next) = phase.next() else {
            return;
        };
        if !should_skip(state, phase) {
            return;
        }
        state.action_phase = next;
        state.clear_selection();
        report.event(GameEvent::PhaseSkipped {
            player_id: state.current_player,
            phase,
        });
    }
}

/// Explicit advance request: next sub-phase, or hand the turn over from `End`.
pub(crate) fn advance<C: Catalog>(
    state: &mut GameState,
    catalog: &mut C,
    config: &EngineConfig,
    report: &mut Report,
) {
    let from = state.action_phase;
    match from.next() {
        Some(to) => {
            state.action_phase = to;
            state.clear_selection();
            report.event(GameEvent::PhaseAdvanced {
                player_id: state.current_player,
                from,
                to,
            });
        }
        None => end_turn(state, catalog, config, report),
    }
}

/// Passes the turn to the other player and restocks the shared pools.
pub(crate) fn end_turn<C: Catalog>(
    state: &mut GameState,
    catalog: &mut C,
    config: &EngineConfig,
    report: &mut Report,
) {
    let Some(next_player) = state.opponent_of(state.current_player) else {
        return;
    };
    if begin_turn(state, next_player, config, report) {
        refill_monsters(state, catalog, config, report);
        restock_shop(state, catalog, config, report);
    }
}

/// Turn-start bookkeeping for `player_id`. Returns `false` when the new day
/// is past the limit and the duel ended in a draw instead.
pub(crate) fn begin_turn(
    state: &mut GameState,
    player_id: PlayerId,
    config: &EngineConfig,
    report: &mut Report,
) -> bool {
    enter_turn(state, player_id, config, true, report)
}

/// The first turn after hero selection. Player one starts with whatever gold
/// they hold, so the opening buy phase is normally skipped.
pub(crate) fn begin_opening_turn(
    state: &mut GameState,
    config: &EngineConfig,
    report: &mut Report,
) -> bool {
    state.current_player = PLAYER_ONE;
    enter_turn(state, PLAYER_ONE, config, false, report)
}

fn enter_turn(
    state: &mut GameState,
    player_id: PlayerId,
    config: &EngineConfig,
    grant_stipend: bool,
    report: &mut Report,
) -> bool {
    let day = day_for_turn(state, player_id);
    if past_day_limit(day, config) {
        state.day = day;
        state.declare_victory(None, VictoryReason::DayLimitReached { day });
        report.notify(Outcome::game_over(
            "The journey ends",
            format!("Day {day} dawns with both heroes standing. Nobody wins."),
        ));
        return false;
    }

    let location = location_for_day(day, config.days_per_location);
    if location != state.location {
        report.event(GameEvent::LocationChanged {
            from: state.location,
            to: location,
        });
        report.notify(Outcome::info(
            format!("Entering the {}", location.name()),
            location.description(),
        ));
    }

    state.day = day;
    state.location = location;
    state.current_player = player_id;
    state.game_phase = GamePhase::turn_of(player_id);
    state.action_phase = ActionPhase::Buy;
    state.actions_used = ActionsUsed::default();
    state.clear_selection();

    let mut balance = 0;
    let mut speed = 0;
    if let Some(player) = state.get_player_mut(player_id) {
        if grant_stipend {
            player.gold = match config.stipend_policy {
                StipendPolicy::Reset => config.turn_stipend,
                StipendPolicy::Accumulate => player.gold.saturating_add(config.turn_stipend),
            };
        }
        balance = player.gold;
        speed = player.hero.as_ref().map_or(0, |hero| hero.sp);
    }
    state.remaining_hero_actions = speed;

    report.event(GameEvent::TurnStarted {
        player_id,
        day,
        location,
    });
    if grant_stipend {
        report.event(GameEvent::GoldGranted {
            player_id,
            amount: config.turn_stipend,
            balance,
        });
    }
    report.notify(Outcome::info(
        format!("Player {player_id}'s turn"),
        format!(
            "Day {day} of {} in the {}. {balance} gold to spend.",
            config.day_limit,
            location.name()
        ),
    ));
    true
}
