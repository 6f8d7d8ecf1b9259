//! Choosing who attacks and with which attack type.

use super::rules::{Outcome, Report, RuleError};
use super::state::{ActionPhase, ActorKind, AttackType, GameEvent, GameState, Player, Selection};

fn ensure_action_phase(state: &GameState, expected: ActionPhase) -> Result<(), RuleError> {
    if state.action_phase != expected {
        return Err(RuleError::WrongActionPhase {
            expected,
            actual: state.action_phase,
        });
    }
    Ok(())
}

/// Attack type the pooled roster resolves to, `None` when both pools have power.
fn pooled_attack_type(player: &Player) -> Result<Option<AttackType>, RuleError> {
    let physical = player.unit_power(AttackType::Physical);
    let magical = player.unit_power(AttackType::Magical);
    match (physical > 0, magical > 0) {
        (false, false) => Err(RuleError::NoAttackPower),
        (true, false) => Ok(Some(AttackType::Physical)),
        (false, true) => Ok(Some(AttackType::Magical)),
        (true, true) => Ok(None),
    }
}

pub(crate) fn select(
    state: &mut GameState,
    actor: ActorKind,
    unit_index: Option<usize>,
    report: &mut Report,
) -> Result<(), RuleError> {
    let player_id = state.current_player;
    let player = state
        .current()
        .ok_or(RuleError::PlayerNotFound { player_id })?;

    let attack_type = match actor {
        ActorKind::Hero => {
            if state.remaining_hero_actions == 0 {
                return Err(RuleError::NoActionsRemaining);
            }
            ensure_action_phase(state, ActionPhase::HeroAction)?;
            let hero = player
                .hero
                .as_ref()
                .ok_or(RuleError::NoHero { player_id })?;
            if !hero.can_attack() {
                return Err(RuleError::NoAttackPower);
            }
            // Dual-stat heroes need the type picked up front.
            let resolved = hero
                .single_attack_type()
                .or(state.attack_type)
                .ok_or(RuleError::AttackTypeRequired)?;
            Some(resolved)
        }
        ActorKind::Unit => {
            if state.actions_used.unit_action {
                return Err(RuleError::ActionAlreadyUsed {
                    phase: ActionPhase::UnitAction,
                });
            }
            ensure_action_phase(state, ActionPhase::UnitAction)?;
            if player.units.is_empty() {
                return Err(RuleError::NoUnits);
            }
            if let Some(index) = unit_index {
                if index >= player.units.len() {
                    return Err(RuleError::UnitNotFound { index });
                }
            }
            pooled_attack_type(player)?.or(state.attack_type)
        }
    };

    let detail = match actor {
        ActorKind::Hero => "Pick an enemy hero, unit or monster to strike.",
        ActorKind::Unit => "Your units strike together. Pick a target.",
    };
    state.selection = Some(Selection {
        actor,
        unit_index: if actor == ActorKind::Unit { unit_index } else { None },
    });
    state.targeting_mode = true;
    state.attack_type = attack_type;

    report.event(GameEvent::ActorSelected {
        player_id,
        actor,
        attack_type,
    });
    let title = if attack_type.is_some() {
        "Choose a target"
    } else {
        "Select attack type"
    };
    report.notify(Outcome::info(title, detail));
    Ok(())
}

pub(crate) fn select_attack_type(
    state: &mut GameState,
    attack_type: AttackType,
    report: &mut Report,
) -> Result<(), RuleError> {
    if let Some(selection) = state.selection {
        let player_id = state.current_player;
        let player = state
            .current()
            .ok_or(RuleError::PlayerNotFound { player_id })?;
        let power = match selection.actor {
            ActorKind::Hero => player
                .hero
                .as_ref()
                .map_or(0, |hero| hero.power(attack_type)),
            ActorKind::Unit => player.unit_power(attack_type),
        };
        if power == 0 {
            return Err(RuleError::NoAttackPower);
        }
    }

    state.attack_type = Some(attack_type);
    let title = match attack_type {
        AttackType::Physical => "Physical attack",
        AttackType::Magical => "Magical attack",
    };
    report.notify(Outcome::info(title, "Attack type set."));
    Ok(())
}

pub(crate) fn cancel(state: &mut GameState) {
    state.clear_selection();
}
