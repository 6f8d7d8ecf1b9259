//! Attack resolution against heroes, unit rosters and monsters.

use super::rules::{Outcome, Report, RuleError};
use super::state::{
    ActorKind, AttackType, GameEvent, GameState, Hero, Monster, Player, PlayerId, Target,
    VictoryReason,
};

/// Strength of the pending attack. Units pool their stats into one strike.
pub fn attack_value(player: &Player, actor: ActorKind, attack_type: AttackType) -> u32 {
    match actor {
        ActorKind::Hero => player
            .hero
            .as_ref()
            .map_or(0, |hero| hero.power(attack_type)),
        ActorKind::Unit => player.unit_power(attack_type),
    }
}

/// Hero-on-hero damage. Physical hits are reduced by `rp`, magical hits by
/// `dp`, and every landed hit deals at least 1.
pub fn hero_damage(attack_value: u32, defender: &Hero, attack_type: AttackType) -> u32 {
    let mitigation = match attack_type {
        AttackType::Physical => defender.rp,
        AttackType::Magical => defender.dp,
    };
    attack_value.saturating_sub(mitigation).max(1)
}

/// Damage a slain monster deals back; both components always apply.
pub fn counterattack_damage(monster: &Monster, hero: &Hero) -> u32 {
    monster
        .ap
        .saturating_sub(hero.dp)
        .saturating_add(monster.mp.saturating_sub(hero.rp))
}

/// Checks ownership, existence and the taunt rule for a hero or unit target.
fn validate_target(state: &GameState, attacker: PlayerId, target: Target) -> Result<(), RuleError> {
    let (defender_id, unit_index) = match target {
        Target::Hero { player_id } => (player_id, None),
        Target::Unit { player_id, index } => (player_id, Some(index)),
        Target::Monster { index } => {
            if index >= state.monsters.len() {
                return Err(RuleError::TargetNotFound);
            }
            return Ok(());
        }
    };

    if defender_id == attacker {
        return Err(RuleError::InvalidTarget);
    }
    let defender = state
        .get_player(defender_id)
        .ok_or(RuleError::PlayerNotFound {
            player_id: defender_id,
        })?;

    match unit_index {
        None if defender.hero.is_none() => return Err(RuleError::TargetNotFound),
        Some(index) if index >= defender.units.len() => return Err(RuleError::TargetNotFound),
        _ => {}
    }

    if let Some(provocateur_index) = defender.provocateur_index() {
        if unit_index != Some(provocateur_index) {
            return Err(RuleError::ProvocateurBlocks { provocateur_index });
        }
    }
    Ok(())
}

pub(crate) fn attack(
    state: &mut GameState,
    target: Target,
    report: &mut Report,
) -> Result<(), RuleError> {
    let selection = state.selection.ok_or(RuleError::NoActiveSelection)?;
    let attack_type = state.attack_type.ok_or(RuleError::AttackTypeRequired)?;
    let attacker_id = state.current_player;
    let value = state
        .current()
        .map(|player| attack_value(player, selection.actor, attack_type))
        .ok_or(RuleError::PlayerNotFound {
            player_id: attacker_id,
        })?;
    validate_target(state, attacker_id, target)?;

    match target {
        Target::Hero { player_id } => {
            strike_hero(state, attacker_id, player_id, value, attack_type, report)
        }
        Target::Unit { player_id, .. } => {
            strike_units(state, attacker_id, player_id, target, value, report)
        }
        Target::Monster { index } => {
            strike_monster(state, attacker_id, index, target, value, report)
        }
    }

    state.clear_selection();
    match selection.actor {
        ActorKind::Unit => state.actions_used.unit_action = true,
        ActorKind::Hero => {
            state.remaining_hero_actions = state.remaining_hero_actions.saturating_sub(1);
            state.actions_used.hero_action = true;
        }
    }
    Ok(())
}

fn strike_hero(
    state: &mut GameState,
    attacker_id: PlayerId,
    defender_id: PlayerId,
    value: u32,
    attack_type: AttackType,
    report: &mut Report,
) {
    let Some(hero) = state
        .get_player_mut(defender_id)
        .and_then(|player| player.hero.as_mut())
    else {
        return;
    };
    let damage = hero_damage(value, hero, attack_type);
    let dealt = hero.take_damage(damage);
    let remaining_hp = hero.hp;
    let name = hero.name.clone();

    report.event(GameEvent::HeroDamaged {
        attacker: attacker_id,
        defender: defender_id,
        amount: dealt,
        remaining_hp,
    });

    if remaining_hp == 0 {
        state.declare_victory(
            Some(attacker_id),
            VictoryReason::HeroDefeated { loser: defender_id },
        );
        report.notify(Outcome::game_over(
            format!("Player {attacker_id} wins!"),
            format!("{name} has fallen."),
        ));
    } else {
        report.notify(Outcome::success(
            "Attack successful!",
            format!("{name} takes {dealt} damage ({remaining_hp} hp left)."),
        ));
    }
}

/// All or nothing: the strike must match the roster's combined health.
fn strike_units(
    state: &mut GameState,
    attacker_id: PlayerId,
    defender_id: PlayerId,
    target: Target,
    value: u32,
    report: &mut Report,
) {
    let Some(defender) = state.get_player_mut(defender_id) else {
        return;
    };
    let threshold = defender.total_unit_hp();
    if value < threshold {
        report.event(GameEvent::AttackRepelled {
            player_id: attacker_id,
            target,
            attack_value: value,
            threshold,
        });
        report.notify(Outcome::info(
            "Attack unsuccessful!",
            format!("{value} damage cannot break units with {threshold} total hp."),
        ));
        return;
    }

    let destroyed: Vec<_> = defender.units.drain(..).map(|unit| unit.id).collect();
    report.notify(Outcome::success(
        "Units destroyed!",
        format!("All {} enemy units were wiped out.", destroyed.len()),
    ));
    report.event(GameEvent::UnitsDestroyed {
        player_id: defender_id,
        unit_ids: destroyed,
    });
}

fn strike_monster(
    state: &mut GameState,
    attacker_id: PlayerId,
    index: usize,
    target: Target,
    value: u32,
    report: &mut Report,
) {
    let Some(threshold) = state.monsters.get(index).map(|monster| monster.hp) else {
        return;
    };
    if value < threshold {
        report.event(GameEvent::AttackRepelled {
            player_id: attacker_id,
            target,
            attack_value: value,
            threshold,
        });
        report.notify(Outcome::info(
            "Attack unsuccessful!",
            format!("{value} damage is not enough against {threshold} hp."),
        ));
        return;
    }

    let monster = state.monsters.remove(index);
    let Some(attacker) = state.get_player_mut(attacker_id) else {
        return;
    };
    // The reward stands even if the counterattack below ends the duel.
    attacker.gold = attacker.gold.saturating_add(monster.gold_reward);
    report.event(GameEvent::MonsterDefeated {
        player_id: attacker_id,
        monster_id: monster.id,
        gold_reward: monster.gold_reward,
    });
    report.notify(Outcome::success(
        "Monster defeated!",
        format!("{} falls. +{} gold.", monster.name, monster.gold_reward),
    ));

    let Some(hero) = attacker.hero.as_mut() else {
        return;
    };
    let damage = counterattack_damage(&monster, hero);
    if damage == 0 {
        return;
    }
    let dealt = hero.take_damage(damage);
    let remaining_hp = hero.hp;
    report.event(GameEvent::Counterattack {
        player_id: attacker_id,
        monster_id: monster.id,
        amount: dealt,
        remaining_hp,
    });
    report.notify(Outcome::info(
        format!("{} counterattacked!", monster.name),
        format!("Your hero takes {dealt} damage ({remaining_hp} hp left)."),
    ));

    if remaining_hp == 0 {
        let winner = state.opponent_of(attacker_id);
        state.declare_victory(
            winner,
            VictoryReason::KilledByMonster {
                loser: attacker_id,
                monster_id: monster.id,
            },
        );
        report.notify(Outcome::game_over(
            format!("Player {attacker_id} defeated!"),
            format!("{} struck down your hero in its final moment.", monster.name),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{ActionPhase, GamePhase, HeroClass, Selection, PLAYER_ONE, PLAYER_TWO};

    fn armed(actor: ActorKind, attack_type: AttackType) -> GameState {
        let mut state = GameState::sample();
        state.action_phase = match actor {
            ActorKind::Hero => ActionPhase::HeroAction,
            ActorKind::Unit => ActionPhase::UnitAction,
        };
        state.selection = Some(Selection {
            actor,
            unit_index: None,
        });
        state.targeting_mode = true;
        state.attack_type = Some(attack_type);
        state
    }

    fn set_hero(state: &mut GameState, player: usize, hero: Hero) {
        state.players[player].hero = Some(hero);
    }

    #[test]
    fn huge_rosters_saturate_instead_of_wrapping() {
        let mut state = armed(ActorKind::Unit, AttackType::Physical);
        let mut reserve = state.players[1].units[0].clone();
        reserve.id = 103;
        reserve.role = crate::game::state::UnitRole::Standard;
        state.players[1].units.push(reserve);
        for unit in &mut state.players[1].units {
            unit.hp = u32::MAX;
            unit.max_hp = u32::MAX;
        }
        assert_eq!(state.integrity_check(), Ok(()));

        let mut report = Report::default();
        attack(&mut state, Target::Unit { player_id: PLAYER_TWO, index: 0 }, &mut report)
            .expect("attack resolves");
        assert_eq!(state.players[1].units.len(), 2);
        assert!(report.events.iter().any(|event| matches!(
            event,
            GameEvent::AttackRepelled { threshold: u32::MAX, .. }
        )));
    }

    #[test]
    fn counterattack_saturates_on_huge_monsters() {
        let mut state = GameState::sample();
        state.monsters[0].ap = u32::MAX;
        state.monsters[0].mp = u32::MAX;
        let knight = state.players[0].hero.clone().expect("sample hero");
        assert_eq!(counterattack_damage(&state.monsters[0], &knight), u32::MAX);
    }

    #[test]
    fn physical_hero_strike_is_reduced_by_rp() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        state.players[1].units.clear();
        set_hero(
            &mut state,
            0,
            Hero::new(1, "A", HeroClass::Warrior).with_stats(20, 6, 0, 1, 1, 1),
        );
        set_hero(
            &mut state,
            1,
            Hero::new(2, "B", HeroClass::Warrior).with_stats(10, 1, 0, 2, 2, 1),
        );

        attack(&mut state, Target::Hero { player_id: PLAYER_TWO }, &mut Report::default())
            .expect("attack resolves");
        assert_eq!(state.players[1].hero.as_ref().map(|hero| hero.hp), Some(6));
        assert_eq!(state.remaining_hero_actions, 0);
        assert!(state.actions_used.hero_action);
        assert!(!state.targeting_mode);
    }

    #[test]
    fn landed_hits_always_deal_at_least_one() {
        let defender = Hero::new(2, "Wall", HeroClass::Warrior).with_stats(10, 0, 0, 9, 9, 1);
        assert_eq!(hero_damage(3, &defender, AttackType::Physical), 1);
        assert_eq!(hero_damage(0, &defender, AttackType::Magical), 1);
        assert_eq!(hero_damage(12, &defender, AttackType::Magical), 3);
    }

    #[test]
    fn killing_blow_ends_the_duel() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        state.players[1].units.clear();
        if let Some(hero) = state.players[1].hero.as_mut() {
            hero.hp = 3;
        }
        let mut report = Report::default();
        attack(&mut state, Target::Hero { player_id: PLAYER_TWO }, &mut report).expect("attack resolves");

        assert_eq!(state.game_phase, GamePhase::GameOver);
        let outcome = state.outcome.as_ref().expect("winner declared");
        assert_eq!(outcome.winner, Some(PLAYER_ONE));
        assert_eq!(outcome.reason, VictoryReason::HeroDefeated { loser: PLAYER_TWO });
        assert_eq!(report.outcomes.last().map(|o| o.title.as_str()), Some("Player 1 wins!"));
    }

    #[test]
    fn provocateur_shields_hero_and_other_units() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        let error = attack(&mut state, Target::Hero { player_id: PLAYER_TWO }, &mut Report::default())
            .unwrap_err();
        assert_eq!(error, RuleError::ProvocateurBlocks { provocateur_index: 0 });

        let mut extra = state.players[1].units[0].clone();
        extra.id = 777;
        extra.role = crate::game::state::UnitRole::Standard;
        state.players[1].units.push(extra);
        let error = attack(
            &mut state,
            Target::Unit { player_id: PLAYER_TWO, index: 1 },
            &mut Report::default(),
        )
        .unwrap_err();
        assert_eq!(error, RuleError::ProvocateurBlocks { provocateur_index: 0 });

        attack(
            &mut state,
            Target::Unit { player_id: PLAYER_TWO, index: 0 },
            &mut Report::default(),
        )
        .expect("the provocateur itself is a legal target");
    }

    #[test]
    fn monsters_ignore_the_taunt_rule() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        attack(&mut state, Target::Monster { index: 0 }, &mut Report::default())
            .expect("monsters are always targetable");
    }

    #[test]
    fn own_side_is_not_a_target() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        let error = attack(&mut state, Target::Hero { player_id: PLAYER_ONE }, &mut Report::default())
            .unwrap_err();
        assert_eq!(error, RuleError::InvalidTarget);
        let error = attack(&mut state, Target::Monster { index: 5 }, &mut Report::default())
            .unwrap_err();
        assert_eq!(error, RuleError::TargetNotFound);
    }

    #[test]
    fn unit_pool_below_total_hp_changes_nothing() {
        let mut state = armed(ActorKind::Unit, AttackType::Physical);
        state.players[0].units[0].ap = 5;
        state.players[1].units[0].hp = 8;
        let mut report = Report::default();
        attack(
            &mut state,
            Target::Unit { player_id: PLAYER_TWO, index: 0 },
            &mut report,
        )
        .expect("attack resolves");

        assert_eq!(state.players[1].units.len(), 1);
        assert!(state.actions_used.unit_action);
        assert_eq!(report.outcomes[0].title, "Attack unsuccessful!");
    }

    #[test]
    fn unit_pool_matching_total_hp_wipes_the_roster() {
        let mut state = armed(ActorKind::Unit, AttackType::Physical);
        state.players[0].units[0].ap = 5;
        state.players[1].units[0].hp = 5;
        attack(
            &mut state,
            Target::Unit { player_id: PLAYER_TWO, index: 0 },
            &mut Report::default(),
        )
        .expect("attack resolves");
        assert!(state.players[1].units.is_empty());
    }

    #[test]
    fn slain_monster_pays_out_and_strikes_back() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        set_hero(
            &mut state,
            0,
            Hero::new(1, "A", HeroClass::Warrior).with_stats(20, 6, 0, 1, 1, 1),
        );
        state.monsters[0].ap = 3;
        state.monsters[0].mp = 0;
        state.monsters[0].gold_reward = 2;
        let gold_before = state.players[0].gold;

        attack(&mut state, Target::Monster { index: 0 }, &mut Report::default())
            .expect("attack resolves");

        assert_eq!(state.players[0].gold, gold_before + 2);
        assert_eq!(state.players[0].hero.as_ref().map(|hero| hero.hp), Some(18));
        assert_eq!(state.monsters.len(), 1);
    }

    #[test]
    fn surviving_monster_keeps_its_place() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        state.monsters[0].hp = 7;
        attack(&mut state, Target::Monster { index: 0 }, &mut Report::default())
            .expect("attack resolves");
        assert_eq!(state.monsters.len(), 2);
        assert_eq!(state.remaining_hero_actions, 0);
    }

    #[test]
    fn counterattack_kill_still_pays_the_reward() {
        let mut state = armed(ActorKind::Hero, AttackType::Physical);
        if let Some(hero) = state.players[0].hero.as_mut() {
            hero.hp = 1;
        }
        state.monsters[0].ap = 5;
        let monster_id = state.monsters[0].id;
        let gold_before = state.players[0].gold;
        let mut report = Report::default();

        attack(&mut state, Target::Monster { index: 0 }, &mut report).expect("attack resolves");

        assert_eq!(state.players[0].gold, gold_before + 2);
        let outcome = state.outcome.as_ref().expect("game over");
        assert_eq!(outcome.winner, Some(PLAYER_TWO));
        assert_eq!(
            outcome.reason,
            VictoryReason::KilledByMonster { loser: PLAYER_ONE, monster_id }
        );
        assert_eq!(report.outcomes.last().map(|o| o.kind), Some(crate::game::rules::OutcomeKind::GameOver));
    }

    #[test]
    fn attack_requires_selection_and_type() {
        let mut state = GameState::sample();
        let error = attack(&mut state, Target::Monster { index: 0 }, &mut Report::default())
            .unwrap_err();
        assert_eq!(error, RuleError::NoActiveSelection);

        let mut state = armed(ActorKind::Unit, AttackType::Physical);
        state.attack_type = None;
        let error = attack(&mut state, Target::Monster { index: 0 }, &mut Report::default())
            .unwrap_err();
        assert_eq!(error, RuleError::AttackTypeRequired);
    }
}
