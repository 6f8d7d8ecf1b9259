use serde::{Deserialize, Serialize};

use super::{
    catalog::{Catalog, StandardCatalog},
    combat,
    config::EngineConfig,
    economy, phases, progression,
    state::{
        ActionPhase, ActorKind, AttackType, CardId, GameEvent, GamePhase, GameState, Hero,
        IntegrityError, PlayerId, Target, VictoryState,
    },
    targeting,
};

/// Broad class of a rejection, so callers can tell misuse from rule breaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCategory {
    Precondition,
    RuleViolation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("the duel is already over")]
    GameFinished,
    #[error("not allowed during {actual:?}")]
    WrongGamePhase { actual: GamePhase },
    #[error("only allowed during {expected:?}, currently {actual:?}")]
    WrongActionPhase {
        expected: ActionPhase,
        actual: ActionPhase,
    },
    #[error("player {player_id} is not part of this duel")]
    PlayerNotFound { player_id: PlayerId },
    #[error("no hero template with id {hero_id}")]
    HeroNotFound { hero_id: CardId },
    #[error("player {player_id} already has a hero")]
    HeroAlreadySelected { player_id: PlayerId },
    #[error("the {phase:?} action was already used this turn")]
    ActionAlreadyUsed { phase: ActionPhase },
    #[error("there is no shop offer at position {index}")]
    OfferNotFound { index: usize },
    #[error("this costs {required} gold but you only have {available}")]
    InsufficientGold { required: u32, available: u32 },
    #[error("you cannot command more than {limit} units")]
    UnitLimitReached { limit: usize },
    #[error("player {player_id} has no hero")]
    NoHero { player_id: PlayerId },
    #[error("your hero has no actions left this turn")]
    NoActionsRemaining,
    #[error("you have no units to command")]
    NoUnits,
    #[error("there is no unit at position {index}")]
    UnitNotFound { index: usize },
    #[error("choose physical or magical before attacking")]
    AttackTypeRequired,
    #[error("the selected attacker has no power of that kind")]
    NoAttackPower,
    #[error("select a hero or your units first")]
    NoActiveSelection,
    #[error("you cannot attack your own side")]
    InvalidTarget,
    #[error("that target does not exist")]
    TargetNotFound,
    #[error("the provocateur at position {provocateur_index} must be defeated first")]
    ProvocateurBlocks { provocateur_index: usize },
    #[error("state failed its integrity check: {error}")]
    IntegrityViolation { error: IntegrityError },
}

impl RuleError {
    pub fn category(&self) -> RejectionCategory {
        match self {
            RuleError::InvalidTarget | RuleError::ProvocateurBlocks { .. } => {
                RejectionCategory::RuleViolation
            }
            _ => RejectionCategory::Precondition,
        }
    }

    /// A taunt violation drops the pending attack; every other rejection
    /// leaves the snapshot untouched.
    pub fn clears_selection(&self) -> bool {
        matches!(self, RuleError::ProvocateurBlocks { .. })
    }

    pub fn outcome(&self) -> Outcome {
        let title = match self {
            RuleError::ActionAlreadyUsed { .. } => "Action already used!",
            RuleError::InsufficientGold { .. } => "Not enough gold!",
            RuleError::UnitLimitReached { .. } => "Unit limit reached!",
            RuleError::NoActionsRemaining => "No actions remaining!",
            RuleError::AttackTypeRequired => "Select attack type",
            RuleError::ProvocateurBlocks { .. } | RuleError::InvalidTarget => "Cannot attack!",
            RuleError::GameFinished => "Game over",
            _ => "Not allowed",
        };
        Outcome::rejected(title, self.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Info,
    Success,
    Rejected,
    GameOver,
}

/// Notice for the presentation layer to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub title: String,
    pub detail: String,
}

impl Outcome {
    fn with_kind(kind: OutcomeKind, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_kind(OutcomeKind::Info, title, detail)
    }

    pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_kind(OutcomeKind::Success, title, detail)
    }

    pub fn rejected(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_kind(OutcomeKind::Rejected, title, detail)
    }

    pub fn game_over(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_kind(OutcomeKind::GameOver, title, detail)
    }
}

/// Scratch collector handed to every component during one operation.
#[derive(Debug, Default)]
pub(crate) struct Report {
    pub(crate) events: Vec<GameEvent>,
    pub(crate) outcomes: Vec<Outcome>,
}

impl Report {
    pub(crate) fn event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn notify(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RuleError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victory: Option<VictoryState>,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>, outcomes: Vec<Outcome>) -> Self {
        let victory = state.outcome.clone();
        if let Some(ref outcome) = victory {
            let has_event = events
                .iter()
                .any(|event| matches!(event, GameEvent::GameOver { .. }));
            if !has_event {
                events.push(GameEvent::GameOver {
                    winner: outcome.winner,
                    reason: outcome.reason.clone(),
                });
            }
        }

        Self {
            state,
            events,
            outcomes,
            rejection: None,
            victory,
        }
    }

    pub fn rejected(state: GameState, error: RuleError) -> Self {
        let victory = state.outcome.clone();
        Self {
            state,
            events: Vec::new(),
            outcomes: vec![error.outcome()],
            rejection: Some(error),
            victory,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    /// The notice to show: a game-over notice wins, otherwise the latest one.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.kind == OutcomeKind::GameOver)
            .or_else(|| self.outcomes.last())
    }
}

/// Every operation the engine accepts, for JSON-driven callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Initialize,
    Reset,
    SelectHero { hero_id: CardId, player_id: PlayerId },
    StartTurn { player_id: PlayerId },
    Buy { offer_index: usize },
    AdvancePhase,
    Select {
        actor: ActorKind,
        #[serde(default)]
        unit_index: Option<usize>,
    },
    SelectAttackType { attack_type: AttackType },
    Attack { target: Target },
    Cancel,
}

/// Applies operations to snapshots. The input snapshot is never touched; each
/// call hands back a fresh one, or the prior one with a rejection attached.
#[derive(Debug, Clone)]
pub struct RuleEngine<C: Catalog = StandardCatalog> {
    config: EngineConfig,
    catalog: C,
}

impl RuleEngine<StandardCatalog> {
    pub fn new(config: EngineConfig) -> Self {
        let catalog = StandardCatalog::new(config.seed, config.provocateur_odds);
        Self { config, catalog }
    }
}

impl Default for RuleEngine<StandardCatalog> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C: Catalog> RuleEngine<C> {
    pub fn with_catalog(config: EngineConfig, catalog: C) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn heroes(&self) -> Vec<Hero> {
        self.catalog.heroes()
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    fn ensure_active(state: &GameState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        Ok(())
    }

    fn ensure_player_turn(state: &GameState) -> Result<(), RuleError> {
        Self::ensure_active(state)?;
        if !state.is_player_turn() {
            return Err(RuleError::WrongGamePhase {
                actual: state.game_phase,
            });
        }
        Ok(())
    }

    /// Runs `operation` against a working copy and commits it only on success.
    fn transact<F>(&mut self, state: &GameState, operation: F) -> RuleResolution
    where
        F: FnOnce(&mut GameState, &mut C, &EngineConfig, &mut Report) -> Result<(), RuleError>,
    {
        let mut working = state.clone();
        let mut report = Report::default();
        let logged = working.event_log.len();
        self.catalog.reserve_ids(state.highest_card_id());

        let result = Self::ensure_integrity(state)
            .and_then(|_| operation(&mut working, &mut self.catalog, &self.config, &mut report));
        if let Err(error) = result {
            let mut prior = state.clone();
            if error.clears_selection() {
                prior.clear_selection();
            }
            return RuleResolution::rejected(prior, error);
        }

        phases::settle(&mut working, &mut report);
        working.evaluate_victory();

        // declare_victory logs straight into the snapshot; keep it after the
        // events that led to it.
        let concluded: Vec<GameEvent> = working.event_log.drain(logged..).collect();
        let mut events = report.events;
        events.extend(concluded);
        working.event_log.extend(events.iter().cloned());
        working.trim_event_log(self.config.event_log_limit);

        RuleResolution::new(working, events, report.outcomes)
    }

    /// Fresh duel waiting for both heroes.
    pub fn initialize(&mut self) -> RuleResolution {
        let mut state = GameState::new().with_phase(GamePhase::ChooseHero);
        state.record_event(GameEvent::GameInitialized);
        RuleResolution::new(
            state,
            vec![GameEvent::GameInitialized],
            vec![Outcome::info(
                "Choose your heroes",
                "Each player picks a hero to begin.",
            )],
        )
    }

    pub fn reset(&mut self) -> RuleResolution {
        RuleResolution::new(GameState::new(), Vec::new(), Vec::new())
    }

    pub fn select_hero(
        &mut self,
        state: &GameState,
        hero_id: CardId,
        player_id: PlayerId,
    ) -> RuleResolution {
        let template = self.heroes().into_iter().find(|hero| hero.id == hero_id);
        self.transact(state, |state, catalog, config, report| {
            Self::ensure_active(state)?;
            if state.game_phase != GamePhase::ChooseHero {
                return Err(RuleError::WrongGamePhase {
                    actual: state.game_phase,
                });
            }
            let hero = template.ok_or(RuleError::HeroNotFound { hero_id })?;
            let player = state
                .get_player_mut(player_id)
                .ok_or(RuleError::PlayerNotFound { player_id })?;
            if player.hero.is_some() {
                return Err(RuleError::HeroAlreadySelected { player_id });
            }

            report.notify(Outcome::success(
                format!("{} chosen", hero.name),
                format!("Player {player_id} will fight as the {}.", hero.name),
            ));
            player.hero = Some(hero);
            report.event(GameEvent::HeroSelected { player_id, hero_id });

            if state.both_heroes_chosen() {
                if phases::begin_opening_turn(state, config, report) {
                    progression::refill_monsters(state, catalog, config, report);
                    economy::restock_shop(state, catalog, config, report);
                }
            }
            Ok(())
        })
    }

    pub fn start_turn(&mut self, state: &GameState, player_id: PlayerId) -> RuleResolution {
        self.transact(state, |state, _catalog, config, report| {
            Self::ensure_player_turn(state)?;
            if state.get_player(player_id).is_none() {
                return Err(RuleError::PlayerNotFound { player_id });
            }
            phases::begin_turn(state, player_id, config, report);
            Ok(())
        })
    }

    pub fn buy(&mut self, state: &GameState, offer_index: usize) -> RuleResolution {
        self.transact(state, |state, catalog, config, report| {
            Self::ensure_player_turn(state)?;
            if state.action_phase != ActionPhase::Buy {
                return Err(RuleError::WrongActionPhase {
                    expected: ActionPhase::Buy,
                    actual: state.action_phase,
                });
            }
            economy::purchase(state, offer_index, catalog, config, report)
        })
    }

    pub fn advance_phase(&mut self, state: &GameState) -> RuleResolution {
        self.transact(state, |state, catalog, config, report| {
            Self::ensure_player_turn(state)?;
            phases::advance(state, catalog, config, report);
            Ok(())
        })
    }

    pub fn select(
        &mut self,
        state: &GameState,
        actor: ActorKind,
        unit_index: Option<usize>,
    ) -> RuleResolution {
        self.transact(state, |state, _catalog, _config, report| {
            Self::ensure_player_turn(state)?;
            targeting::select(state, actor, unit_index, report)
        })
    }

    pub fn select_attack_type(&mut self, state: &GameState, attack_type: AttackType) -> RuleResolution {
        self.transact(state, |state, _catalog, _config, report| {
            Self::ensure_player_turn(state)?;
            targeting::select_attack_type(state, attack_type, report)
        })
    }

    pub fn attack(&mut self, state: &GameState, target: Target) -> RuleResolution {
        self.transact(state, |state, _catalog, _config, report| {
            Self::ensure_player_turn(state)?;
            combat::attack(state, target, report)
        })
    }

    pub fn cancel(&mut self, state: &GameState) -> RuleResolution {
        self.transact(state, |state, _catalog, _config, _report| {
            targeting::cancel(state);
            Ok(())
        })
    }

    pub fn apply(&mut self, state: &GameState, command: Command) -> RuleResolution {
        match command {
            Command::Initialize => self.initialize(),
            Command::Reset => self.reset(),
            Command::SelectHero { hero_id, player_id } => self.select_hero(state, hero_id, player_id),
            Command::StartTurn { player_id } => self.start_turn(state, player_id),
            Command::Buy { offer_index } => self.buy(state, offer_index),
            Command::AdvancePhase => self.advance_phase(state),
            Command::Select { actor, unit_index } => self.select(state, actor, unit_index),
            Command::SelectAttackType { attack_type } => self.select_attack_type(state, attack_type),
            Command::Attack { target } => self.attack(state, target),
            Command::Cancel => self.cancel(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::FixedCatalog;
    use crate::game::state::{Location, PLAYER_ONE, PLAYER_TWO};

    fn engine() -> RuleEngine<FixedCatalog> {
        RuleEngine::with_catalog(EngineConfig::default(), FixedCatalog::new())
    }

    fn choose_heroes(engine: &mut RuleEngine<FixedCatalog>) -> GameState {
        let state = engine.initialize().state;
        let state = engine.select_hero(&state, 1, PLAYER_ONE).state;
        engine.select_hero(&state, 2, PLAYER_TWO).state
    }

    #[test]
    fn second_hero_starts_the_opening_turn() {
        let mut engine = engine();
        let state = choose_heroes(&mut engine);

        assert_eq!(state.game_phase, GamePhase::Player1Turn);
        assert_eq!(state.current_player, PLAYER_ONE);
        assert_eq!(state.day, 1);
        assert_eq!(state.location, Location::Forest);
        assert_eq!(state.players[0].gold, 0);
        assert_eq!(state.monsters.len(), 2);
        assert_eq!(state.shop.len(), 2);
        assert_eq!(state.action_phase, ActionPhase::HeroAction);
        assert!(state.event_log.contains(&GameEvent::PhaseSkipped {
            player_id: PLAYER_ONE,
            phase: ActionPhase::Buy,
        }));
        assert_eq!(state.integrity_check(), Ok(()));
    }

    #[test]
    fn heroes_cannot_be_chosen_twice_or_outside_hero_selection() {
        let mut engine = engine();
        let state = engine.initialize().state;
        let state = engine.select_hero(&state, 1, PLAYER_ONE).state;

        let again = engine.select_hero(&state, 2, PLAYER_ONE);
        assert_eq!(
            again.rejection,
            Some(RuleError::HeroAlreadySelected { player_id: PLAYER_ONE })
        );
        assert_eq!(again.state, state);

        let unknown = engine.select_hero(&state, 99, PLAYER_TWO);
        assert_eq!(unknown.rejection, Some(RuleError::HeroNotFound { hero_id: 99 }));

        let setup = engine.reset().state;
        let early = engine.select_hero(&setup, 1, PLAYER_ONE);
        assert_eq!(
            early.rejection,
            Some(RuleError::WrongGamePhase { actual: GamePhase::Setup })
        );
    }

    #[test]
    fn rejection_returns_the_prior_snapshot() {
        let mut engine = engine();
        let mut state = GameState::sample();
        state.players[0].gold = 2;
        state.action_phase = ActionPhase::Buy;

        let resolution = engine.buy(&state, 0);
        assert!(resolution.is_rejected());
        assert_eq!(resolution.state, state);
        assert!(resolution.events.is_empty());
        let notice = resolution.outcome().expect("rejection carries a notice");
        assert_eq!(notice.kind, OutcomeKind::Rejected);
        assert_eq!(notice.title, "Not enough gold!");
    }

    #[test]
    fn successful_operations_append_to_the_event_log() {
        let mut engine = engine();
        let state = GameState::sample();
        let logged = state.event_log.len();

        let resolution = engine.buy(&state, 1);
        assert!(!resolution.is_rejected());
        assert_eq!(
            resolution.state.event_log.len(),
            logged + resolution.events.len()
        );
        assert!(resolution
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::CardPurchased { .. })));
    }

    #[test]
    fn event_log_keeps_only_the_latest_entries() {
        let config = EngineConfig {
            event_log_limit: 3,
            ..EngineConfig::default()
        };
        let mut engine = RuleEngine::with_catalog(config, FixedCatalog::new());
        let mut state = GameState::sample();
        for _ in 0..6 {
            state = engine.advance_phase(&state).state;
            assert!(state.event_log.len() <= 3);
        }
        let resolution = engine.advance_phase(&state);
        let latest = resolution.events.last().cloned();
        assert_eq!(resolution.state.event_log.last().cloned(), latest);
    }

    #[test]
    fn corrupt_snapshots_are_rejected() {
        let mut engine = engine();
        let mut state = GameState::sample();
        state.monsters[1].id = state.monsters[0].id;
        let resolution = engine.advance_phase(&state);
        assert!(matches!(
            resolution.rejection,
            Some(RuleError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn finished_duels_reject_play() {
        let mut engine = engine();
        let mut state = GameState::sample();
        state.declare_victory(
            Some(PLAYER_ONE),
            crate::game::state::VictoryReason::HeroDefeated { loser: PLAYER_TWO },
        );
        assert_eq!(engine.advance_phase(&state).rejection, Some(RuleError::GameFinished));
        assert!(engine.cancel(&state).rejection.is_none());
    }

    #[test]
    fn commands_dispatch_from_json() {
        let mut engine = engine();
        let state = GameState::sample();
        let command: Command =
            serde_json::from_str(r#"{"type":"select","actor":"hero"}"#).expect("command parses");
        let skipped = engine.advance_phase(&state).state;
        let resolution = engine.apply(&skipped, command);
        assert!(!resolution.is_rejected());
        assert!(resolution.state.targeting_mode);
        assert_eq!(resolution.state.attack_type, Some(AttackType::Physical));
    }

    #[test]
    fn rejection_categories_separate_rule_breaks() {
        assert_eq!(
            RuleError::ProvocateurBlocks { provocateur_index: 0 }.category(),
            RejectionCategory::RuleViolation
        );
        assert_eq!(
            RuleError::InsufficientGold { required: 4, available: 1 }.category(),
            RejectionCategory::Precondition
        );
        assert!(RuleError::ProvocateurBlocks { provocateur_index: 0 }.clears_selection());
        assert!(!RuleError::AttackTypeRequired.clears_selection());
    }

    #[test]
    fn resolution_json_carries_tagged_rejection() {
        let mut engine = engine();
        let state = GameState::sample();
        let resolution = engine.attack(&state, Target::Monster { index: 0 });
        let json = serde_json::to_value(&resolution).expect("resolution serializes");
        assert_eq!(json["rejection"]["type"], "NoActiveSelection");
        assert_eq!(json["outcomes"][0]["kind"], "rejected");
    }
}
