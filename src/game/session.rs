use super::catalog::{Catalog, StandardCatalog};
use super::config::EngineConfig;
use super::rules::{Command, RuleEngine, RuleResolution};
use super::state::{ActorKind, AttackType, CardId, GameState, IntegrityError, PlayerId, Target};

/// Owns the current snapshot and swaps it for whatever each operation returns.
#[derive(Debug, Clone)]
pub struct GameSession<C: Catalog = StandardCatalog> {
    engine: RuleEngine<C>,
    state: GameState,
}

impl GameSession<StandardCatalog> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_engine(RuleEngine::new(config))
    }
}

impl Default for GameSession<StandardCatalog> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C: Catalog> GameSession<C> {
    pub fn with_engine(engine: RuleEngine<C>) -> Self {
        Self {
            engine,
            state: GameState::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine(&self) -> &RuleEngine<C> {
        &self.engine
    }

    /// Replaces the snapshot with one supplied from outside, if it is sound.
    pub fn load(&mut self, state: GameState) -> Result<(), IntegrityError> {
        state.integrity_check()?;
        self.state = state;
        Ok(())
    }

    pub fn apply(&mut self, command: Command) -> RuleResolution {
        let resolution = self.engine.apply(&self.state, command);
        self.state = resolution.state.clone();
        resolution
    }

    pub fn initialize(&mut self) -> RuleResolution {
        self.apply(Command::Initialize)
    }

    pub fn reset(&mut self) -> RuleResolution {
        self.apply(Command::Reset)
    }

    pub fn select_hero(&mut self, hero_id: CardId, player_id: PlayerId) -> RuleResolution {
        self.apply(Command::SelectHero { hero_id, player_id })
    }

    pub fn start_turn(&mut self, player_id: PlayerId) -> RuleResolution {
        self.apply(Command::StartTurn { player_id })
    }

    pub fn buy(&mut self, offer_index: usize) -> RuleResolution {
        self.apply(Command::Buy { offer_index })
    }

    pub fn advance_phase(&mut self) -> RuleResolution {
        self.apply(Command::AdvancePhase)
    }

    pub fn select(&mut self, actor: ActorKind, unit_index: Option<usize>) -> RuleResolution {
        self.apply(Command::Select { actor, unit_index })
    }

    pub fn select_attack_type(&mut self, attack_type: AttackType) -> RuleResolution {
        self.apply(Command::SelectAttackType { attack_type })
    }

    pub fn attack(&mut self, target: Target) -> RuleResolution {
        self.apply(Command::Attack { target })
    }

    pub fn cancel(&mut self) -> RuleResolution {
        self.apply(Command::Cancel)
    }
}
