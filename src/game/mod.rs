//! Core duel logic: state model, phase machine, combat and the rule engine.

pub mod catalog;
pub mod combat;
pub mod config;
pub mod economy;
pub mod phases;
pub mod progression;
pub mod rules;
pub mod session;
pub mod state;
pub mod targeting;

pub use catalog::{Catalog, StandardCatalog};
pub use config::{ConfigError, EngineConfig, StipendPolicy};
pub use rules::{
    Command, Outcome, OutcomeKind, RejectionCategory, RuleEngine, RuleError, RuleResolution,
};
pub use session::GameSession;
pub use state::{
    ActionPhase,
    ActionsUsed,
    ActorKind,
    AttackType,
    Card,
    CardId,
    Equipment,
    EquipmentSlot,
    GameEvent,
    GamePhase,
    GameState,
    Hero,
    HeroClass,
    IntegrityError,
    Location,
    Monster,
    Player,
    PlayerId,
    Selection,
    Stat,
    Target,
    Unit,
    UnitRole,
    VictoryReason,
    VictoryState,
};
