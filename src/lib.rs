pub mod game;

use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

pub use game::{
    ActionPhase, ActorKind, AttackType, Card, CardId, Catalog, Command, ConfigError, EngineConfig,
    GameEvent, GamePhase, GameSession, GameState, Hero, IntegrityError, Location, Outcome,
    OutcomeKind, Player, PlayerId, RejectionCategory, RuleEngine, RuleError, RuleResolution,
    StandardCatalog, StipendPolicy, Target, VictoryReason, VictoryState,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn integrity_to_js_error(error: IntegrityError) -> JsValue {
    to_value(&RuleError::IntegrityViolation { error })
        .unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn report_rejection(resolution: &RuleResolution) {
    if let Some(rejection) = &resolution.rejection {
        warn(&format!("rejected ({:?}): {rejection}", rejection.category()));
    }
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    report_rejection(&resolution);
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

#[wasm_bindgen]
pub struct GameEngine {
    session: GameSession,
}

#[wasm_bindgen]
impl GameEngine {
    /// Builds an engine from an optional `EngineConfig` JSON document.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GameEngine, JsValue> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => EngineConfig::default(),
        };
        log(&format!(
            "hero duel engine ready (seed: {:?}, day limit: {})",
            config.seed, config.day_limit
        ));
        Ok(GameEngine {
            session: GameSession::new(config),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.session.load(state).map_err(integrity_to_js_error)
    }

    pub fn heroes_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.engine().heroes()).map_err(serde_to_js_error)
    }

    /// Runs one serialized `Command`.
    pub fn apply_json(&mut self, command_json: &str) -> Result<String, JsValue> {
        let command: Command = serde_json::from_str(command_json).map_err(serde_to_js_error)?;
        make_resolution_json(self.session.apply(command))
    }

    pub fn initialize(&mut self) -> Result<String, JsValue> {
        make_resolution_json(self.session.initialize())
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        make_resolution_json(self.session.reset())
    }

    pub fn select_hero(&mut self, hero_id: u32, player_id: u8) -> Result<String, JsValue> {
        make_resolution_json(self.session.select_hero(hero_id, player_id))
    }

    pub fn start_turn(&mut self, player_id: u8) -> Result<String, JsValue> {
        make_resolution_json(self.session.start_turn(player_id))
    }

    pub fn buy(&mut self, offer_index: usize) -> Result<String, JsValue> {
        make_resolution_json(self.session.buy(offer_index))
    }

    pub fn advance_phase(&mut self) -> Result<String, JsValue> {
        make_resolution_json(self.session.advance_phase())
    }

    pub fn select(&mut self, actor: &str, unit_index: Option<usize>) -> Result<String, JsValue> {
        let actor = ActorKind::from_str(actor)
            .map_err(|_| JsValue::from_str(&format!("unknown actor kind `{actor}`")))?;
        make_resolution_json(self.session.select(actor, unit_index))
    }

    pub fn select_attack_type(&mut self, attack_type: &str) -> Result<String, JsValue> {
        let parsed = AttackType::from_str(attack_type)
            .map_err(|_| JsValue::from_str(&format!("unknown attack type `{attack_type}`")))?;
        make_resolution_json(self.session.select_attack_type(parsed))
    }

    pub fn attack_json(&mut self, target_json: &str) -> Result<String, JsValue> {
        let target: Target = serde_json::from_str(target_json).map_err(serde_to_js_error)?;
        make_resolution_json(self.session.attack(target))
    }

    pub fn cancel(&mut self) -> Result<String, JsValue> {
        make_resolution_json(self.session.cancel())
    }

    /// Day within the current location, for the "day N of 3" banner.
    pub fn location_day(&self) -> u32 {
        let days_per_location = self.session.engine().config().days_per_location;
        self.session.state().location_day(days_per_location)
    }

    pub fn days_remaining(&self) -> u32 {
        let day_limit = self.session.engine().config().day_limit;
        self.session.state().days_remaining(day_limit)
    }
}

/// A ready mid-duel snapshot for front-end debugging.
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::sample()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state.integrity_check().map_err(integrity_to_js_error)
}

#[wasm_bindgen(js_name = "locationForDay")]
pub fn location_for_day(day: u32) -> Result<JsValue, JsValue> {
    let config = EngineConfig::default();
    let location = game::progression::location_for_day(day, config.days_per_location);
    to_value(&location).map_err(JsValue::from)
}

/// Stateless variant: applies `command` to `state` with a default engine.
#[wasm_bindgen(js_name = "applyCommand")]
pub fn apply_command(state: JsValue, command: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let command: Command = from_value(command).map_err(JsValue::from)?;
    let mut engine = RuleEngine::default();
    let resolution = engine.apply(&state, command);
    report_rejection(&resolution);
    to_value(&resolution).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
