#![cfg(target_arch = "wasm32")]

use hero_duel::{GameEngine, GameState, RuleResolution};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn engine_plays_an_opening_turn() {
    let mut engine = GameEngine::new(Some(r#"{"seed": 42}"#.to_string())).expect("engine builds");
    engine.initialize().expect("initialize");
    engine.select_hero(1, 1).expect("player one picks");
    let json = engine.select_hero(2, 2).expect("player two picks");

    let resolution: RuleResolution = serde_json::from_str(&json).expect("resolution parses");
    assert!(resolution.rejection.is_none());
    assert_eq!(resolution.state.day, 1);
    assert_eq!(resolution.state.monsters.len(), 2);
    assert_eq!(engine.location_day(), 1);
    assert_eq!(engine.days_remaining(), 17);
}

#[wasm_bindgen_test]
fn rejections_come_back_as_resolutions() {
    let mut engine = GameEngine::new(None).expect("engine builds");
    let sample = serde_json::to_string(&GameState::sample()).expect("sample serializes");
    engine.set_state_json(&sample).expect("sample loads");

    let json = engine
        .attack_json(r#"{"type":"monster","index":0}"#)
        .expect("rejections are not errors");
    let resolution: RuleResolution = serde_json::from_str(&json).expect("resolution parses");
    assert!(resolution.rejection.is_some());
}

#[wasm_bindgen_test]
fn invalid_config_is_an_error() {
    assert!(GameEngine::new(Some(r#"{"days_per_location": 0}"#.to_string())).is_err());
}
