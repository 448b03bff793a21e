//! WASM bindings for a browser front end

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::{analyze, node_labels, OracleKind, Strategy};

fn parse_strategy(bits: &str) -> Result<Strategy, JsError> {
    Strategy::from_string(bits).map_err(|e| JsError::new(&format!("Invalid strategy: {}", e)))
}

/// Analyze a strategy given as 16 characters over {c, d}
///
/// # Arguments
/// * `bits` - Strategy string, state id 0 first
/// * `oracle_json` - Optional JSON oracle name (`"bellman-ford"` or `"floyd-warshall"`)
///
/// # Returns
/// JSON serialized StrategyReport
#[wasm_bindgen]
pub fn analyze_strategy(bits: &str, oracle_json: Option<String>) -> Result<JsValue, JsError> {
    let strategy = parse_strategy(bits)?;
    let oracle: OracleKind = match oracle_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsError::new(&format!("Invalid oracle: {}", e)))?,
        None => OracleKind::default(),
    };

    let report = analyze(&strategy, &oracle).map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&report)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// The `action|state` table of a strategy
#[wasm_bindgen]
pub fn strategy_table(bits: &str) -> Result<String, JsError> {
    Ok(format!("{:#}", parse_strategy(bits)?))
}

/// Strategy string for its integer form
#[wasm_bindgen]
pub fn strategy_from_int(n: u16) -> String {
    Strategy::from_int(n).to_string()
}

/// Integer form of a strategy string
#[wasm_bindgen]
pub fn strategy_to_int(bits: &str) -> Result<u16, JsError> {
    Ok(parse_strategy(bits)?.to_int())
}

/// Self-play transition edges as `[from, to]` pairs, for drawing the graph
#[wasm_bindgen]
pub fn self_play_edges(bits: &str) -> Result<JsValue, JsError> {
    let strategy = parse_strategy(bits)?;
    let edges: Vec<(usize, usize)> = strategy.transition_graph_with_self().edges().to_vec();

    serde_wasm_bindgen::to_value(&edges)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// `"{id}_{state}"` labels for the 16 graph nodes
#[wasm_bindgen]
pub fn state_labels() -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&node_labels())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Get all named strategies with their strings
#[wasm_bindgen]
pub fn get_named_strategies() -> Result<JsValue, JsError> {
    let named = [
        ("AllC", "Always cooperate.", Strategy::all_cooperate()),
        ("AllD", "Always defect.", Strategy::all_defect()),
        ("TFT", "Repeat the opponent's last move.", Strategy::tit_for_tat()),
        ("WSLS", "Cooperate after a matched round, defect otherwise.", Strategy::win_stay_lose_shift()),
        ("TF2T", "Defect only after two opponent defections in a row.", Strategy::tit_for_two_tats()),
        ("TFT-ATFT", "Tit-for-tat that recovers cooperation after an error.", Strategy::tft_atft()),
    ];
    let infos: Vec<StrategyInfo> = named
        .iter()
        .map(|(name, description, strategy)| StrategyInfo {
            name: name.to_string(),
            description: description.to_string(),
            bits: strategy.to_string(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&infos)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    name: String,
    description: String,
    bits: String,
}
