use serde_json::Value;

use crate::api::hawk::InitMatch;
use crate::models::GameClock;

/// Longest game time seen across the state snapshots
///
/// Snapshots recorded after the match ended are not always monotonic, so
/// the maximum is used rather than the last entry.
pub fn final_game_time(init_match: Option<&InitMatch>) -> Option<GameClock> {
    init_match?
        .states
        .iter()
        .flatten()
        .filter_map(|state| state.game_time.as_ref().and_then(seconds))
        .max()
        .map(|seconds| GameClock { seconds })
}

fn seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
