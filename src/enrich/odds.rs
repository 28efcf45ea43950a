use serde_json::Value;

use crate::api::hawk::OddsProvider;
use crate::models::OddsObservation;

/// Earliest quote across all providers, oriented to the canonical team1/team2
///
/// Timestamps are compared as strings. On equal timestamps the first quote
/// encountered wins. Quotes missing either side's price are ignored.
pub fn earliest_odds(providers: &[OddsProvider]) -> Option<OddsObservation> {
    let mut earliest: Option<(OddsObservation, bool)> = None;

    for provider in providers {
        for quote in &provider.odds {
            let (Some(first), Some(second)) = (
                quote.first_team_winner.as_ref().and_then(odds_text),
                quote.second_team_winner.as_ref().and_then(odds_text),
            ) else {
                continue;
            };

            let created_at = quote.created_at.clone().filter(|c| !c.is_empty());

            let replace = match &earliest {
                None => true,
                Some((current, _)) => match (&created_at, &current.created_at) {
                    (Some(created), Some(best)) => created < best,
                    (Some(_), None) => true,
                    (None, _) => false,
                },
            };

            if replace {
                earliest = Some((
                    OddsObservation {
                        team1_odds: first,
                        team2_odds: second,
                        provider: provider.odds_provider_code_name.clone(),
                        created_at,
                    },
                    provider.is_team1_first,
                ));
            }
        }
    }

    earliest.map(|(mut observation, is_team1_first)| {
        if !is_team1_first {
            std::mem::swap(&mut observation.team1_odds, &mut observation.team2_odds);
        }
        observation
    })
}

/// Prices arrive as numbers or numeric strings; keep their text form
fn odds_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
