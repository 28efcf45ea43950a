use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::api::fetcher::{Fetcher, Pacing, Transport};
use crate::api::page::extract_payload;
use crate::error::ScrapeError;

/// Client for hawk.live listing and match pages
pub struct HawkClient<T> {
    fetcher: Fetcher<T>,
    base_url: String,
    page_pacing: Pacing,
    match_pacing: Pacing,
}

/// Inertia page envelope; only `props` is of interest
#[derive(Debug, Deserialize)]
struct Page<P> {
    props: P,
}

/// Props of the per-day listing page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingProps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: Vec<Series>,
}

/// One series (best-of-N) in a day listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    pub id: Option<i64>,
    #[serde(default)]
    pub championship_name: Option<String>,
    #[serde(default)]
    pub team1: Option<TeamRef>,
    #[serde(default)]
    pub team2: Option<TeamRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<SeriesMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// A single map of a series as listed on the day page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesMatch {
    pub id: Option<i64>,
    pub number: Option<i64>,
    /// All ten heroes of the map, when the listing carries them
    #[serde(default, deserialize_with = "null_as_default")]
    pub heroes: Vec<ListedHero>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedHero {
    pub name: Option<String>,
    pub is_radiant: Option<bool>,
}

/// Props of a match detail page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchProps {
    #[serde(default)]
    pub init_match: Option<InitMatch>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_odds_info_array: Vec<OddsProvider>,
}

/// Match state as first rendered on the detail page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitMatch {
    pub is_team1_radiant: Option<bool>,
    pub is_radiant_won: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub picks: Vec<Pick>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub states: Vec<Option<GameState>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pick {
    pub is_radiant: Option<bool>,
    pub hero: Option<HeroRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeroRef {
    pub name: Option<String>,
}

/// Chronological snapshot; `game_time` is loosely typed upstream
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub game_time: Option<Value>,
}

/// Odds history from one bookmaker
#[derive(Debug, Clone, Deserialize)]
pub struct OddsProvider {
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_team1_first: bool,
    pub odds_provider_code_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub odds: Vec<OddsQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsQuote {
    pub first_team_winner: Option<Value>,
    pub second_team_winner: Option<Value>,
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// An explicit `null` reads the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

impl Series {
    pub fn championship(&self) -> &str {
        self.championship_name.as_deref().unwrap_or("")
    }

    pub fn team1_name(&self) -> &str {
        team_name(&self.team1)
    }

    pub fn team2_name(&self) -> &str {
        team_name(&self.team2)
    }

    /// Maps in ascending map-number order; missing numbers sort first
    pub fn matches_in_order(&self) -> Vec<&SeriesMatch> {
        let mut matches: Vec<&SeriesMatch> = self.matches.iter().collect();
        matches.sort_by_key(|m| m.number.unwrap_or(0));
        matches
    }
}

fn team_name(team: &Option<TeamRef>) -> &str {
    team.as_ref()
        .and_then(|t| t.name.as_deref())
        .unwrap_or("")
}

impl<T: Transport> HawkClient<T> {
    pub fn new(fetcher: Fetcher<T>, base_url: &str, page_pacing: Pacing, match_pacing: Pacing) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_pacing,
            match_pacing,
        }
    }

    pub fn listing_url(&self, day: NaiveDate) -> String {
        format!("{}/matches/recent/{}", self.base_url, day.format("%Y-%m-%d"))
    }

    pub fn match_url(&self, match_id: i64) -> String {
        format!("{}/matches/{}", self.base_url, match_id)
    }

    /// Fetch the series listing for one calendar day
    pub async fn fetch_listing(&self, day: NaiveDate) -> Result<ListingProps, ScrapeError> {
        let url = self.listing_url(day);
        debug!("Fetching listing: {}", url);

        let html = self.fetcher.fetch(&url, self.page_pacing).await?;
        let page: Page<ListingProps> = extract_payload(&html)?;

        Ok(page.props)
    }

    /// Fetch the detail props of one match
    pub async fn fetch_match(&self, match_id: i64) -> Result<MatchProps, ScrapeError> {
        let url = self.match_url(match_id);
        debug!("Fetching match: {}", url);

        let html = self.fetcher.fetch(&url, self.match_pacing).await?;
        let page: Page<MatchProps> = extract_payload(&html)?;

        Ok(page.props)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::fetcher::testing::ScriptedTransport;

    fn page_html(props: serde_json::Value) -> String {
        let payload = json!({ "component": "Page", "props": props }).to_string();
        let escaped = payload.replace('&', "&amp;").replace('"', "&quot;");
        format!("<html><body><div id=\"app\" data-page=\"{}\"></div></body></html>", escaped)
    }

    #[test]
    fn test_listing_decodes_with_missing_fields() {
        let props: ListingProps = serde_json::from_value(json!({
            "series": [
                {
                    "id": 77,
                    "championship_name": "DreamLeague",
                    "team1": { "name": "Team Spirit" },
                    "team2": null,
                    "matches": [
                        { "id": 3, "number": 2 },
                        { "id": 2, "number": 1, "heroes": [{ "name": "Axe", "is_radiant": true }] }
                    ]
                },
                {}
            ]
        }))
        .unwrap();

        let series = &props.series[0];
        assert_eq!(series.championship(), "DreamLeague");
        assert_eq!(series.team1_name(), "Team Spirit");
        assert_eq!(series.team2_name(), "");

        let ordered: Vec<i64> = series
            .matches_in_order()
            .iter()
            .filter_map(|m| m.id)
            .collect();
        assert_eq!(ordered, vec![2, 3]);

        assert_eq!(props.series[1].championship(), "");
        assert!(props.series[1].matches.is_empty());
    }

    #[test]
    fn test_odds_provider_defaults_to_team1_first() {
        let provider: OddsProvider = serde_json::from_value(json!({
            "odds_provider_code_name": "pinnacle",
            "odds": [{ "first_team_winner": 1.5, "second_team_winner": "2.6", "created_at": "2022-01-01 10:00:00" }]
        }))
        .unwrap();

        assert!(provider.is_team1_first);
        assert_eq!(provider.odds.len(), 1);
    }

    #[test]
    fn test_listing_tolerates_null_lists() {
        let props: ListingProps = serde_json::from_value(json!({
            "series": [
                { "id": 1, "championship_name": "Upcoming", "matches": null },
                {
                    "id": 2,
                    "championship_name": "DreamLeague",
                    "matches": [{ "id": 20, "number": 1, "heroes": null }]
                }
            ]
        }))
        .unwrap();

        assert!(props.series[0].matches.is_empty());
        assert_eq!(props.series[1].matches[0].id, Some(20));
        assert!(props.series[1].matches[0].heroes.is_empty());

        let empty: ListingProps = serde_json::from_value(json!({ "series": null })).unwrap();
        assert!(empty.series.is_empty());
    }

    #[test]
    fn test_match_tolerates_null_lists() {
        let props: MatchProps = serde_json::from_value(json!({
            "init_match": { "is_team1_radiant": true, "picks": null, "states": null },
            "match_odds_info_array": [
                { "odds_provider_code_name": "pinnacle", "is_team1_first": null, "odds": null }
            ]
        }))
        .unwrap();

        let init = props.init_match.unwrap();
        assert!(init.picks.is_empty());
        assert!(init.states.is_empty());
        let provider = &props.match_odds_info_array[0];
        assert!(provider.is_team1_first);
        assert!(provider.odds.is_empty());

        let no_odds: MatchProps =
            serde_json::from_value(json!({ "init_match": null, "match_odds_info_array": null })).unwrap();
        assert!(no_odds.init_match.is_none());
        assert!(no_odds.match_odds_info_array.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_listing_and_match() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .ok(
                    "https://hawk.live/matches/recent/2022-03-04",
                    &page_html(json!({ "series": [{ "id": 1, "matches": [] }] })),
                )
                .ok(
                    "https://hawk.live/matches/42",
                    &page_html(json!({ "init_match": { "is_team1_radiant": true, "picks": [] } })),
                ),
        );
        let client = HawkClient::new(
            Fetcher::new(Arc::clone(&transport), 4),
            "https://hawk.live/",
            Pacing::none(),
            Pacing::none(),
        );

        let day = NaiveDate::from_ymd_opt(2022, 3, 4).unwrap();
        let listing = client.fetch_listing(day).await.unwrap();
        assert_eq!(listing.series.len(), 1);

        let detail = client.fetch_match(42).await.unwrap();
        assert_eq!(detail.init_match.unwrap().is_team1_radiant, Some(true));
        assert!(detail.match_odds_info_array.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_match_without_payload_is_page_error() {
        let transport = ScriptedTransport::new().ok("https://hawk.live/matches/9", "<html></html>");
        let client = HawkClient::new(
            Fetcher::new(transport, 4),
            "https://hawk.live",
            Pacing::none(),
            Pacing::none(),
        );

        let err = client.fetch_match(9).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Page(_)));
    }
}
