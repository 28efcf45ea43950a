//! Turns a match detail payload into an export row.

pub mod game_time;
pub mod odds;
pub mod roster;

use chrono::NaiveDate;
use tracing::debug;

use crate::api::hawk::{ListedHero, MatchProps};
use crate::heroes::{HeroCatalog, Matchup};
use crate::models::{favored_label, MatchRecord, SkipReason};

pub use game_time::final_game_time;
pub use odds::earliest_odds;
pub use roster::{resolve_rosters, Rosters};

/// What the day listing already tells us about a match
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
    pub date: NaiveDate,
    pub championship: &'a str,
    pub series_id: Option<i64>,
    pub map_number: Option<i64>,
    pub match_id: i64,
    pub team1: &'a str,
    pub team2: &'a str,
    /// Ten-hero list from the listing, used when detail picks are incomplete
    pub listed_heroes: &'a [ListedHero],
}

/// Build the export record for one match, or say why it is skipped
pub fn enrich(
    ctx: &MatchContext<'_>,
    props: &MatchProps,
    catalog: &HeroCatalog,
) -> Result<MatchRecord, SkipReason> {
    let init_match = props.init_match.as_ref();

    let rosters = resolve_rosters(init_match, ctx.listed_heroes)?;

    let matchup = Matchup::evaluate(catalog, &rosters.team1, &rosters.team2)
        .ok_or(SkipReason::UnknownHero)?;
    let delta = matchup.delta();

    debug!(
        "Match {} | {} {:.2} ({}+/{}-) vs {} {:.2} ({}+/{}-)",
        ctx.match_id,
        ctx.team1,
        matchup.side_a.total(),
        matchup.side_a.favored_count(),
        matchup.side_a.countered_count(),
        ctx.team2,
        matchup.side_b.total(),
        matchup.side_b.favored_count(),
        matchup.side_b.countered_count(),
    );

    let radiant_won = init_match.and_then(|m| m.is_radiant_won).unwrap_or(false);
    let team1_radiant = init_match.and_then(|m| m.is_team1_radiant).unwrap_or(false);
    let winner = if radiant_won == team1_radiant {
        ctx.team1
    } else {
        ctx.team2
    };

    Ok(MatchRecord {
        date: ctx.date,
        championship: ctx.championship.to_string(),
        series_id: ctx.series_id,
        map_number: ctx.map_number,
        match_id: ctx.match_id,
        team1: ctx.team1.to_string(),
        team2: ctx.team2.to_string(),
        favored: favored_label(delta, ctx.team1, ctx.team2).to_string(),
        delta,
        winner: winner.to_string(),
        odds: earliest_odds(&props.match_odds_info_array),
        game_time: final_game_time(init_match),
        team1_heroes: rosters.team1,
        team2_heroes: rosters.team2,
    })
}
