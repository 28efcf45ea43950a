use crate::api::hawk::{InitMatch, ListedHero};
use crate::models::SkipReason;

/// Heroes per team in a complete draft
pub const ROSTER_SIZE: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rosters {
    pub team1: Vec<String>,
    pub team2: Vec<String>,
}

impl Rosters {
    pub fn is_complete(&self) -> bool {
        self.team1.len() == ROSTER_SIZE && self.team2.len() == ROSTER_SIZE
    }

    /// Split `(is_radiant, name)` pairs by side; team1 sits on the side
    /// whose flag equals `is_team1_radiant`
    fn partition<'a, I>(entries: I, is_team1_radiant: Option<bool>) -> Self
    where
        I: IntoIterator<Item = (Option<bool>, Option<&'a str>)>,
    {
        let mut rosters = Rosters::default();
        for (is_radiant, name) in entries {
            let Some(name) = name else { continue };
            if is_radiant == is_team1_radiant {
                rosters.team1.push(name.to_string());
            } else {
                rosters.team2.push(name.to_string());
            }
        }
        rosters
    }
}

/// Team rosters from the detail picks, falling back to the listing's hero list
///
/// The fallback list is only used when it holds exactly ten heroes.
pub fn resolve_rosters(
    init_match: Option<&InitMatch>,
    listed_heroes: &[ListedHero],
) -> Result<Rosters, SkipReason> {
    let is_team1_radiant = init_match.and_then(|m| m.is_team1_radiant);

    let mut rosters = Rosters::partition(
        init_match
            .map(|m| m.picks.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|p| {
                (
                    p.is_radiant,
                    p.hero.as_ref().and_then(|h| h.name.as_deref()),
                )
            }),
        is_team1_radiant,
    );

    if !rosters.is_complete() && listed_heroes.len() == 2 * ROSTER_SIZE {
        rosters = Rosters::partition(
            listed_heroes
                .iter()
                .map(|h| (h.is_radiant, h.name.as_deref())),
            is_team1_radiant,
        );
    }

    if rosters.is_complete() {
        Ok(rosters)
    } else {
        Err(SkipReason::IncompleteRoster {
            team1: rosters.team1.len(),
            team2: rosters.team2.len(),
        })
    }
}
