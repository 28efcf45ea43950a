use crate::heroes::HeroCatalog;

/// Scored hero inside one side of a matchup
#[derive(Debug, Clone, PartialEq)]
pub struct HeroScore {
    pub index: usize,
    pub win_rate: f64,
    /// Sum of this hero's advantage against every opposing hero
    pub counter: f64,
}

/// One roster's share of the matchup score
#[derive(Debug, Clone, PartialEq)]
pub struct SideScore {
    pub heroes: Vec<HeroScore>,
    /// Sum of baseline win rates
    pub base: f64,
    /// Sum of pairwise advantages against the other roster
    pub advantage: f64,
}

impl SideScore {
    pub fn total(&self) -> f64 {
        self.base + self.advantage
    }

    /// Heroes whose counter-pick sum is non-negative
    pub fn favored_count(&self) -> usize {
        self.heroes.iter().filter(|h| h.counter >= 0.0).count()
    }

    /// Heroes that are countered overall
    pub fn countered_count(&self) -> usize {
        self.heroes.len() - self.favored_count()
    }
}

/// Full scoring of roster A against roster B
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub side_a: SideScore,
    pub side_b: SideScore,
}

impl Matchup {
    /// Score roster A against roster B; `None` if any hero is unknown
    pub fn evaluate<S: AsRef<str>>(
        catalog: &HeroCatalog,
        roster_a: &[S],
        roster_b: &[S],
    ) -> Option<Self> {
        let ids_a = resolve_all(catalog, roster_a)?;
        let ids_b = resolve_all(catalog, roster_b)?;

        Some(Self {
            side_a: score_side(catalog, &ids_a, &ids_b),
            side_b: score_side(catalog, &ids_b, &ids_a),
        })
    }

    /// Positive favors A, negative favors B, zero is a genuine tie
    pub fn delta(&self) -> f64 {
        self.side_a.total() - self.side_b.total()
    }
}

/// Signed matchup delta of roster A over roster B
///
/// Returns `None` when any hero cannot be resolved in the catalog, since the
/// signal is meaningless with a hole in either roster.
pub fn delta<S: AsRef<str>>(catalog: &HeroCatalog, roster_a: &[S], roster_b: &[S]) -> Option<f64> {
    Matchup::evaluate(catalog, roster_a, roster_b).map(|m| m.delta())
}

fn resolve_all<S: AsRef<str>>(catalog: &HeroCatalog, roster: &[S]) -> Option<Vec<usize>> {
    roster.iter().map(|name| catalog.resolve(name.as_ref())).collect()
}

fn score_side(catalog: &HeroCatalog, own: &[usize], opponents: &[usize]) -> SideScore {
    let heroes: Vec<HeroScore> = own
        .iter()
        .map(|&hero| HeroScore {
            index: hero,
            win_rate: catalog.win_rate(hero),
            counter: opponents
                .iter()
                .map(|&opponent| catalog.advantage(opponent, hero))
                .sum(),
        })
        .collect();

    SideScore {
        base: heroes.iter().map(|h| h.win_rate).sum(),
        advantage: heroes.iter().map(|h| h.counter).sum(),
        heroes,
    }
}
