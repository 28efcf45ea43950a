pub mod match_record;

pub use match_record::{
    favored_label, GameClock, MatchRecord, OddsObservation, SkipReason, CSV_HEADER, EVEN_LABEL,
};
