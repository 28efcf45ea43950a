pub mod fetcher;
pub mod hawk;
pub mod page;

pub use fetcher::{Fetcher, Pacing, ReqwestTransport, Transport};
pub use hawk::{HawkClient, ListingProps, MatchProps, Series, SeriesMatch};
