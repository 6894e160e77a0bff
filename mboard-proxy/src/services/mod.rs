//! Upstream clients and the recommendation parser
//!
//! One client per third-party service. Clients build URLs deterministically,
//! decode into explicit DTOs and report failures as [`UpstreamError`]; the
//! `api` layer decides how each failure is presented.

pub mod audiodb_client;
pub mod bandsintown_client;
pub mod chat_client;
pub mod discogs_client;
pub mod genius_client;
pub mod recommendation_parser;
pub mod spotify_client;
pub mod upstream;

pub use audiodb_client::{AudioDbAction, AudioDbClient, AudioDbResponse};
pub use bandsintown_client::{BandsintownAction, BandsintownClient, BandsintownResponse, DateFilter};
pub use chat_client::{ChatClient, ChatMessage, ChatRole};
pub use discogs_client::{DiscogsClient, VinylResults};
pub use genius_client::{GeniusAction, GeniusClient, GeniusResponse};
pub use recommendation_parser::{parse_reply, ParsedReply, Recommendation};
pub use spotify_client::{AlbumDetail, NewReleases, SearchResults, SpotifyClient, TokenCache};
pub use upstream::UpstreamError;
