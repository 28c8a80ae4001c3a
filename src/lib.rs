pub mod feed;
pub mod handicap;
pub mod http_cache;
pub mod http_client;
pub mod preview_fetch;
pub mod snapshot;
pub mod state;
