pub mod alias;
pub mod catalog;
pub mod http_cache;
pub mod http_client;
pub mod persist;
pub mod processor;
pub mod profile;
pub mod provider;
pub mod scores;
pub mod state;
