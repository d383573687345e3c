pub mod config;
pub mod feeds;
pub mod game_snapshot;
pub mod teams;
pub mod time_codec;
