pub mod config;
pub mod connection;
pub mod lottery;
pub mod protocol;
pub mod server;
pub mod sink;
pub mod tally;
