//! Redis backend for locker.

pub mod gateway;
mod script;

pub use gateway::RedisGateway;
