//! HTTP inbound adapter exposing REST endpoints.

pub mod bids;
pub mod commissions;
pub mod error;
pub mod health;
pub mod marketplace_dto;
pub mod profiles;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
