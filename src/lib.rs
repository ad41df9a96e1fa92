//! Typed Rust client for the Bitget v2 position-management REST endpoints.

pub mod client;
pub mod error;
pub mod restful;

pub use client::BitgetApi;
pub use error::{BitgetError, Result};
pub use restful::models::{
    AllPositionsResponse, HistoricalPositionData, HistoricalPositionsResponse, PositionData,
    PositionTierData, PositionTierResponse, ProductType, RestApi, SinglePositionResponse,
};
pub use restful::params::TimeBound;
pub use restful::position::{BitgetPositionClient, HistoryPositionQuery};
pub use restful::sign::{HttpRequestHandler, RequestHandler};
