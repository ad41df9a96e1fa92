use crate::error::BitgetError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generic response envelope shared by every position endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestApi<T> {
    pub code: String,
    pub msg: String,
    pub request_time: i64,
    pub data: T,
}

/// Business code the exchange reports on success.
pub const SUCCESS_CODE: &str = "00000";

/// Market segments the mix endpoints accept, compared by exact wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    UsdtFutures,
    CoinFutures,
    UsdcFutures,
    SusdtFutures,
    ScoinFutures,
    SusdcFutures,
}

impl ProductType {
    pub const ALL: [ProductType; 6] = [
        ProductType::UsdtFutures,
        ProductType::CoinFutures,
        ProductType::UsdcFutures,
        ProductType::SusdtFutures,
        ProductType::ScoinFutures,
        ProductType::SusdcFutures,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::UsdtFutures => "USDT-FUTURES",
            ProductType::CoinFutures => "COIN-FUTURES",
            ProductType::UsdcFutures => "USDC-FUTURES",
            ProductType::SusdtFutures => "SUSDT-FUTURES",
            ProductType::ScoinFutures => "SCOIN-FUTURES",
            ProductType::SusdcFutures => "SUSDC-FUTURES",
        }
    }

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|pt| pt.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = BitgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|pt| pt.as_str() == s)
            .copied()
            .ok_or_else(|| BitgetError::InvalidProductType {
                given: s.to_string(),
                allowed: Self::allowed(),
            })
    }
}

/// The exchange sends `null` for fields without a value; callers get `""`
/// instead so every field can be treated as present. Combined with
/// `#[serde(default)]`, absent fields get the same treatment.
fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One open position.
/// GET /api/v2/mix/position/all-position
/// GET /api/v2/mix/position/single-position
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    #[serde(default, deserialize_with = "empty_if_null")]
    pub margin_coin: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub symbol: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub hold_side: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub open_delegate_size: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub margin_size: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub available: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub locked: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub total: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub leverage: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub achieved_profits: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub open_price_avg: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub margin_mode: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub pos_mode: String,
    #[serde(rename = "unrealizedPL", default, deserialize_with = "empty_if_null")]
    pub unrealized_pl: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub liquidation_price: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub keep_margin_rate: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub mark_price: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub break_even_price: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub total_fee: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub deducted_fee: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub margin_ratio: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub asset_mode: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub auto_margin: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub grant: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub take_profit: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub stop_loss: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub take_profit_id: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub stop_loss_id: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub c_time: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub u_time: String,
}

/// One closed position.
/// GET /api/v2/mix/position/history-position
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPositionData {
    #[serde(default, deserialize_with = "empty_if_null")]
    pub position_id: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub margin_coin: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub symbol: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub hold_side: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub open_avg_price: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub close_avg_price: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub margin_mode: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub open_total_pos: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub close_total_pos: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub pnl: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub net_profit: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub total_funding: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub open_fee: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub close_fee: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub c_time: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub u_time: String,
}

/// Nested `data` object of the history endpoint; records live under `list`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HistoryPositionList {
    #[serde(default)]
    pub list: Vec<HistoricalPositionData>,
}

/// One leverage/margin-rate bracket.
/// GET /api/v2/mix/market/query-position-lever
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PositionTierData {
    #[serde(default, deserialize_with = "empty_if_null")]
    pub symbol: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub level: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub start_unit: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub end_unit: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub leverage: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub keep_margin_rate: String,
}

pub type AllPositionsResponse = RestApi<Vec<PositionData>>;
pub type SinglePositionResponse = RestApi<Vec<PositionData>>;
pub type HistoricalPositionsResponse = RestApi<Vec<HistoricalPositionData>>;
pub type PositionTierResponse = RestApi<Vec<PositionTierData>>;
