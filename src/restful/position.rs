use super::models::{
    AllPositionsResponse, HistoricalPositionsResponse, HistoryPositionList, PositionTierResponse,
    ProductType, RestApi, SinglePositionResponse, SUCCESS_CODE,
};
use super::params::{
    clamp_limit, clean_symbol, push_opt, resolve_time_range, validate_product_type, TimeBound,
};
use crate::error::{BitgetError, Result};
use super::sign::RequestHandler;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Optional filters for `get_historical_position`. A default query asks for
/// the latest USDT-FUTURES records with the default page size.
#[derive(Debug, Clone, Default)]
pub struct HistoryPositionQuery {
    /// Defaults to `USDT-FUTURES` when unset.
    pub product_type: Option<String>,
    pub symbol: Option<String>,
    /// Cursor for backward pagination.
    pub id_less_than: Option<String>,
    pub start_time: Option<TimeBound>,
    pub end_time: Option<TimeBound>,
    pub limit: Option<u32>,
}

/// Position sub-client. Stateless across calls; every operation is a single
/// request/response round trip delegated to the transport.
#[derive(Clone)]
pub struct BitgetPositionClient {
    handler: Arc<dyn RequestHandler>,
}

impl BitgetPositionClient {
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        BitgetPositionClient { handler }
    }

    /// All open positions for a product type.
    /// GET /api/v2/mix/position/all-position
    pub async fn get_all_positions(
        &self,
        product_type: &str,
        margin_coin: Option<&str>,
    ) -> Result<AllPositionsResponse> {
        validate_product_type(product_type)?;
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("productType".into(), product_type.into());
        push_opt(&mut params, "marginCoin", margin_coin.map(str::to_uppercase));
        self.fetch("/api/v2/mix/position/all-position", &params)
            .await
    }

    /// Open position for one instrument.
    /// GET /api/v2/mix/position/single-position
    pub async fn get_single_position(
        &self,
        symbol: &str,
        product_type: &str,
        margin_coin: &str,
    ) -> Result<SinglePositionResponse> {
        validate_product_type(product_type)?;
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("symbol".into(), clean_symbol(symbol));
        params.insert("productType".into(), product_type.into());
        params.insert("marginCoin".into(), margin_coin.to_uppercase());
        self.fetch("/api/v2/mix/position/single-position", &params)
            .await
    }

    /// Closed positions, newest first, cursor-paged. The wire nests records
    /// under `data.list`; the returned envelope carries them directly.
    /// GET /api/v2/mix/position/history-position
    pub async fn get_historical_position(
        &self,
        query: HistoryPositionQuery,
    ) -> Result<HistoricalPositionsResponse> {
        let product_type = query
            .product_type
            .unwrap_or_else(|| ProductType::UsdtFutures.as_str().to_string());
        validate_product_type(&product_type)?;

        let (start_time, end_time) = resolve_time_range(query.start_time, query.end_time);
        let limit = clamp_limit(query.limit);

        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("productType".into(), product_type);
        push_opt(&mut params, "symbol", query.symbol.as_deref().map(clean_symbol));
        push_opt(&mut params, "idLessThan", query.id_less_than);
        push_opt(&mut params, "startTime", start_time);
        push_opt(&mut params, "endTime", end_time);
        params.insert("limit".into(), limit.to_string());

        let resp: RestApi<HistoryPositionList> = self
            .fetch("/api/v2/mix/position/history-position", &params)
            .await?;
        Ok(RestApi {
            code: resp.code,
            msg: resp.msg,
            request_time: resp.request_time,
            data: resp.data.list,
        })
    }

    /// Leverage/margin-rate brackets for an instrument.
    /// GET /api/v2/mix/market/query-position-lever
    pub async fn get_position_tier(
        &self,
        symbol: &str,
        product_type: &str,
    ) -> Result<PositionTierResponse> {
        validate_product_type(product_type)?;
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("symbol".into(), clean_symbol(symbol));
        params.insert("productType".into(), product_type.into());
        self.fetch("/api/v2/mix/market/query-position-lever", &params)
            .await
    }

    /// One dispatch + materialize cycle. Exchange-reported failures surface
    /// as `Api { code, msg }` before any record is materialized; a malformed
    /// record fails the whole call.
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<T> {
        let raw = self.handler.request("GET", path, params).await?;
        if let Some(code) = raw.get("code").and_then(Value::as_str) {
            if code != SUCCESS_CODE {
                let msg = raw
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(BitgetError::Api {
                    code: code.to_string(),
                    msg,
                });
            }
        }
        Ok(serde_json::from_value(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every dispatched request and answers with a canned payload.
    struct MockHandler {
        captured: Mutex<Vec<(String, String, BTreeMap<String, String>)>>,
        response: Value,
    }

    impl MockHandler {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(MockHandler {
                captured: Mutex::new(Vec::new()),
                response,
            })
        }

        fn requests(&self) -> Vec<(String, String, BTreeMap<String, String>)> {
            self.captured.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RequestHandler for MockHandler {
        async fn request(
            &self,
            method: &str,
            path: &str,
            params: &BTreeMap<String, String>,
        ) -> Result<Value> {
            self.captured.lock().unwrap().push((
                method.to_string(),
                path.to_string(),
                params.clone(),
            ));
            Ok(self.response.clone())
        }
    }

    fn ok_envelope(data: Value) -> Value {
        json!({
            "code": "00000",
            "msg": "success",
            "requestTime": 1700000000000i64,
            "data": data
        })
    }

    #[tokio::test]
    async fn default_history_query_sends_only_product_type_and_limit() {
        let mock = MockHandler::new(ok_envelope(json!({ "list": [] })));
        let client = BitgetPositionClient::new(mock.clone());

        let resp = client
            .get_historical_position(HistoryPositionQuery::default())
            .await
            .unwrap();
        assert!(resp.data.is_empty());

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let (method, path, params) = &requests[0];
        assert_eq!(method, "GET");
        assert_eq!(path, "/api/v2/mix/position/history-position");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("productType").map(String::as_str), Some("USDT-FUTURES"));
        assert_eq!(params.get("limit").map(String::as_str), Some("20"));
    }

    #[tokio::test]
    async fn history_query_normalizes_every_optional_field() {
        let mock = MockHandler::new(ok_envelope(json!({ "list": [] })));
        let client = BitgetPositionClient::new(mock.clone());

        client
            .get_historical_position(HistoryPositionQuery {
                product_type: Some("COIN-FUTURES".to_string()),
                symbol: Some("BTC/USDT".to_string()),
                id_less_than: Some("998877".to_string()),
                start_time: Some(1_600_000_000_000i64.into()),
                end_time: Some(1_600_000_100_000i64.into()),
                limit: Some(500),
            })
            .await
            .unwrap();

        let (_, _, params) = &mock.requests()[0];
        assert_eq!(params.get("productType").map(String::as_str), Some("COIN-FUTURES"));
        assert_eq!(params.get("symbol").map(String::as_str), Some("btcusdt"));
        assert_eq!(params.get("idLessThan").map(String::as_str), Some("998877"));
        assert_eq!(params.get("startTime").map(String::as_str), Some("1600000000000"));
        assert_eq!(params.get("endTime").map(String::as_str), Some("1600000100000"));
        assert_eq!(params.get("limit").map(String::as_str), Some("100"));
    }

    #[tokio::test]
    async fn all_positions_uppercases_margin_coin_and_drops_it_when_absent() {
        let mock = MockHandler::new(ok_envelope(json!([])));
        let client = BitgetPositionClient::new(mock.clone());

        client
            .get_all_positions("USDT-FUTURES", Some("usdt"))
            .await
            .unwrap();
        client.get_all_positions("USDT-FUTURES", None).await.unwrap();

        let requests = mock.requests();
        let (_, path, with_coin) = &requests[0];
        assert_eq!(path, "/api/v2/mix/position/all-position");
        assert_eq!(with_coin.get("marginCoin").map(String::as_str), Some("USDT"));
        let (_, _, without_coin) = &requests[1];
        assert!(!without_coin.contains_key("marginCoin"));
        assert_eq!(without_coin.len(), 1);
    }

    #[tokio::test]
    async fn single_position_canonicalizes_symbol() {
        let mock = MockHandler::new(ok_envelope(json!([])));
        let client = BitgetPositionClient::new(mock.clone());

        client
            .get_single_position(" BTC-USDT ", "USDT-FUTURES", "usdt")
            .await
            .unwrap();

        let (_, path, params) = &mock.requests()[0];
        assert_eq!(path, "/api/v2/mix/position/single-position");
        assert_eq!(params.get("symbol").map(String::as_str), Some("btcusdt"));
        assert_eq!(params.get("marginCoin").map(String::as_str), Some("USDT"));
        assert_eq!(params.get("productType").map(String::as_str), Some("USDT-FUTURES"));
    }

    #[tokio::test]
    async fn position_tier_hits_market_endpoint() {
        let mock = MockHandler::new(ok_envelope(json!([
            { "symbol": "BTCUSDT", "level": "1", "leverage": "125" }
        ])));
        let client = BitgetPositionClient::new(mock.clone());

        let resp = client
            .get_position_tier("BTC/USDT", "USDT-FUTURES")
            .await
            .unwrap();
        assert_eq!(resp.data[0].leverage, "125");
        assert_eq!(resp.data[0].start_unit, "");

        let (_, path, params) = &mock.requests()[0];
        assert_eq!(path, "/api/v2/mix/market/query-position-lever");
        assert_eq!(params.get("symbol").map(String::as_str), Some("btcusdt"));
    }

    #[tokio::test]
    async fn invalid_product_type_fails_before_any_request() {
        let mock = MockHandler::new(ok_envelope(json!([])));
        let client = BitgetPositionClient::new(mock.clone());

        let err = client.get_all_positions("BOGUS", None).await.unwrap_err();
        assert!(matches!(err, BitgetError::InvalidProductType { .. }));
        assert!(mock.requests().is_empty());

        let err = client
            .get_historical_position(HistoryPositionQuery {
                product_type: Some("SPOT".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BitgetError::InvalidProductType { .. }));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn exchange_error_codes_surface_code_and_msg() {
        let mock = MockHandler::new(json!({
            "code": "40019",
            "msg": "Parameter verification failed",
            "requestTime": 1700000000000i64,
            "data": null
        }));
        let client = BitgetPositionClient::new(mock.clone());

        let err = client
            .get_all_positions("USDT-FUTURES", None)
            .await
            .unwrap_err();
        match err {
            BitgetError::Api { code, msg } => {
                assert_eq!(code, "40019");
                assert_eq!(msg, "Parameter verification failed");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn record_missing_grant_materializes_empty() {
        let mock = MockHandler::new(ok_envelope(json!([
            {
                "marginCoin": "USDT",
                "symbol": "BTCUSDT",
                "holdSide": "long",
                "total": "0.5",
                "unrealizedPL": "12.3"
            }
        ])));
        let client = BitgetPositionClient::new(mock);

        let resp = client
            .get_all_positions("USDT-FUTURES", None)
            .await
            .unwrap();
        assert_eq!(resp.code, "00000");
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].grant, "");
        assert_eq!(resp.data[0].unrealized_pl, "12.3");
    }

    #[tokio::test]
    async fn history_response_flattens_nested_list() {
        let mock = MockHandler::new(ok_envelope(json!({
            "list": [
                { "positionId": "7", "symbol": "ETHUSDT", "netProfit": "-1.2" }
            ]
        })));
        let client = BitgetPositionClient::new(mock);

        let resp = client
            .get_historical_position(HistoryPositionQuery::default())
            .await
            .unwrap();
        assert_eq!(resp.request_time, 1700000000000i64);
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].position_id, "7");
        assert_eq!(resp.data[0].net_profit, "-1.2");
    }
}
