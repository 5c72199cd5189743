use crate::core::error::FetchError;
use crate::core::market::{MarketDataProvider, MarketInstrument};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("cryptoconv/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

// CoinGeckoProvider implementation for MarketDataProvider
pub struct CoinGeckoProvider {
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn markets_url(&self, vs_currency: &str, per_page: usize) -> String {
        format!(
            "{}/api/v3/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false",
            self.base_url, vs_currency, per_page
        )
    }
}

#[derive(Deserialize, Debug)]
struct CoinMarket {
    id: String,
    name: String,
    symbol: String,
    current_price: Option<f64>,
    image: Option<String>,
}

impl CoinMarket {
    fn into_instrument(self) -> Option<MarketInstrument> {
        let price = self
            .current_price
            .and_then(Decimal::from_f64)
            .filter(|p| p.is_sign_positive() && !p.is_zero());
        let Some(current_price) = price else {
            warn!(id = %self.id, "Skipping market without a usable price");
            return None;
        };
        Some(MarketInstrument {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            current_price,
            image_url: self.image,
        })
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    #[instrument(
        name = "CoinGeckoMarketsFetch",
        skip(self),
        fields(vs_currency = %vs_currency)
    )]
    async fn fetch_markets(
        &self,
        vs_currency: &str,
        per_page: usize,
    ) -> Result<Vec<MarketInstrument>, FetchError> {
        let url = self.markets_url(vs_currency, per_page);
        debug!("Requesting market data from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let mut request = client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("{e} for URL: {url}")))?;

        debug!(status = %response.status(), "Received CoinGecko response");

        if !response.status().is_success() {
            return Err(FetchError::RateLimited {
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        let markets: Vec<CoinMarket> = serde_json::from_str(&text).map_err(|e| {
            FetchError::Decode(format!("Failed to parse markets for {vs_currency}: {e}"))
        })?;

        Ok(markets
            .into_iter()
            .filter_map(CoinMarket::into_instrument)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MARKETS_PATH: &str = "/api/v3/coins/markets";

    async fn create_mock_server(vs_currency: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(MARKETS_PATH))
            .and(query_param("vs_currency", vs_currency))
            .and(query_param("order", "market_cap_desc"))
            .and(query_param("per_page", "120"))
            .and(query_param("page", "1"))
            .and(query_param("sparkline", "false"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_markets_fetch() {
        let mock_response = r#"[
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
                "current_price": 65000.12,
                "market_cap": 1280000000000
            },
            {
                "id": "tether",
                "symbol": "usdt",
                "name": "Tether",
                "image": null,
                "current_price": 1.0
            },
            {
                "id": "ethereum",
                "symbol": "eth",
                "name": "Ethereum",
                "current_price": 3100
            }
        ]"#;

        let mock_server = create_mock_server(
            "usd",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None);
        let markets = provider.fetch_markets("usd", 120).await.unwrap();

        assert_eq!(markets.len(), 3);
        assert_eq!(markets[0].id, "bitcoin");
        assert_eq!(markets[0].symbol, "btc");
        assert_eq!(
            markets[0].current_price,
            Decimal::from_str("65000.12").unwrap()
        );
        assert!(markets[0].image_url.is_some());
        // the provider reports what upstream returned; exclusion happens in the loader
        assert_eq!(markets[1].id, "tether");
        assert!(markets[1].image_url.is_none());
        assert_eq!(markets[2].current_price, Decimal::from(3100));
        assert!(markets[2].image_url.is_none());
    }

    #[tokio::test]
    async fn test_markets_without_price_are_skipped() {
        let mock_response = r#"[
            {"id": "fresh-listing", "symbol": "new", "name": "Fresh", "current_price": null},
            {"id": "dead-coin", "symbol": "ded", "name": "Dead", "current_price": 0},
            {"id": "solana", "symbol": "sol", "name": "Solana", "current_price": 150.5}
        ]"#;
        let mock_server = create_mock_server(
            "sgd",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None);
        let markets = provider.fetch_markets("sgd", 120).await.unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].id, "solana");
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let mock_server = create_mock_server("usd", ResponseTemplate::new(429)).await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None);
        let result = provider.fetch_markets("usd", 120).await;
        assert_eq!(result.unwrap_err(), FetchError::RateLimited { status: 429 });
    }

    #[tokio::test]
    async fn test_server_error_is_reported_as_unavailable() {
        let mock_server = create_mock_server("eur", ResponseTemplate::new(500)).await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None);
        let err = provider.fetch_markets("eur", 120).await.unwrap_err();
        assert_eq!(err, FetchError::RateLimited { status: 500 });
        assert_eq!(err.user_message(), "Rate limit exceeded. Please wait a moment.");
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(
            "usd",
            ResponseTemplate::new(200).set_body_string(r#"{"status": {"error_code": 10002}}"#),
        )
        .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None);
        let err = provider.fetch_markets("usd", 120).await.unwrap_err();
        match err {
            FetchError::Decode(msg) => {
                assert!(msg.contains("Failed to parse markets for usd"))
            }
            other => panic!("expected a decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(MARKETS_PATH))
            .and(header(API_KEY_HEADER, "CG-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), Some("CG-secret".to_string()));
        let markets = provider.fetch_markets("usd", 120).await.unwrap();
        assert!(markets.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider = CoinGeckoProvider::new(&format!("http://127.0.0.1:{port}"), None);
        let err = provider.fetch_markets("usd", 120).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[test]
    fn test_markets_url() {
        let provider = CoinGeckoProvider::new("https://api.coingecko.com/", None);
        assert_eq!(
            provider.markets_url("thb", 120),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=thb&order=market_cap_desc&per_page=120&page=1&sparkline=false"
        );
    }
}
