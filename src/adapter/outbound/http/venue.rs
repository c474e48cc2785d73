//! Swap venue over a quote/swap HTTP API.
//!
//! `GET {base}/quote?inputMint=&outputMint=&amount=&slippageBps=` returns
//! the route; `POST {base}/swap` submits the routes of every hop. The full
//! quote body is kept as opaque route metadata and sent back on swap.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;
use url::Url;

use super::dto::{QuoteResponse, SwapRequest, SwapResponse};
use super::client::{build_client, status_error, HttpSettings};
use crate::domain::{id::Mint, quote::Quote, wallet::WalletEntry};
use crate::error::{self, VenueError};
use crate::port::outbound::venue::{ExecutionReceipt, SwapVenue, VenueQuote};

pub struct HttpSwapVenue {
    http: HttpClient,
    quote_url: Url,
    swap_url: Url,
}

impl HttpSwapVenue {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL.
    pub fn new(base_url: &str, settings: HttpSettings) -> error::Result<Self> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http: build_client(settings),
            quote_url: base.join("quote")?,
            swap_url: base.join("swap")?,
        })
    }
}

#[async_trait]
impl SwapVenue for HttpSwapVenue {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn quote(
        &self,
        input: &Mint,
        output: &Mint,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<VenueQuote, VenueError> {
        let mut url = self.quote_url.clone();
        url.query_pairs_mut()
            .append_pair("inputMint", input.as_str())
            .append_pair("outputMint", output.as_str())
            .append_pair("amount", &amount.to_string())
            .append_pair("slippageBps", &slippage_bps.to_string());

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let route: serde_json::Value = response.json().await?;
        let parsed: QuoteResponse =
            serde_json::from_value(route.clone()).map_err(|e| VenueError::Decode(e.to_string()))?;
        Ok(VenueQuote {
            out_amount: parsed.out_amount,
            route,
        })
    }

    async fn execute(
        &self,
        route: &[Quote],
        wallet: &WalletEntry,
        simulate: bool,
    ) -> Result<ExecutionReceipt, VenueError> {
        let request = SwapRequest {
            user_public_key: wallet.address(),
            routes: route.iter().map(Quote::route).collect(),
            simulate,
        };
        debug!(
            wallet = %wallet.id(),
            hops = route.len(),
            simulate,
            "Submitting swap"
        );

        let response = self.http.post(self.swap_url.clone()).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: SwapResponse = response.json().await?;
        if let Some(error) = body.error.filter(|_| !body.success) {
            return Err(VenueError::Rejected(error));
        }
        Ok(ExecutionReceipt {
            success: body.success,
            tx_ref: body.txid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_joined_under_base() {
        let venue = HttpSwapVenue::new("https://venue.example/v6/", HttpSettings::default()).unwrap();
        assert_eq!(venue.quote_url.as_str(), "https://venue.example/v6/quote");
        assert_eq!(venue.swap_url.as_str(), "https://venue.example/v6/swap");
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(HttpSwapVenue::new("not a url", HttpSettings::default()).is_err());
    }
}
