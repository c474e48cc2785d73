//! Balance oracle over `GET {base}/balance?owner=&mint=`.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;
use url::Url;

use super::dto::BalanceResponse;
use super::client::{build_client, status_error, HttpSettings};
use crate::domain::{token::Token, wallet::WalletEntry};
use crate::error::{self, VenueError};
use crate::port::outbound::balance::BalanceOracle;

pub struct HttpBalanceOracle {
    http: HttpClient,
    balance_url: Url,
}

impl HttpBalanceOracle {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL.
    pub fn new(base_url: &str, settings: HttpSettings) -> error::Result<Self> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http: build_client(settings),
            balance_url: base.join("balance")?,
        })
    }
}

#[async_trait]
impl BalanceOracle for HttpBalanceOracle {
    async fn sufficient_balance(&self, wallet: &WalletEntry, amount: u64, token: &Token) -> bool {
        match self.balance(wallet, token).await {
            Ok(balance) => balance >= amount,
            Err(e) => {
                debug!(wallet = %wallet.id(), error = %e, "Balance lookup failed");
                false
            }
        }
    }

    async fn balance(&self, wallet: &WalletEntry, token: &Token) -> Result<u64, VenueError> {
        let mut url = self.balance_url.clone();
        url.query_pairs_mut()
            .append_pair("owner", wallet.address())
            .append_pair("mint", token.mint().as_str());

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: BalanceResponse = response.json().await?;
        Ok(body.amount)
    }
}
