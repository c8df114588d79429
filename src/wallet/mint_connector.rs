//! Wallet client
//!
//! The interface that connects a wallet to a mint. All wallet operations
//! suspend only on these calls.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ErrorResponse;
use crate::mint_url::MintUrl;
use crate::nuts::{
    Id, KeySet, KeysetResponse, MeltBolt11Request, MeltQuoteBolt11Request, MeltQuoteBolt11Response,
    MintBolt11Request, MintBolt11Response, MintInfo, MintQuoteBolt11Request,
    MintQuoteBolt11Response, SwapRequest, SwapResponse,
};
use crate::Error;

/// Interface that connects a wallet to a mint
///
/// Typically represents an [`HttpClient`]; tests substitute a scripted fake.
#[async_trait]
pub trait MintConnector: Debug {
    /// Get Keysets [NUT-02]
    async fn get_mint_keysets(&self) -> Result<KeysetResponse, Error>;
    /// Get Keyset Keys [NUT-01]
    async fn get_mint_keyset(&self, keyset_id: Id) -> Result<KeySet, Error>;
    /// Get Mint Info [NUT-06]
    async fn get_mint_info(&self) -> Result<MintInfo, Error>;
    /// Mint Quote [NUT-04]
    async fn post_mint_quote(
        &self,
        request: MintQuoteBolt11Request,
    ) -> Result<MintQuoteBolt11Response, Error>;
    /// Mint Quote status
    async fn get_mint_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error>;
    /// Mint Tokens [NUT-04]
    async fn post_mint(&self, request: MintBolt11Request) -> Result<MintBolt11Response, Error>;
    /// Swap [NUT-03]
    async fn post_swap(&self, request: SwapRequest) -> Result<SwapResponse, Error>;
    /// Melt Quote [NUT-05]
    async fn post_melt_quote(
        &self,
        request: MeltQuoteBolt11Request,
    ) -> Result<MeltQuoteBolt11Response, Error>;
    /// Melt Quote Status
    async fn get_melt_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error>;
    /// Melt [NUT-05]
    ///
    /// [NUT-08] Lightning fee return if outputs defined
    async fn post_melt(&self, request: MeltBolt11Request)
        -> Result<MeltQuoteBolt11Response, Error>;
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Paying an invoice can legitimately take minutes
const DEFAULT_MELT_TIMEOUT: Duration = Duration::from_secs(600);

/// Http Client
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    mint_url: MintUrl,
    melt_timeout: Duration,
}

impl HttpClient {
    /// Create new [`HttpClient`]
    pub fn new(mint_url: MintUrl) -> Result<Self, Error> {
        Ok(Self {
            inner: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()?,
            mint_url,
            melt_timeout: DEFAULT_MELT_TIMEOUT,
        })
    }

    /// Create new [`HttpClient`] with custom timeouts
    pub fn with_timeouts(
        mint_url: MintUrl,
        timeout: Duration,
        melt_timeout: Duration,
    ) -> Result<Self, Error> {
        Ok(Self {
            inner: reqwest::Client::builder().timeout(timeout).build()?,
            mint_url,
            melt_timeout,
        })
    }

    async fn http_get<R>(&self, url: Url) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let res = self.inner.get(url).send().await?;
        Self::decode_response(res).await
    }

    async fn http_post<P, R>(&self, url: Url, payload: &P) -> Result<R, Error>
    where
        P: Serialize + ?Sized + Send + Sync,
        R: DeserializeOwned,
    {
        let res = self.inner.post(url).json(payload).send().await?;
        Self::decode_response(res).await
    }

    /// Decode a mint response body
    ///
    /// Non-2xx bodies are expected to be `{code, detail}` documents; some
    /// mints also return errors with a 200, so a success body that does not
    /// parse is given a second chance as an error document.
    async fn decode_response<R>(res: reqwest::Response) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            if let Ok(error_response) = ErrorResponse::from_json(&body) {
                return Err(error_response.into());
            }
            return Err(Error::HttpError(Some(status.as_u16()), body));
        }

        match serde_json::from_str::<R>(&body) {
            Ok(res) => Ok(res),
            Err(err) => match ErrorResponse::from_json(&body) {
                Ok(error_response) => Err(error_response.into()),
                Err(_) => Err(err.into()),
            },
        }
    }
}

#[async_trait]
impl MintConnector for HttpClient {
    async fn get_mint_keysets(&self) -> Result<KeysetResponse, Error> {
        let url = self.mint_url.join_paths(&["v1", "keysets"])?;
        self.http_get(url).await
    }

    async fn get_mint_keyset(&self, keyset_id: Id) -> Result<KeySet, Error> {
        let url = self
            .mint_url
            .join_paths(&["v1", "keys", &keyset_id.url_safe()])?;

        let keys_response: crate::nuts::KeysResponse = self.http_get(url).await?;

        keys_response
            .keysets
            .into_iter()
            .find(|keyset| keyset.id == keyset_id)
            .ok_or(Error::UnknownKeySet)
    }

    async fn get_mint_info(&self) -> Result<MintInfo, Error> {
        let url = self.mint_url.join_paths(&["v1", "info"])?;
        self.http_get(url).await
    }

    async fn post_mint_quote(
        &self,
        request: MintQuoteBolt11Request,
    ) -> Result<MintQuoteBolt11Response, Error> {
        let url = self
            .mint_url
            .join_paths(&["v1", "mint", "quote", "bolt11"])?;
        self.http_post(url, &request).await
    }

    async fn get_mint_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error> {
        let url = self
            .mint_url
            .join_paths(&["v1", "mint", "quote", "bolt11", quote_id])?;
        self.http_get(url).await
    }

    async fn post_mint(&self, request: MintBolt11Request) -> Result<MintBolt11Response, Error> {
        let url = self.mint_url.join_paths(&["v1", "mint", "bolt11"])?;
        self.http_post(url, &request).await
    }

    async fn post_swap(&self, request: SwapRequest) -> Result<SwapResponse, Error> {
        let url = self.mint_url.join_paths(&["v1", "swap"])?;
        self.http_post(url, &request).await
    }

    async fn post_melt_quote(
        &self,
        request: MeltQuoteBolt11Request,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let url = self
            .mint_url
            .join_paths(&["v1", "melt", "quote", "bolt11"])?;
        self.http_post(url, &request).await
    }

    async fn get_melt_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let url = self
            .mint_url
            .join_paths(&["v1", "melt", "quote", "bolt11", quote_id])?;
        self.http_get(url).await
    }

    async fn post_melt(
        &self,
        request: MeltBolt11Request,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let url = self.mint_url.join_paths(&["v1", "melt", "bolt11"])?;

        let res = self
            .inner
            .post(url)
            .timeout(self.melt_timeout)
            .json(&request)
            .send()
            .await?;
        Self::decode_response(res).await
    }
}
