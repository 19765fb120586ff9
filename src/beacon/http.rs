use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_hex::{SerHex, StrictPfx};
use serde_utils::quoted_u64;
use std::sync::Arc;
use std::time::Duration;

use super::{Capability, ChainInfoProvider, ValidatorId, ALL_CAPABILITIES};
use crate::errors::{ExitError, Result};
use crate::eth2::eth_types::{
    from_hex_to_ssz_type, BLSPubkey, Bytes32, Finality, Fork, Genesis, SignedVoluntaryExit,
    SpecConstants, ValidatorIndex, ValidatorInfo,
};

/// Standard beacon API responses wrap their payload in `data`.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
struct ValidatorData {
    #[serde(deserialize_with = "from_hex_to_ssz_type")]
    pubkey: BLSPubkey,
    #[serde(with = "SerHex::<StrictPfx>")]
    withdrawal_credentials: Bytes32,
}

#[derive(Debug, Deserialize)]
struct ValidatorResponse {
    #[serde(with = "quoted_u64")]
    index: ValidatorIndex,
    status: String,
    validator: ValidatorData,
}

impl From<ValidatorResponse> for ValidatorInfo {
    fn from(resp: ValidatorResponse) -> Self {
        ValidatorInfo {
            index: resp.index,
            pubkey: resp.validator.pubkey,
            state: resp.status,
            withdrawal_credentials: resp.validator.withdrawal_credentials,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// A beacon node reached over the standard REST API.
pub struct BeaconNodeClient {
    pub url: String,
    pub client: Arc<reqwest::Client>,
}

impl BeaconNodeClient {
    /// Connect to the beacon node at ``url``, failing with `ConnectionFailure` if it cannot
    /// be reached within ``timeout``.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExitError::ConnectionFailure(e.to_string()))?;
        let beacon = BeaconNodeClient {
            url: url.trim_end_matches('/').to_string(),
            client: Arc::new(client),
        };
        let genesis = beacon.genesis().await?;
        info!(
            "Connected to beacon node at {} (genesis time {})",
            beacon.url, genesis.genesis_time
        );
        Ok(beacon)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.url, path);
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let resp: DataResponse<T> = check_status(resp).await?.json().await?;
        Ok(resp.data)
    }
}

/// Message from a beacon API error body, or the raw body when it is not one.
fn node_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no reason given")
            .to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn node_error(status: StatusCode, body: &str) -> ExitError {
    ExitError::NodeResponse {
        status: status.as_u16(),
        message: node_message(status, body),
    }
}

/// Non-2xx answers become `NodeResponse` errors carrying the node's message.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(node_error(status, &body))
}

#[async_trait]
impl ChainInfoProvider for BeaconNodeClient {
    fn capabilities(&self) -> &[Capability] {
        ALL_CAPABILITIES
    }

    async fn spec(&self) -> Result<SpecConstants> {
        self.get("/eth/v1/config/spec").await
    }

    async fn genesis(&self) -> Result<Genesis> {
        self.get("/eth/v1/beacon/genesis").await
    }

    async fn fork(&self, state: &str) -> Result<Fork> {
        self.get(&format!("/eth/v1/beacon/states/{state}/fork")).await
    }

    async fn finality(&self, state: &str) -> Result<Finality> {
        self.get(&format!("/eth/v1/beacon/states/{state}/finality_checkpoints"))
            .await
    }

    async fn validator(&self, id: &ValidatorId) -> Result<ValidatorInfo> {
        let url = format!("{}/eth/v1/beacon/states/head/validators/{}", self.url, id);
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ExitError::UnknownValidator(id.to_string()));
        }
        let resp: DataResponse<ValidatorResponse> = check_status(resp).await?.json().await?;
        Ok(resp.data.into())
    }

    async fn validators(&self) -> Result<Vec<ValidatorInfo>> {
        let validators: Vec<ValidatorResponse> =
            self.get("/eth/v1/beacon/states/head/validators").await?;
        Ok(validators.into_iter().map(ValidatorInfo::from).collect())
    }

    async fn submit_voluntary_exit(&self, operation: &SignedVoluntaryExit) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/eth/v1/beacon/pool/voluntary_exits", self.url))
            .json(operation)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            info!(
                "Voluntary exit for validator {} accepted by the beacon node",
                operation.message.validator_index
            );
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ExitError::SubmissionRejected(node_message(status, &body)))
    }
}
