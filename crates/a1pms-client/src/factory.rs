//! Dialect detection and adapter construction
//!
//! [`A1ClientFactory::create_client`] returns an adapter for a ric. When the
//! ric's dialect is still `UNKNOWN` the candidates are probed in priority
//! order and the first that answers is cached on the ric.

use std::collections::BTreeMap;
use std::sync::Arc;

use a1pms_core::{ControllerConfig, ProtocolType, Ric};
use parking_lot::RwLock;

use crate::client::A1Client;
use crate::dialects::{
    ControllerEndpoint, OnapControllerClient, OscA1Client, SdncOscA1Client, StdA1Client,
    StdA1ClientV1_1,
};
use crate::error::{A1Error, A1Result};
use crate::rest::RestClient;

/// Probe order: mediated ONAP, mediated OSC, OSC native, direct.
pub const DEFAULT_PROBE_ORDER: [ProtocolType; 4] = [
    ProtocolType::SdnrOnap,
    ProtocolType::SdncOsc,
    ProtocolType::OscV1,
    ProtocolType::StdV1,
];

/// Builds the adapter for one dialect. Building must not touch the network.
pub trait ClientBuilder: Send + Sync {
    /// Adapter speaking `protocol` to `ric`.
    fn build(&self, ric: &Ric, protocol: ProtocolType) -> A1Result<Arc<dyn A1Client>>;
}

/// Builds real adapters over a shared [`RestClient`].
pub struct HttpClientBuilder {
    rest: Arc<dyn RestClient>,
    controllers: RwLock<BTreeMap<String, ControllerConfig>>,
}

impl HttpClientBuilder {
    /// Builder without controllers.
    pub fn new(rest: Arc<dyn RestClient>) -> Self {
        Self {
            rest,
            controllers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builder with the given controllers.
    pub fn with_controllers(
        rest: Arc<dyn RestClient>,
        controllers: impl IntoIterator<Item = ControllerConfig>,
    ) -> Self {
        let builder = Self::new(rest);
        builder.set_controllers(controllers);
        builder
    }

    /// Replace the controller set, e.g. after a configuration refresh.
    pub fn set_controllers(&self, controllers: impl IntoIterator<Item = ControllerConfig>) {
        *self.controllers.write() = controllers
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();
    }

    fn controller_for(&self, ric: &Ric) -> A1Result<ControllerEndpoint> {
        let name = ric.controller().ok_or_else(|| A1Error::MissingController {
            ric: ric.name().to_string(),
        })?;
        let controllers = self.controllers.read();
        let controller = controllers
            .get(&name)
            .ok_or(A1Error::ControllerNotFound { name })?;
        Ok(ControllerEndpoint::new(controller, self.rest.clone()))
    }
}

impl ClientBuilder for HttpClientBuilder {
    fn build(&self, ric: &Ric, protocol: ProtocolType) -> A1Result<Arc<dyn A1Client>> {
        let base_url = ric.base_url();
        let client: Arc<dyn A1Client> = match protocol {
            ProtocolType::StdV1 => Arc::new(StdA1Client::new(&base_url, self.rest.clone())),
            ProtocolType::StdV1_1 => Arc::new(StdA1ClientV1_1::new(&base_url, self.rest.clone())),
            ProtocolType::OscV1 => Arc::new(OscA1Client::new(&base_url, self.rest.clone())),
            ProtocolType::SdncOsc => Arc::new(SdncOscA1Client::new(&base_url, self.controller_for(ric)?)),
            ProtocolType::SdncOnap => Arc::new(OnapControllerClient::sdnc(&base_url, self.controller_for(ric)?)),
            ProtocolType::SdnrOnap => Arc::new(OnapControllerClient::sdnr(&base_url, self.controller_for(ric)?)),
            ProtocolType::Unknown => return Err(A1Error::UnsupportedProtocol { protocol }),
        };
        Ok(client)
    }
}

/// Creates adapters, detecting and caching each ric's dialect.
pub struct A1ClientFactory {
    builder: Arc<dyn ClientBuilder>,
    probe_order: Vec<ProtocolType>,
}

impl A1ClientFactory {
    /// Factory probing in [`DEFAULT_PROBE_ORDER`].
    pub fn new(builder: Arc<dyn ClientBuilder>) -> Self {
        Self {
            builder,
            probe_order: DEFAULT_PROBE_ORDER.to_vec(),
        }
    }

    /// Override the probe order.
    pub fn with_probe_order(mut self, order: impl IntoIterator<Item = ProtocolType>) -> Self {
        self.probe_order = order.into_iter().collect();
        self
    }

    /// Adapter for `ric`. A cached dialect is used directly; otherwise every
    /// candidate is probed until one answers.
    pub async fn create_client(&self, ric: &Ric) -> A1Result<Arc<dyn A1Client>> {
        let cached = ric.protocol();
        if cached != ProtocolType::Unknown {
            return self.builder.build(ric, cached);
        }

        let mut last_error = None;
        for &candidate in &self.probe_order {
            tracing::debug!(ric = %ric.name(), protocol = %candidate, "probing protocol");
            match self.probe(ric, candidate).await {
                Ok((client, version)) => {
                    ric.set_protocol(version);
                    tracing::info!(ric = %ric.name(), protocol = %version, "protocol detected");
                    return Ok(client);
                }
                Err(e) => {
                    tracing::debug!(ric = %ric.name(), protocol = %candidate, error = %e, "probe failed");
                    last_error = Some(e);
                }
            }
        }

        tracing::warn!(ric = %ric.name(), "Could not get protocol version from ric");
        Err(A1Error::ProtocolDetectionFailed {
            ric: ric.name().to_string(),
            last: Box::new(last_error.unwrap_or(A1Error::UnsupportedProtocol {
                protocol: ProtocolType::Unknown,
            })),
        })
    }

    async fn probe(
        &self,
        ric: &Ric,
        candidate: ProtocolType,
    ) -> A1Result<(Arc<dyn A1Client>, ProtocolType)> {
        let client = self.builder.build(ric, candidate)?;
        let version = client.get_protocol_version().await?;
        Ok((client, version))
    }
}
