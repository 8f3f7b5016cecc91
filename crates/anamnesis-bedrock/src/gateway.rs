use std::future::Future;
use std::pin::Pin;

use anamnesis_core::models::message::Message;

use crate::error::GatewayError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One round trip to the generative model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Ordered messages, system messages included.
    pub messages: Vec<Message>,
    /// Ask the provider for a single JSON object.
    pub json_output: bool,
}

/// The transport seam between the orchestrator and a model provider.
///
/// Implementations perform the network call and decode the reply text into a
/// JSON value. Methods return boxed futures for dyn compatibility.
pub trait ModelGateway: Send + Sync {
    fn complete(
        &self,
        request: ModelRequest,
    ) -> BoxFuture<'_, Result<serde_json::Value, GatewayError>>;
}
