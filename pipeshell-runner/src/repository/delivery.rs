//! Record delivery repository
//!
//! Sends framed records to a collector. This is a stateless HTTP client;
//! framing and in-flight tracking are handled by the service layer.

use async_trait::async_trait;
use pipeshell_client::{CollectorClient, Result};

/// Repository trait for delivering one framed record
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Delivers a single record
    ///
    /// # Arguments
    /// * `record` - The record bytes, without the newline terminator
    async fn deliver(&self, record: Vec<u8>) -> Result<()>;
}

/// HTTP implementation of Delivery
pub struct HttpDelivery {
    client: CollectorClient,
}

impl HttpDelivery {
    /// Creates a new HTTP delivery
    ///
    /// # Arguments
    /// * `client` - Client already configured with endpoint, headers and timeout
    pub fn new(client: CollectorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Delivery for HttpDelivery {
    async fn deliver(&self, record: Vec<u8>) -> Result<()> {
        self.client.send_record(record).await
    }
}
