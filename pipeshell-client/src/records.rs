//! Record delivery endpoint

use tracing::debug;

use crate::CollectorClient;
use crate::error::{ClientError, Result};

impl CollectorClient {
    /// Post one framed record to the collector
    ///
    /// The body is sent verbatim with the client's static headers. Any
    /// non-2xx answer is reported as [`ClientError::ApiError`].
    ///
    /// # Arguments
    /// * `record` - The encoded record, without its newline terminator
    pub async fn send_record(&self, record: Vec<u8>) -> Result<()> {
        let len = record.len();
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .body(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        debug!(endpoint = %self.endpoint, bytes = len, "record delivered");
        Ok(())
    }
}
