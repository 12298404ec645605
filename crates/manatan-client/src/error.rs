#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{context} failed ({status})")]
    Status { context: &'static str, status: u16 },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn check(
        context: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ClientError::Status {
                context,
                status: status.as_u16(),
            })
        }
    }
}
