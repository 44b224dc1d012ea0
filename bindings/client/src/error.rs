/// A non-success response from Keystone or Ceilometer.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("{operation} failed with status {status}: {body}")]
pub struct CeilometerApiError {
    pub operation: &'static str,
    pub status: u16,
    pub body: String,
}

/// Turn a non-2xx response into a [CeilometerApiError], otherwise hand the response back.
pub(crate) async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CeilometerApiError {
        operation,
        status: status.as_u16(),
        body,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_body() {
        let err = CeilometerApiError {
            operation: "Create sample",
            status: 409,
            body: "conflict".to_string(),
        };

        assert_eq!("Create sample failed with status 409: conflict", err.to_string());
    }
}
