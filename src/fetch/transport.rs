//! Network seam used by the cache to retrieve remote assets.

use std::io::{self, Read};
use std::time::Duration;

use ureq::Agent;

use crate::error::TransportError;

/// Retrieves the full body of a remote resource.
pub trait Transport {
  /// Perform a GET request and return the complete response body.
  fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
  fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
    (**self).get(url)
  }
}

/// Blocking HTTP transport with a global per-request timeout.
pub struct HttpTransport {
  agent: Agent,
  timeout: Duration,
}

impl HttpTransport {
  /// Create a transport bounded by `timeout` that follows at most `max_redirects` redirects.
  pub fn new(timeout: Duration, max_redirects: u32) -> Self {
    let config = Agent::config_builder()
      .timeout_global(Some(timeout))
      .max_redirects(max_redirects)
      .build();
    Self {
      agent: Agent::new_with_config(config),
      timeout,
    }
  }

  /// Timeout applied to each request.
  pub fn timeout(&self) -> Duration {
    self.timeout
  }
}

impl Transport for HttpTransport {
  fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
    let response = self.agent.get(url).call().map_err(map_ureq_error)?;

    // 3xx responses come back as `Ok` once the redirect budget is exhausted.
    let status = response.status();
    if !status.is_success() {
      return Err(TransportError::Status(status.as_u16()));
    }

    let mut body = Vec::new();
    response
      .into_body()
      .into_reader()
      .read_to_end(&mut body)
      .map_err(map_body_error)?;

    if body.is_empty() {
      return Err(TransportError::EmptyBody);
    }
    Ok(body)
  }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
  match err {
    ureq::Error::StatusCode(status) => TransportError::Status(status),
    ureq::Error::Timeout(_) => TransportError::Timeout,
    other => TransportError::Network(other.to_string()),
  }
}

fn map_body_error(err: io::Error) -> TransportError {
  let wraps_timeout = err
    .get_ref()
    .and_then(|inner| inner.downcast_ref::<ureq::Error>())
    .is_some_and(|inner| matches!(inner, ureq::Error::Timeout(_)));

  if wraps_timeout || err.kind() == io::ErrorKind::TimedOut {
    TransportError::Timeout
  } else {
    TransportError::Body(err)
  }
}
