//! Per-request information supplied by the host.

/// User-agent fragment sent by Lighthouse-based audits (PageSpeed Insights included).
pub const SPEED_CHECK_SIGNATURE: &str = "Lighthouse";

/// Client details of the request being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
  user_agent: Option<String>,
}

impl RequestContext {
  /// Build a context from the request's `User-Agent` header, if it sent one.
  pub fn new(user_agent: Option<impl Into<String>>) -> Self {
    Self {
      user_agent: user_agent.map(Into::into),
    }
  }

  /// Declared client identity, empty when the header was absent.
  pub fn user_agent(&self) -> &str {
    self.user_agent.as_deref().unwrap_or_default()
  }

  /// Case-sensitive substring match against [`SPEED_CHECK_SIGNATURE`].
  pub fn is_speed_check(&self) -> bool {
    self.user_agent().contains(SPEED_CHECK_SIGNATURE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_lighthouse_anywhere_in_agent() {
    let request = RequestContext::new(Some(
      "Mozilla/5.0 (Linux; Android 11) Chrome/120.0 Mobile Safari/537.36 Chrome-Lighthouse",
    ));
    assert!(request.is_speed_check());
    assert!(RequestContext::new(Some("Lighthouse/11.0")).is_speed_check());
  }

  #[test]
  fn match_is_case_sensitive() {
    assert!(!RequestContext::new(Some("lighthouse-ci")).is_speed_check());
  }

  #[test]
  fn missing_agent_is_not_a_speed_check() {
    let request = RequestContext::new(None::<String>);
    assert_eq!(request.user_agent(), "");
    assert!(!request.is_speed_check());
  }
}
