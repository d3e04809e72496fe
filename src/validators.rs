//! Input validation shared by tool modules.

use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Maximum length of a fully qualified domain name.
const MAX_DOMAIN_LEN: usize = 253;

/// Default cap applied by [`sanitize_input`].
pub const DEFAULT_MAX_INPUT_LEN: usize = 1000;

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$")
        .expect("domain pattern is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

static UNSAFE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;&|`$(){}\[\]<>]").expect("unsafe character pattern is valid"));

/// Kind of scan target recognised by [`validate_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Url,
    Ip,
    Domain,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Ip => "ip",
            Self::Domain => "domain",
        }
    }
}

pub fn is_valid_ip(candidate: &str) -> bool {
    candidate.parse::<IpAddr>().is_ok()
}

pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty() && domain.len() <= MAX_DOMAIN_LEN && DOMAIN_RE.is_match(domain)
}

/// A URL needs both a scheme and a host.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Classify a scan target, checked as URL, then IP, then domain.
pub fn validate_target(target: &str) -> Result<TargetKind, String> {
    let target = target.trim();
    if target.is_empty() {
        return Err("Target must be a non-empty string".to_string());
    }

    if is_valid_url(target) {
        Ok(TargetKind::Url)
    } else if is_valid_ip(target) {
        Ok(TargetKind::Ip)
    } else if is_valid_domain(target) {
        Ok(TargetKind::Domain)
    } else {
        Err(format!("Invalid target format: {target}"))
    }
}

/// Strip shell metacharacters, cap the length, and trim whitespace.
pub fn sanitize_input(input: &str, max_len: usize) -> String {
    let stripped = UNSAFE_CHARS_RE.replace_all(input, "");
    let capped: String = stripped.chars().take(max_len).collect();
    capped.trim().to_string()
}
