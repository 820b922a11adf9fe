//! Glob-style URL match patterns.
//!
//! ```text
//! pattern := "<all_urls>" | scheme "://" host [ path ]
//! scheme  := "*" | [a-z][a-z0-9+.-]*
//! host    := "*" | [ "*." ] glob
//! path    := "/" glob
//! ```
//!
//! - A `*` scheme stands for `http`, `https`, `ws` and `wss`.
//! - `*.example.com` matches `example.com` and every subdomain of it.
//! - A host glob containing `:` is compared against `host:port`.
//! - A missing path means `/*`. The path glob sees the query string too.
//! - Only `file` patterns may have an empty host.
//!
//! Matching never fails: URLs that do not parse simply do not match.

use regex::Regex;
use reqmux_core::PatternError;
use std::fmt;
use url::Url;

/// Pattern that matches every URL.
pub const ALL_URLS: &str = "<all_urls>";

const WILDCARD_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

#[derive(Debug, Clone)]
enum Scheme {
    Any,
    Exact(String),
}

#[derive(Debug, Clone)]
enum Host {
    Any,
    Glob { regex: Regex, with_port: bool },
}

#[derive(Debug, Clone)]
enum Compiled {
    AllUrls,
    Parts {
        scheme: Scheme,
        host: Host,
        path: Regex,
    },
}

/// A parsed, ready-to-match URL pattern.
#[derive(Clone)]
pub struct MatchPattern {
    raw: String,
    compiled: Compiled,
}

impl MatchPattern {
    /// Parses and compiles `pattern`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if pattern.chars().any(char::is_whitespace) {
            return Err(PatternError::Whitespace(pattern.to_string()));
        }
        if pattern == ALL_URLS {
            return Ok(Self {
                raw: pattern.to_string(),
                compiled: Compiled::AllUrls,
            });
        }

        let (scheme, rest) = pattern
            .split_once("://")
            .ok_or_else(|| PatternError::MissingSeparator(pattern.to_string()))?;
        let scheme = parse_scheme(pattern, scheme)?;

        let (host, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/*"),
        };
        let host = parse_host(pattern, &scheme, host)?;

        Ok(Self {
            raw: pattern.to_string(),
            compiled: Compiled::Parts {
                scheme,
                host,
                path: glob(pattern, path, ".*", "")?,
            },
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `url` satisfies this pattern.
    pub fn matches(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(url) => self.matches_url(&url),
            Err(_) => false,
        }
    }

    /// Whether an already-parsed URL satisfies this pattern.
    pub fn matches_url(&self, url: &Url) -> bool {
        let Compiled::Parts { scheme, host, path } = &self.compiled else {
            return true;
        };

        let scheme_ok = match scheme {
            Scheme::Any => WILDCARD_SCHEMES.contains(&url.scheme()),
            Scheme::Exact(s) => s == url.scheme(),
        };
        if !scheme_ok {
            return false;
        }

        let host_ok = match host {
            Host::Any => true,
            Host::Glob { regex, with_port } => {
                let name = url.host_str().unwrap_or("");
                match (with_port, url.port_or_known_default()) {
                    (true, Some(port)) => regex.is_match(&format!("{name}:{port}")),
                    _ => regex.is_match(name),
                }
            }
        };
        if !host_ok {
            return false;
        }

        match url.query() {
            Some(query) => path.is_match(&format!("{}?{}", url.path(), query)),
            None => path.is_match(url.path()),
        }
    }
}

impl fmt::Debug for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MatchPattern").field(&self.raw).finish()
    }
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for MatchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for MatchPattern {}

impl std::str::FromStr for MatchPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One-off check of `url` against `pattern`.
///
/// Malformed patterns and URLs never match.
pub fn matches(pattern: &str, url: &str) -> bool {
    MatchPattern::parse(pattern).is_ok_and(|p| p.matches(url))
}

fn parse_scheme(pattern: &str, scheme: &str) -> Result<Scheme, PatternError> {
    if scheme == "*" {
        return Ok(Scheme::Any);
    }
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(PatternError::InvalidScheme {
            pattern: pattern.to_string(),
            scheme: scheme.to_string(),
        });
    }
    Ok(Scheme::Exact(scheme.to_ascii_lowercase()))
}

fn parse_host(pattern: &str, scheme: &Scheme, host: &str) -> Result<Host, PatternError> {
    let invalid = || PatternError::InvalidHost {
        pattern: pattern.to_string(),
        host: host.to_string(),
    };

    if host == "*" {
        return Ok(Host::Any);
    }
    if host.is_empty() {
        return match scheme {
            Scheme::Exact(s) if s == "file" => Ok(Host::Glob {
                regex: glob(pattern, "", "", "")?,
                with_port: false,
            }),
            _ => Err(invalid()),
        };
    }
    if host.contains(['?', '#', '@']) {
        return Err(invalid());
    }

    let host = host.to_ascii_lowercase();
    let with_port = host.contains(':');
    let regex = match host.strip_prefix("*.") {
        Some(rest) if !rest.is_empty() => glob(pattern, rest, "[^/]*", r"(?:[^/]*\.)?")?,
        Some(_) => return Err(invalid()),
        None => glob(pattern, &host, "[^/]*", "")?,
    };
    Ok(Host::Glob { regex, with_port })
}

/// Compiles a `*` glob into an anchored regex. `star` replaces each `*`;
/// `prefix` is prepended verbatim.
fn glob(pattern: &str, source: &str, star: &str, prefix: &str) -> Result<Regex, PatternError> {
    let body = source
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(star);
    Regex::new(&format!("^{prefix}{body}$")).map_err(|err| PatternError::Compile {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}
