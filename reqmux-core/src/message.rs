//! Request details handed to listeners and the replies they produce.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata about an intercepted request, as delivered by the host.
///
/// Fields the host sends that are not modelled here are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    /// Host-assigned request id.
    #[serde(default)]
    pub id: u64,
    /// The request URL.
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: String,
    /// What the request loads, e.g. `mainFrame` or `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Referring URL, when the host reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// Any other request metadata.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestDetails {
    /// Details for a `GET` of `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            ..Self::default()
        }
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Sets the host request id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

/// The decision returned to the host for a reply-bearing request.
///
/// Listeners complete with a `Reply`; resolvers return one to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Abort the request.
    #[serde(default)]
    pub cancel: bool,
    /// Redirect the request to another URL.
    #[serde(default, rename = "redirectURL", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Replacement request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, String>>,
    /// Replacement response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, Vec<String>>>,
    /// Replacement status line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_line: Option<String>,
    /// Free-form fields forwarded to the host untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reply {
    /// "Do not alter the request."
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Abort the request.
    pub fn cancel() -> Self {
        Self {
            cancel: true,
            ..Self::default()
        }
    }

    /// Redirect the request.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            redirect_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets a free-form field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Reads a free-form field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// True if this reply leaves the request untouched.
    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}
