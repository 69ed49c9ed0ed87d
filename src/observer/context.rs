use axum::http::HeaderMap;

/// Header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header carrying the authenticated caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Ambient per-call data the observer may log. Passed explicitly into
/// every observation; nothing is read from globals.
pub trait CallContext {
    fn request_id(&self) -> Option<&str>;
    fn user_id(&self) -> Option<&str>;
}

/// Owned call context. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    request_id: Option<String>,
    user_id: Option<String>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = non_empty(request_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = non_empty(user_id.into());
        self
    }

    /// Copy the ambient ids out of request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            request_id: headers.request_id().map(str::to_owned),
            user_id: headers.user_id().map(str::to_owned),
        }
    }
}

fn non_empty(v: String) -> Option<String> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

impl CallContext for CallMetadata {
    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

impl CallContext for () {
    fn request_id(&self) -> Option<&str> {
        None
    }

    fn user_id(&self) -> Option<&str> {
        None
    }
}

impl CallContext for HeaderMap {
    fn request_id(&self) -> Option<&str> {
        header_value(self, REQUEST_ID_HEADER)
    }

    fn user_id(&self) -> Option<&str> {
        header_value(self, USER_ID_HEADER)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn empty_values_are_absent() {
        let meta = CallMetadata::new().with_request_id("").with_user_id("u-1");
        assert_eq!(meta.request_id(), None);
        assert_eq!(meta.user_id(), Some("u-1"));
    }

    #[test]
    fn reads_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-9"));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(""));

        assert_eq!(headers.request_id(), Some("req-9"));
        assert_eq!(headers.user_id(), None);

        let meta = CallMetadata::from_headers(&headers);
        assert_eq!(meta, CallMetadata::new().with_request_id("req-9"));
    }
}
