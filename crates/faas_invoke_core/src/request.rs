use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ContractError;

pub type Headers = BTreeMap<String, String>;
pub type QueryParams = BTreeMap<String, String>;

/// The request body in its parallel representations.
///
/// All views are materialized once from the same byte buffer at construction,
/// so repeated reads can never disagree on content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    binary: Vec<u8>,
    text: String,
    json: Value,
}

impl RequestBody {
    pub fn from_bytes(binary: Vec<u8>) -> Self {
        let text = String::from_utf8_lossy(&binary).into_owned();
        let json = parse_body_json(&text);
        Self { binary, text, json }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let json = parse_body_json(&text);
        Self {
            binary: text.clone().into_bytes(),
            text,
            json,
        }
    }

    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// The raw undecoded bytes of the body.
    pub fn as_binary(&self) -> &[u8] {
        &self.binary
    }

    /// The body decoded as UTF-8 text. Invalid sequences are replaced.
    pub fn as_text(&self) -> &str {
        &self.text
    }

    /// The body parsed as JSON. Any JSON value type is accepted; empty or
    /// unparseable bodies yield `Value::Null`.
    pub fn as_json(&self) -> &Value {
        &self.json
    }

    #[deprecated(note = "use `as_text`")]
    pub fn as_raw(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.binary.is_empty()
    }
}

fn parse_body_json(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or(Value::Null)
}

/// Immutable snapshot of one inbound call, fully populated before the
/// per-invocation context is handed to function code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub body: RequestBody,
    pub headers: Headers,
    pub method: String,
    pub host: String,
    pub scheme: String,
    /// The port as text. Historically a string on the wire; kept textual so
    /// existing callers keep working.
    pub port: String,
    pub url: String,
    pub path: String,
    pub query: QueryParams,
    pub query_string: String,
}

/// Components a fronting host assembles a [`Request`] from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub port: Option<String>,
    pub path: String,
    pub query_string: String,
    pub headers: Headers,
    pub body: RequestBody,
}

impl Request {
    /// Builds a request by splitting a full URL into its components.
    ///
    /// The stored `url` keeps the caller's original formatting; `path`,
    /// `query_string`, and `query` are derived from it so the views stay
    /// internally consistent.
    pub fn from_url(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: Headers,
        body: RequestBody,
    ) -> Result<Self, ContractError> {
        let url = url.into();
        let split = split_url(&url)?;
        let port = split
            .port
            .unwrap_or_else(|| default_port(&split.scheme).to_string());

        Ok(Self {
            body,
            headers,
            method: normalize_method(method.into())?,
            host: split.host,
            scheme: split.scheme,
            port,
            url,
            query: parse_query_string(&split.query_string),
            query_string: split.query_string,
            path: split.path,
        })
    }

    /// Builds a request from pre-split components, assembling `url` from
    /// them.
    pub fn from_parts(parts: RequestParts) -> Result<Self, ContractError> {
        if parts.scheme.trim().is_empty() {
            return Err(ContractError::new("request scheme cannot be empty"));
        }
        if parts.host.trim().is_empty() {
            return Err(ContractError::new("request host cannot be empty"));
        }

        let port = parts
            .port
            .unwrap_or_else(|| default_port(&parts.scheme).to_string());
        let path = if parts.path.starts_with('/') {
            parts.path
        } else {
            format!("/{}", parts.path)
        };

        let mut url = format!("{}://{}:{}{}", parts.scheme, parts.host, port, path);
        if !parts.query_string.is_empty() {
            url.push('?');
            url.push_str(&parts.query_string);
        }

        Ok(Self {
            body: parts.body,
            headers: parts.headers,
            method: normalize_method(parts.method)?,
            host: parts.host,
            scheme: parts.scheme,
            port,
            url,
            path,
            query: parse_query_string(&parts.query_string),
            query_string: parts.query_string,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body_text(&self) -> &str {
        self.body.as_text()
    }

    pub fn body_json(&self) -> &Value {
        self.body.as_json()
    }

    pub fn body_binary(&self) -> &[u8] {
        self.body.as_binary()
    }

    #[deprecated(note = "use `body_text`")]
    pub fn body_raw(&self) -> &str {
        self.body.as_text()
    }
}

struct SplitUrl {
    scheme: String,
    host: String,
    port: Option<String>,
    path: String,
    query_string: String,
}

fn split_url(url: &str) -> Result<SplitUrl, ContractError> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| ContractError::new(format!("request URL is missing a scheme: {url}")))?;
    if scheme.is_empty() {
        return Err(ContractError::new(format!(
            "request URL is missing a scheme: {url}"
        )));
    }

    // The authority ends at the first '/' or '?'; a bare '?' means the
    // query follows the root path directly.
    let (authority, path_and_query) = match rest.find(['/', '?']) {
        Some(index) if rest[index..].starts_with('?') => {
            (&rest[..index], format!("/{}", &rest[index..]))
        }
        Some(index) => (&rest[..index], rest[index..].to_string()),
        None => (rest, "/".to_string()),
    };

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, "")) => (host, None),
        Some((host, port)) => (host, Some(port.to_string())),
        None => (authority, None),
    };
    if host.is_empty() {
        return Err(ContractError::new(format!(
            "request URL is missing a host: {url}"
        )));
    }

    let (path, query_string) = match path_and_query.split_once('?') {
        Some((path, query_string)) => (path, query_string),
        None => (path_and_query.as_str(), ""),
    };

    Ok(SplitUrl {
        scheme: scheme.to_string(),
        host: host.to_string(),
        port,
        path: path.to_string(),
        query_string: query_string.to_string(),
    })
}

fn default_port(scheme: &str) -> &'static str {
    if scheme.eq_ignore_ascii_case("https") {
        "443"
    } else {
        "80"
    }
}

fn normalize_method(method: String) -> Result<String, ContractError> {
    let method = method.trim().to_ascii_uppercase();
    if method.is_empty() {
        return Err(ContractError::new("request method cannot be empty"));
    }
    Ok(method)
}

pub fn parse_query_string(query_string: &str) -> QueryParams {
    let mut params = QueryParams::new();
    for pair in query_string.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => params.insert(key.to_string(), value.to_string()),
            None => params.insert(pair.to_string(), String::new()),
        };
    }
    params
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn splits_full_url_into_components() {
        let request = Request::from_url(
            "get",
            "https://api.example.com:443/foo/bar?x=1&y=2",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");

        assert_eq!(request.method, "GET");
        assert_eq!(request.scheme, "https");
        assert_eq!(request.host, "api.example.com");
        assert_eq!(request.port, "443");
        assert_eq!(request.path, "/foo/bar");
        assert_eq!(request.query_string, "x=1&y=2");
        assert_eq!(
            request.query,
            QueryParams::from([
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "2".to_string()),
            ])
        );
        assert_eq!(request.url, "https://api.example.com:443/foo/bar?x=1&y=2");
    }

    #[test]
    fn defaults_port_from_scheme_when_url_carries_none() {
        let https = Request::from_url(
            "GET",
            "https://api.example.com/foo",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");
        assert_eq!(https.port, "443");

        let http = Request::from_url(
            "GET",
            "http://api.example.com/foo",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");
        assert_eq!(http.port, "80");
    }

    #[test]
    fn empty_port_segment_falls_back_to_scheme_default() {
        let request = Request::from_url(
            "GET",
            "https://example.com:/foo",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");

        assert_eq!(request.host, "example.com");
        assert_eq!(request.port, "443");
        assert_eq!(request.path, "/foo");
    }

    #[test]
    fn url_with_query_but_no_path_splits_at_the_question_mark() {
        let request = Request::from_url(
            "GET",
            "https://api.example.com?x=1",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");

        assert_eq!(request.host, "api.example.com");
        assert_eq!(request.port, "443");
        assert_eq!(request.path, "/");
        assert_eq!(request.query_string, "x=1");
        assert_eq!(
            request.query,
            QueryParams::from([("x".to_string(), "1".to_string())])
        );
    }

    #[test]
    fn url_with_port_and_query_but_no_path_keeps_the_port() {
        let request = Request::from_url(
            "GET",
            "http://api.example.com:8080?x=1&y=2",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");

        assert_eq!(request.host, "api.example.com");
        assert_eq!(request.port, "8080");
        assert_eq!(request.path, "/");
        assert_eq!(request.query_string, "x=1&y=2");
    }

    #[test]
    fn url_without_path_yields_root_path_and_empty_query() {
        let request = Request::from_url(
            "GET",
            "http://example.com",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");

        assert_eq!(request.path, "/");
        assert_eq!(request.query_string, "");
        assert!(request.query.is_empty());
    }

    #[test]
    fn rejects_url_without_scheme() {
        let error = Request::from_url(
            "GET",
            "example.com/foo",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect_err("request should fail");
        assert!(error.message().contains("missing a scheme"));
    }

    #[test]
    fn from_parts_reassembles_url() {
        let request = Request::from_parts(RequestParts {
            method: "post".to_string(),
            scheme: "https".to_string(),
            host: "api.example.com".to_string(),
            port: Some("8443".to_string()),
            path: "/v1/run".to_string(),
            query_string: "verbose=true".to_string(),
            headers: Headers::new(),
            body: RequestBody::empty(),
        })
        .expect("request should build");

        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "https://api.example.com:8443/v1/run?verbose=true");
        assert_eq!(
            request.query,
            QueryParams::from([("verbose".to_string(), "true".to_string())])
        );
    }

    #[test]
    fn from_parts_rejects_empty_host() {
        let error = Request::from_parts(RequestParts {
            method: "GET".to_string(),
            scheme: "https".to_string(),
            host: "  ".to_string(),
            port: None,
            path: "/".to_string(),
            query_string: String::new(),
            headers: Headers::new(),
            body: RequestBody::empty(),
        })
        .expect_err("request should fail");
        assert_eq!(error.message(), "request host cannot be empty");
    }

    #[test]
    fn body_views_agree_for_text_body() {
        let body = RequestBody::from_text("hello");

        assert_eq!(body.as_text(), "hello");
        assert_eq!(body.as_binary(), b"hello");
        assert_eq!(
            String::from_utf8_lossy(body.as_binary()),
            body.as_text(),
            "binary view should decode to the text view"
        );
        #[allow(deprecated)]
        {
            assert_eq!(body.as_raw(), body.as_text());
        }
    }

    #[test]
    fn body_json_view_parses_once_and_stays_stable() {
        let body = RequestBody::from_text(r#"{"name":"ada","count":2}"#);

        let first = body.as_json().clone();
        assert_eq!(first, json!({"name": "ada", "count": 2}));
        assert_eq!(body.as_json(), &first, "repeated reads should not drift");
    }

    #[test]
    fn body_json_accepts_non_object_values() {
        assert_eq!(RequestBody::from_text("[1,2,3]").as_json(), &json!([1, 2, 3]));
        assert_eq!(RequestBody::from_text("\"plain\"").as_json(), &json!("plain"));
    }

    #[test]
    fn body_json_is_null_for_empty_or_unparseable_bodies() {
        assert_eq!(RequestBody::empty().as_json(), &Value::Null);
        assert_eq!(RequestBody::from_text("not json").as_json(), &Value::Null);
    }

    #[test]
    fn request_body_accessors_delegate_to_the_views() {
        let request = Request::from_url(
            "POST",
            "https://api.example.com/run",
            Headers::new(),
            RequestBody::from_text("hello"),
        )
        .expect("request should build");

        assert_eq!(request.body_text(), "hello");
        assert_eq!(request.body_binary(), b"hello");
        assert_eq!(request.body_json(), &Value::Null);
        #[allow(deprecated)]
        {
            assert_eq!(request.body_raw(), request.body_text());
        }
    }

    #[test]
    fn query_pair_without_value_maps_to_empty_string() {
        let params = parse_query_string("flag&x=1");
        assert_eq!(params.get("flag"), Some(&String::new()));
        assert_eq!(params.get("x"), Some(&"1".to_string()));
    }
}
