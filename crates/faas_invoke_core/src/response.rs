use serde::Serialize;
use serde_json::Value;

use crate::output::{Output, OutputBody};
use crate::request::Headers;

pub const DEFAULT_STATUS_CODE: u16 = 200;
pub const REDIRECT_STATUS_CODE: u16 = 301;

/// Stateless factory of [`Output`] values.
///
/// Every method is a pure constructor: identical arguments produce identical
/// outputs, caller-supplied header maps are never mutated, and no per-call
/// state is held anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Response;

impl Response {
    /// An output with no body.
    pub fn empty(&self) -> Output {
        Output {
            body: OutputBody::Empty,
            status_code: DEFAULT_STATUS_CODE,
            headers: Headers::new(),
        }
    }

    /// An output with a textual body. Defaults: status 200, no headers.
    pub fn text(
        &self,
        body: impl Into<String>,
        status_code: Option<u16>,
        headers: Option<&Headers>,
    ) -> Output {
        Output {
            body: OutputBody::Text(body.into()),
            status_code: status_code.unwrap_or(DEFAULT_STATUS_CODE),
            headers: copy_headers(headers),
        }
    }

    #[deprecated(note = "use `text`")]
    pub fn send(
        &self,
        body: impl Into<String>,
        status_code: Option<u16>,
        headers: Option<&Headers>,
    ) -> Output {
        self.text(body, status_code, headers)
    }

    /// An output whose body is the textual-JSON encoding of `value`.
    pub fn json(
        &self,
        value: &Value,
        status_code: Option<u16>,
        headers: Option<&Headers>,
    ) -> Output {
        self.text(stable_output_json(value), status_code, headers)
    }

    /// An output carrying raw bytes, unencoded.
    pub fn binary(
        &self,
        bytes: Vec<u8>,
        status_code: Option<u16>,
        headers: Option<&Headers>,
    ) -> Output {
        Output {
            body: OutputBody::Binary(bytes),
            status_code: status_code.unwrap_or(DEFAULT_STATUS_CODE),
            headers: copy_headers(headers),
        }
    }

    /// A redirect output. Defaults to status 301 and records the target in
    /// the `location` header of the copied header map.
    pub fn redirect(
        &self,
        url: impl Into<String>,
        status_code: Option<u16>,
        headers: Option<&Headers>,
    ) -> Output {
        let mut headers = copy_headers(headers);
        headers.insert("location".to_string(), url.into());
        Output {
            body: OutputBody::Empty,
            status_code: status_code.unwrap_or(REDIRECT_STATUS_CODE),
            headers,
        }
    }
}

fn copy_headers(headers: Option<&Headers>) -> Headers {
    headers.cloned().unwrap_or_default()
}

pub fn stable_output_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}
