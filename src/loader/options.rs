use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::{Map, Value};

/// A request body before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Text(String),
    /// Key/value pairs, sent URL-encoded when `json` is off.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, serde_json::Error> {
        serde_json::to_value(body).map(RequestBody::Json)
    }

    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// The body as JSON text. Text becomes a JSON string, a form becomes an
    /// object.
    fn to_json_text(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Text(text) => Value::from(text.as_str()).to_string(),
            RequestBody::Form(pairs) => {
                let object: Map<String, Value> = pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect();
                Value::Object(object).to_string()
            }
        }
    }
}

/// Per-call options for [`PortalApiDataLoader::fetch`](super::PortalApiDataLoader::fetch).
///
/// `json` defaults to `true`: the request carries
/// `Content-Type: application/json` (even without a body) and the body is
/// sent as JSON text. Turn it off to send text or a URL-encoded form as-is.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub body: Option<RequestBody>,
    pub json: bool,
    pub headers: HeaderMap,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            body: None,
            json: true,
            headers: HeaderMap::new(),
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying `body` serialized as JSON.
    pub fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Self, serde_json::Error> {
        Ok(Self::new().body(RequestBody::json(body)?))
    }

    /// Options carrying a URL-encoded form (and no JSON content type).
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new().body(RequestBody::form(pairs)).raw()
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Send the body as given instead of as JSON.
    pub fn raw(mut self) -> Self {
        self.json = false;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Apply the options to a request. Caller headers replace the client's
    /// defaults of the same name; the JSON content type replaces a caller's.
    pub(crate) fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        let mut headers = self.headers;
        if self.json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let builder = builder.headers(headers);

        match self.body {
            None => builder,
            Some(body) if self.json => builder.body(body.to_json_text()),
            Some(RequestBody::Json(value)) => builder.body(value.to_string()),
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
        }
    }
}
