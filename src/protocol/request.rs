//! Inbound request representation.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// HTTP method as seen by commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    /// Parse a method token (case-insensitive).
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("GET") || token.eq_ignore_ascii_case("HEAD") {
            Method::Get
        } else if token.eq_ignore_ascii_case("POST") {
            Method::Post
        } else {
            Method::Other
        }
    }
}

/// A file part of a `multipart/form-data` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A request as handed to the dispatch layer.
///
/// Built by the HTTP adapter (or directly in tests). Query and form
/// parameters are merged into one multi-valued map, query values first.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query: Option<String>,
    params: HashMap<String, Vec<String>>,
    headers: HashMap<String, String>,
    uploads: HashMap<String, UploadedFile>,
    session_id: Option<String>,
}

impl HttpRequest {
    /// Create a request for the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            params: HashMap::new(),
            headers: HashMap::new(),
            uploads: HashMap::new(),
            session_id: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Add parameters from a raw query string (`a=1&b=2`).
    pub fn with_query(mut self, query: &str) -> Self {
        if !query.is_empty() {
            self.query = Some(match self.query.take() {
                Some(existing) => format!("{}&{}", existing, query),
                None => query.to_string(),
            });
        }
        self.extend_urlencoded(query.as_bytes());
        self
    }

    /// Add parameters from an `application/x-www-form-urlencoded` body.
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.extend_urlencoded(body);
        self
    }

    /// Add a single parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Add a header. Header names are case-insensitive.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Attach an uploaded file under its form field name. Empty uploads are ignored.
    pub fn with_upload(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        if !bytes.is_empty() {
            let file = UploadedFile {
                file_name: file_name.into(),
                bytes,
            };
            self.uploads.insert(field.into(), file);
        }
        self
    }

    /// Attach the session id carried by the request cookie.
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    fn extend_urlencoded(&mut self, input: &[u8]) {
        for (key, value) in url::form_urlencoded::parse(input) {
            self.params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path, without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, if the URL had one.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Path and query as requested (`/user/order/list.do?page=2`).
    pub fn target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// First value of a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(|s| s.as_str())
    }

    /// All values of a parameter.
    pub fn param_values(&self, key: &str) -> &[String] {
        self.params.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Uploaded file for a form field.
    pub fn upload(&self, field: &str) -> Option<&UploadedFile> {
        self.uploads.get(field)
    }

    /// Session id from the request cookie, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Parameters as a JSON object, for audit logging.
    pub fn params_json(&self) -> Value {
        let mut map = Map::new();
        for (key, values) in &self.params {
            let value = match values.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }
}

/// Extract a cookie value from a `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
