use crate::{Error, ErrorKind};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::Full;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::fmt;

type PatternFn = fn(&str) -> RulePattern;

/// Every method a stub can be registered for, and the pattern constructor it maps to.
static METHOD_TABLE: [(Method, PatternFn); 7] = [
    (Method::GET, RulePattern::get as PatternFn),
    (Method::POST, RulePattern::post as PatternFn),
    (Method::PUT, RulePattern::put as PatternFn),
    (Method::DELETE, RulePattern::delete as PatternFn),
    (Method::PATCH, RulePattern::patch as PatternFn),
    (Method::OPTIONS, RulePattern::options as PatternFn),
    (Method::HEAD, RulePattern::head as PatternFn),
];

///
/// Looks up the pattern constructor for `method` and applies it to `path`.
///
/// Fails with `ErrorKind::UnsupportedMethod` for methods outside of GET, POST, PUT, DELETE,
/// PATCH, OPTIONS and HEAD.
///
pub fn pattern_for(method: &Method, path: &str) -> Result<RulePattern, Error> {
    METHOD_TABLE
        .iter()
        .find(|(supported, _)| supported == method)
        .map(|(_, pattern)| pattern(path))
        .ok_or_else(|| Error::new_with_context(ErrorKind::UnsupportedMethod, method))
}

///
/// The request side of a rule: an exact method and an exact URL path.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulePattern {
    method: Method,
    path: String,
}

impl RulePattern {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_owned(),
        }
    }

    /// Matches `GET` requests to `path`.
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Matches `POST` requests to `path`.
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Matches `PUT` requests to `path`.
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Matches `DELETE` requests to `path`.
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Matches `PATCH` requests to `path`.
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Matches `OPTIONS` requests to `path`.
    pub fn options(path: &str) -> Self {
        Self::new(Method::OPTIONS, path)
    }

    /// Matches `HEAD` requests to `path`.
    pub fn head(path: &str) -> Self {
        Self::new(Method::HEAD, path)
    }

    /// The method to match.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The exact path to match.
    pub fn path(&self) -> &str {
        &self.path
    }

    ///
    /// Completes the rule with the response to serve.
    ///
    pub fn will_return(self, response: ResponseDefinition) -> Rule {
        Rule {
            id: rand::rng()
                .sample_iter(&Alphanumeric)
                .map(char::from)
                .take(24)
                .collect(),
            pattern: self,
            response,
        }
    }
}

impl fmt::Display for RulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

///
/// The response side of a rule, in wire-ready form.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseDefinition {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
}

impl ResponseDefinition {
    /// An empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The status to respond with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers to respond with, in insertion order. On the wire, values of a repeated name
    /// are grouped under its first appearance.
    pub fn headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }

    /// The body to respond with.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub(crate) fn to_http(&self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body.clone()));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }

        response
    }
}

///
/// A stub installed on the mock server: requests matching `pattern` receive `response`.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    id: String,
    pattern: RulePattern,
    response: ResponseDefinition,
}

impl Rule {
    /// A random identifier assigned when the rule was created.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// What the rule matches.
    pub fn pattern(&self) -> &RulePattern {
        &self.pattern
    }

    /// What the rule responds with.
    pub fn response(&self) -> &ResponseDefinition {
        &self.response
    }

    pub(crate) fn same_target(&self, other: &Rule) -> bool {
        self.pattern == other.pattern
    }

    pub(crate) fn matches(&self, method: &Method, path: &str) -> bool {
        self.pattern.method == *method && self.pattern.path == path
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.pattern, self.response.status)
    }
}
