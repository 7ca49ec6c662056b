use crate::nested::{NestedBuilder, Reattach};
use crate::request::{Request, RequestBuilder};
use crate::response::{Response, ResponseBuilder};
use crate::rule::{self, ResponseDefinition, Rule};
use crate::server::StubRegistry;
use crate::{Error, ErrorKind};
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

const CONTENT_TYPE: &str = "content-type";
const DEFAULT_CONTENT_TYPE: &str = "application/json";

///
/// A stub to register on the mock server: a request descriptor and a response descriptor.
///
/// Only the method and the path of incoming requests are matched. Query string, headers and
/// body are ignored, so any request with the same method and path gets the same response.
///
/// Build one through the nested builders:
///
/// ```
/// use httpstub::{Method, NestedBuilder, Server, StatusCode, StubCommand};
///
/// let server = Server::new();
///
/// let command = StubCommand::builder()
///     .request()
///         .method(Method::GET)
///         .path("/hello")
///     .and()
///     .response()
///         .status(StatusCode::ACCEPTED)
///         .header("etag", "test-etag")
///         .body(r#"{"hello": "world"}"#)
///     .and()
///     .register(&server)
///     .unwrap();
///
/// // Re-registering the same method and path replaces the previous stub
/// command
///     .to_builder()
///     .response()
///         .status(StatusCode::PERMANENT_REDIRECT)
///     .and()
///     .register(&server)
///     .unwrap();
/// ```
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StubCommand {
    request: Option<Request>,
    response: Option<Response>,
}

impl StubCommand {
    /// Starts an empty builder.
    pub fn builder() -> StubCommandBuilder {
        StubCommandBuilder::default()
    }

    ///
    /// Starts a builder pre-filled with this command's request and response, to register a
    /// modified copy.
    ///
    pub fn to_builder(&self) -> StubCommandBuilder {
        StubCommandBuilder {
            request: self.request.clone(),
            response: self.response.clone(),
        }
    }

    /// The request descriptor, if one was configured.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// The response descriptor, if one was configured.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    ///
    /// Validates the command and translates it into a server rule.
    ///
    /// Fails with `ErrorKind::MissingField` when the request, its method or path, or the
    /// response is missing; with `ErrorKind::InvalidStatusCode` for a status outside of
    /// 100..=999; with `ErrorKind::UnsupportedMethod` for methods that can't be stubbed; and
    /// with `ErrorKind::InvalidHeader` for header names or values that aren't valid HTTP.
    ///
    pub fn to_rule(&self) -> Result<Rule, Error> {
        let request = self.request.as_ref().ok_or_else(|| missing("request"))?;
        let method = request
            .method()
            .ok_or_else(|| missing("request -> HTTP method"))?;
        let path = request.path().ok_or_else(|| missing("request -> path"))?;
        let response = self.response.as_ref().ok_or_else(|| missing("response"))?;
        let status = StatusCode::from_u16(response.status()).map_err(|err| {
            Error::new_with_source(ErrorKind::InvalidStatusCode, response.status(), err)
        })?;

        let pattern = rule::pattern_for(method, path)?;

        let mut definition = ResponseDefinition::new(status);
        for (field, value) in with_content_type(response.headers()) {
            let name = HeaderName::from_bytes(field.as_bytes())
                .map_err(|err| Error::new_with_source(ErrorKind::InvalidHeader, field, err))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::new_with_source(ErrorKind::InvalidHeader, field, err))?;
            definition = definition.with_header(name, value);
        }

        let body = response.body().unwrap_or_default().to_owned();

        Ok(pattern.will_return(definition.with_body(body)))
    }

    ///
    /// Registers the command with `registry`. Nothing reaches the registry when validation
    /// fails.
    ///
    /// The command is returned so that `to_builder` can be chained for a follow-up stub;
    /// registering the same method and path again overwrites the previous stub.
    ///
    pub fn register<R>(&self, registry: &R) -> Result<&Self, Error>
    where
        R: StubRegistry + ?Sized,
    {
        let rule = self.to_rule()?;
        log::debug!("Registering stub {}", rule);
        registry.stub_for(rule)?;

        Ok(self)
    }
}

fn missing(field: &str) -> Error {
    Error::new_with_context(ErrorKind::MissingField, field)
}

///
/// The configured headers, followed by `content-type: application/json` unless one of them
/// already is a content type.
///
fn with_content_type(headers: &[(String, String)]) -> Vec<(&str, &str)> {
    let mut fixed: Vec<(&str, &str)> = headers
        .iter()
        .map(|(field, value)| (field.as_str(), value.as_str()))
        .collect();

    let has_content_type = headers
        .iter()
        .any(|(field, _)| field.eq_ignore_ascii_case(CONTENT_TYPE));

    if !has_content_type {
        fixed.push((CONTENT_TYPE, DEFAULT_CONTENT_TYPE));
    }

    fixed
}

///
/// Accumulates the request and response sections of a `StubCommand`.
///
/// `request()` and `response()` can be called any number of times: each call resumes the
/// section left by the previous one.
///
#[derive(Debug, Default)]
pub struct StubCommandBuilder {
    request: Option<Request>,
    response: Option<Response>,
}

impl StubCommandBuilder {
    ///
    /// Creates the request builder, or resumes the existing one. Return to this builder with
    /// `and()`.
    ///
    pub fn request(mut self) -> RequestBuilder<Self> {
        let section = self.request.take().unwrap_or_default();
        RequestBuilder::resume(self, section)
    }

    ///
    /// Creates the response builder, or resumes the existing one. Return to this builder with
    /// `and()`.
    ///
    pub fn response(mut self) -> ResponseBuilder<Self> {
        let section = self.response.take().unwrap_or_default();
        ResponseBuilder::resume(self, section)
    }

    ///
    /// Builds every section that was configured and assembles the command. Sections never
    /// requested stay empty and are reported when the command is registered.
    ///
    pub fn build(self) -> StubCommand {
        let request = self
            .request
            .map(|section| RequestBuilder::resume((), section).build());
        let response = self
            .response
            .map(|section| ResponseBuilder::resume((), section).build());

        StubCommand { request, response }
    }

    ///
    /// Builds the command and registers it with `registry`.
    ///
    pub fn register<R>(self, registry: &R) -> Result<StubCommand, Error>
    where
        R: StubRegistry + ?Sized,
    {
        let command = self.build();
        command.register(registry)?;

        Ok(command)
    }
}

impl Reattach<Request> for StubCommandBuilder {
    fn reattach(&mut self, section: Request) {
        self.request = Some(section);
    }
}

impl Reattach<Response> for StubCommandBuilder {
    fn reattach(&mut self, section: Response) {
        self.response = Some(section);
    }
}
