use crate::nested::{NestedBuilder, Reattach};
use crate::resource::{FileResources, ResourceLoader};
use crate::{Error, ErrorKind};
use http::StatusCode;

///
/// The response half of a `StubCommand`: what the mock server answers with.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            headers: Vec::new(),
            body: None,
        }
    }
}

impl Response {
    ///
    /// Creates a response builder nested in `parent`. Use `()` as the parent to build a
    /// standalone `Response`.
    ///
    pub fn builder<P>(parent: P) -> ResponseBuilder<P> {
        ResponseBuilder::resume(parent, Response::default())
    }

    /// The status code to respond with. Defaults to 200.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The configured headers, in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The configured body. `None` is served as an empty body.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

///
/// Configures a `Response`, then returns to its parent builder with `and()`.
///
#[derive(Debug)]
pub struct ResponseBuilder<P> {
    parent: P,
    section: Response,
}

impl<P> ResponseBuilder<P> {
    pub(crate) fn resume(parent: P, section: Response) -> Self {
        Self { parent, section }
    }

    ///
    /// Sets the status of the response. The default status is `200 OK`.
    ///
    /// ## Example
    ///
    /// ```
    /// use httpstub::{Response, StatusCode};
    ///
    /// let builder = Response::builder(()).status(StatusCode::CREATED);
    /// ```
    ///
    pub fn status(mut self, status: StatusCode) -> Self {
        self.section.status = status.as_u16();
        self
    }

    ///
    /// Sets the status of the response from a raw code. The code is validated on registration.
    ///
    pub fn status_code(mut self, status: u16) -> Self {
        self.section.status = status;
        self
    }

    ///
    /// Appends a response header. Headers are sent in order of first appearance; the values of
    /// a repeated name are sent together, in insertion order.
    ///
    pub fn header(mut self, field: &str, value: &str) -> Self {
        self.section
            .headers
            .push((field.to_owned(), value.to_owned()));
        self
    }

    /// Removes every header added so far.
    pub fn clear_headers(mut self) -> Self {
        self.section.headers.clear();
        self
    }

    ///
    /// Sets the response body.
    ///
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.section.body = Some(body.into());
        self
    }

    ///
    /// Sets the response body to the serialized `json` value.
    ///
    pub fn json_body(self, json: &serde_json::Value) -> Self {
        self.body(json.to_string())
    }

    ///
    /// Sets the response body from a resource under the default resource root
    /// (see `FileResources`).
    ///
    /// ## Example
    ///
    /// ```no_run
    /// use httpstub::{Response, StatusCode};
    ///
    /// let builder = Response::builder(())
    ///     .status(StatusCode::CREATED)
    ///     .body_from_resource("self-test/response1.json")
    ///     .expect("resource is readable");
    /// ```
    ///
    pub fn body_from_resource(self, path: &str) -> Result<Self, Error> {
        self.body_from_resource_with(&FileResources::default(), path)
    }

    ///
    /// Sets the response body from a resource read through `loader`.
    ///
    /// Fails with `ErrorKind::ResourceLoad` if the resource is missing or unreadable; the
    /// underlying error is kept as the error source.
    ///
    pub fn body_from_resource_with(
        self,
        loader: &dyn ResourceLoader,
        path: &str,
    ) -> Result<Self, Error> {
        let content = loader
            .load(path)
            .map_err(|err| Error::new_with_source(ErrorKind::ResourceLoad, path, err))?;

        Ok(self.body(content))
    }
}

impl<P: Reattach<Response>> NestedBuilder<P> for ResponseBuilder<P> {
    type Output = Response;

    fn build(&self) -> Response {
        self.section.clone()
    }

    fn and(mut self) -> P {
        self.parent.reattach(self.section);
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::error::Error as _;
    use std::io;

    struct MemoryResources(HashMap<&'static str, &'static str>);

    impl ResourceLoader for MemoryResources {
        fn load(&self, path: &str) -> io::Result<String> {
            self.0
                .get(path)
                .map(|content| content.to_string())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "resource not found"))
        }
    }

    #[test]
    fn test_defaults() {
        let response = Response::builder(()).build();

        assert_eq!(200, response.status());
        assert!(response.headers().is_empty());
        assert_eq!(None, response.body());
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let response = Response::builder(())
            .header("x-b", "2")
            .header("x-a", "1")
            .header("x-b", "3")
            .build();

        assert_eq!(
            &[
                ("x-b".to_string(), "2".to_string()),
                ("x-a".to_string(), "1".to_string()),
                ("x-b".to_string(), "3".to_string()),
            ],
            response.headers()
        );
    }

    #[test]
    fn test_clear_headers() {
        let response = Response::builder(())
            .header("etag", "abc")
            .clear_headers()
            .header("x-api-key", "1234")
            .build();

        assert_eq!(1, response.headers().len());
        assert_eq!("x-api-key", response.headers()[0].0);
    }

    #[test]
    fn test_status_code_accepts_raw_values() {
        let response = Response::builder(()).status_code(418).build();

        assert_eq!(418, response.status());
    }

    #[test]
    fn test_json_body() {
        let response = Response::builder(())
            .json_body(&serde_json::json!({"hello": "world"}))
            .build();

        assert_eq!(Some(r#"{"hello":"world"}"#), response.body());
    }

    #[test]
    fn test_body_from_resource() {
        let loader = MemoryResources(HashMap::from([("a.json", r#"{"k":"v"}"#)]));

        let response = Response::builder(())
            .body_from_resource_with(&loader, "a.json")
            .unwrap()
            .build();

        assert_eq!(Some(r#"{"k":"v"}"#), response.body());
    }

    #[test]
    fn test_body_from_missing_resource() {
        let loader = MemoryResources(HashMap::new());

        let err = Response::builder(())
            .body_from_resource_with(&loader, "missing.json")
            .unwrap_err();

        assert_eq!(ErrorKind::ResourceLoad, err.kind);
        assert_eq!(Some("missing.json".to_string()), err.context);
        assert_eq!("resource not found", err.source().unwrap().to_string());
    }
}
