use crate::nested::{NestedBuilder, Reattach};
use http::Method;

///
/// The request half of a `StubCommand`: which method and exact path the stub answers to.
///
/// Both fields are optional while building; a missing one is reported when the command is
/// registered.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    method: Option<Method>,
    path: Option<String>,
}

impl Request {
    ///
    /// Creates a request builder nested in `parent`. Use `()` as the parent to build a
    /// standalone `Request`.
    ///
    pub fn builder<P>(parent: P) -> RequestBuilder<P> {
        RequestBuilder::resume(parent, Request::default())
    }

    /// The HTTP method, if set.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The exact URL path, if set.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

///
/// Configures a `Request`, then returns to its parent builder with `and()`.
///
#[derive(Debug)]
pub struct RequestBuilder<P> {
    parent: P,
    section: Request,
}

impl<P> RequestBuilder<P> {
    pub(crate) fn resume(parent: P, section: Request) -> Self {
        Self { parent, section }
    }

    ///
    /// Sets the HTTP method to match.
    ///
    /// ## Example
    ///
    /// ```
    /// use httpstub::{Method, Request};
    ///
    /// let builder = Request::builder(()).method(Method::DELETE);
    /// ```
    ///
    pub fn method(mut self, method: Method) -> Self {
        self.section.method = Some(method);
        self
    }

    ///
    /// Sets the URL path to match. The path is compared exactly; the query string of incoming
    /// requests is ignored.
    ///
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.section.path = Some(path.into());
        self
    }
}

impl<P: Reattach<Request>> NestedBuilder<P> for RequestBuilder<P> {
    type Output = Request;

    fn build(&self) -> Request {
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

    #[test]
    fn test_build_without_fields() {
        let request = Request::builder(()).build();

        assert_eq!(None, request.method());
        assert_eq!(None, request.path());
    }

    #[test]
    fn test_build_with_fields() {
        let request = Request::builder(())
            .method(Method::PATCH)
            .path("/users/1")
            .build();

        assert_eq!(Some(&Method::PATCH), request.method());
        assert_eq!(Some("/users/1"), request.path());
    }

    #[test]
    fn test_later_calls_overwrite_fields() {
        let request = Request::builder(())
            .path("/first")
            .path("/second")
            .build();

        assert_eq!(Some("/second"), request.path());
    }

    #[test]
    fn test_and_hands_section_back() {
        #[derive(Default)]
        struct Parent(Option<Request>);

        impl Reattach<Request> for Parent {
            fn reattach(&mut self, section: Request) {
                self.0 = Some(section);
            }
        }

        let parent = Request::builder(Parent::default())
            .method(Method::GET)
            .and();

        assert_eq!(Some(&Method::GET), parent.0.unwrap().method());
    }
}
