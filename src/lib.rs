#![warn(missing_docs)]

//!
//! Httpstub registers HTTP stubs on an in-process mock server for integration tests, and
//! points service-discovery URLs at that server.
//!
//! Stubs are described with a two-level builder: the request and the response are each
//! configured through their own nested builder, and `and()` returns to the enclosing one.
//!
//! # Getting Started
//!
//! Start a server, register a stub, and point your client at `server.url()`:
//!
//! ## Example
//!
//! ```
//! use httpstub::{Method, NestedBuilder, Server, StatusCode, StubCommand};
//!
//! let server = Server::new();
//!
//! StubCommand::builder()
//!     .request()
//!         .method(Method::GET)
//!         .path("/hello")
//!     .and()
//!     .response()
//!         .status(StatusCode::ACCEPTED)
//!         .header("content-type", "text/plain")
//!         .header("x-api-key", "1234")
//!         .body("world")
//!     .and()
//!     .register(&server)
//!     .unwrap();
//!
//! // Any calls to GET /hello beyond this line will respond with 202, the
//! // `content-type: text/plain` header and the body "world".
//! ```
//!
//! # Matching
//!
//! Stubs match by **method and exact path only**. The query string, the request headers and
//! the request body are ignored, so any request with the same method and path gets the same
//! response.
//!
//! The methods that can be stubbed are GET, POST, PUT, DELETE, PATCH, OPTIONS and HEAD.
//! Registering any other method fails with `ErrorKind::UnsupportedMethod`.
//!
//! # Non-matching calls
//!
//! Calls to a path without any stub return *404 Not Found*. Calls to a stubbed path with a
//! method that wasn't stubbed return *501 Not Implemented*. In both cases the body starts
//! with `Request was not matched` and, when there are stubs, shows the closest one.
//!
//! # Responses
//!
//! The response status defaults to 200. Headers are sent in order of first appearance, and the
//! values of a repeated name are sent together, in insertion order. When none of the headers
//! is a `content-type`, `content-type: application/json` is appended. A response without a body
//! is served with an empty body.
//!
//! Bodies can also be read from files, relative to `tests/resources` by default:
//!
//! ## Example
//!
//! ```no_run
//! use httpstub::{Method, NestedBuilder, Server, StatusCode, StubCommand};
//!
//! let server = Server::new();
//!
//! StubCommand::builder()
//!     .request().method(Method::POST).path("/orders").and()
//!     .response()
//!         .status(StatusCode::CREATED)
//!         .body_from_resource("self-test/response1.json")
//!         .unwrap()
//!     .and()
//!     .register(&server)
//!     .unwrap();
//! ```
//!
//! # Overwriting stubs
//!
//! Registering the same method and path again replaces the previous stub. `to_builder()`
//! starts from an existing command:
//!
//! ## Example
//!
//! ```
//! use httpstub::{Method, NestedBuilder, Server, StatusCode, StubCommand};
//!
//! let server = Server::new();
//!
//! let command = StubCommand::builder()
//!     .request().method(Method::PUT).path("/b").and()
//!     .response().status(StatusCode::UNAUTHORIZED).and()
//!     .register(&server)
//!     .unwrap();
//!
//! command
//!     .to_builder()
//!     .response().status(StatusCode::PERMANENT_REDIRECT).and()
//!     .register(&server)
//!     .unwrap();
//!
//! assert_eq!(1, server.rules().len());
//! ```
//!
//! # Service discovery
//!
//! `DiscoveryOverrides` sets a list of URL properties to `http://localhost:<port>` on a
//! `PropertySource`, so that the application under test talks to the mock server.
//!
//! # Debug
//!
//! Httpstub logs through the `log` crate. Install any logger (e.g. `env_logger`) and set the
//! level to `debug` to see registrations and matches; unmatched requests are logged as
//! warnings.
//!

pub use command::{StubCommand, StubCommandBuilder};
pub use discovery::{
    DiscoveryOverrides, Properties, PropertySource, SELF_TEST_PROPERTY, URL_PREFIX,
};
pub use error::{Error, ErrorKind};
pub use http::{Method, StatusCode};
pub use nested::{NestedBuilder, Reattach};
pub use request::{Request, RequestBuilder};
pub use resource::{FileResources, ResourceLoader, RESOURCES_ENV};
pub use response::{Response, ResponseBuilder};
pub use rule::{pattern_for, ResponseDefinition, Rule, RulePattern};
pub use server::{Server, ServerOpts, StubRegistry, NOT_MATCHED};

mod command;
mod diff;
mod discovery;
mod error;
mod nested;
mod request;
mod resource;
mod response;
mod rule;
mod server;
