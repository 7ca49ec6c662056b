use crate::diff;
use crate::rule::Rule;
use crate::{Error, ErrorKind};
use bytes::Bytes;
use futures_util::future::{self, Either};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use tokio::net::TcpListener;
use tokio::runtime;
use tokio::sync::oneshot;

/// Body of every response that didn't come from a stub.
pub const NOT_MATCHED: &str = "Request was not matched";

///
/// Accepts stub rules. Registration is synchronous: the rule is active once `stub_for`
/// returns.
///
pub trait StubRegistry {
    ///
    /// Installs `rule`, replacing any rule with the same method and path.
    ///
    fn stub_for(&self, rule: Rule) -> Result<(), Error>;
}

///
/// Options to configure a mock server. Provides a default implementation.
///
/// ```
/// let opts = httpstub::ServerOpts { port: 0, ..Default::default() };
/// let server = httpstub::Server::new_with_opts(opts);
/// ```
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerOpts {
    /// The server host (defaults to 127.0.0.1)
    pub host: &'static str,
    /// The server port (defaults to 0, a random port picked by the OS)
    pub port: u16,
}

impl ServerOpts {
    pub(crate) fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerOpts {
    fn default() -> Self {
        Self {
            host: "127.0.0.1",
            port: 0,
        }
    }
}

#[derive(Debug)]
struct RegisteredRule {
    rule: Rule,
    hits: usize,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    rules: Vec<RegisteredRule>,
}

impl State {
    fn register(&mut self, rule: Rule) {
        match self
            .rules
            .iter_mut()
            .find(|registered| registered.rule.same_target(&rule))
        {
            Some(registered) => {
                log::debug!("Replacing stub {} with {}", registered.rule, rule);
                *registered = RegisteredRule { rule, hits: 0 };
            }
            None => self.rules.push(RegisteredRule { rule, hits: 0 }),
        }
    }

    fn respond(&mut self, method: &Method, path: &str) -> http::Response<Full<Bytes>> {
        if let Some(registered) = self
            .rules
            .iter_mut()
            .find(|registered| registered.rule.matches(method, path))
        {
            registered.hits += 1;
            log::debug!("Request {} {} matched stub {}", method, path, registered.rule);
            return registered.rule.response().to_http();
        }

        let path_is_known = self
            .rules
            .iter()
            .any(|registered| registered.rule.pattern().path() == path);
        let status = if path_is_known {
            StatusCode::NOT_IMPLEMENTED
        } else {
            StatusCode::NOT_FOUND
        };

        let requested = format!("{} {}", method, path);
        let patterns: Vec<String> = self
            .rules
            .iter()
            .map(|registered| registered.rule.pattern().to_string())
            .collect();

        let mut body = NOT_MATCHED.to_string();
        match diff::closest(&requested, patterns.iter().map(String::as_str)) {
            Some(closest) => {
                log::warn!(
                    "{}: {}\n> Closest stub:\n{}",
                    NOT_MATCHED,
                    requested,
                    diff::compare(closest, &requested, true)
                );
                body.push_str("\n\nClosest stub:\n");
                body.push_str(&diff::compare(closest, &requested, false));
                body.push('\n');
            }
            None => log::warn!("{}: {}", NOT_MATCHED, requested),
        }

        let mut response = http::Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response
    }

    fn hits(&self, method: &Method, path: &str) -> usize {
        self.rules
            .iter()
            .find(|registered| registered.rule.matches(method, path))
            .map_or(0, |registered| registered.hits)
    }
}

///
/// An in-process mock HTTP server.
///
/// The server listens on its own thread, driven by a single-threaded tokio runtime, so it
/// can be used from synchronous and asynchronous tests alike. Dropping the server stops it.
///
/// ```
/// use httpstub::{Method, NestedBuilder, Server, StubCommand};
///
/// let server = Server::new();
///
/// StubCommand::builder()
///     .request().method(Method::GET).path("/ping").and()
///     .response().body("pong").and()
///     .register(&server)
///     .unwrap();
///
/// // Point your client at server.url()
/// assert!(server.url().starts_with("http://127.0.0.1:"));
/// ```
///
pub struct Server {
    address: SocketAddr,
    state: Arc<RwLock<State>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    ///
    /// Starts a server on a random port.
    ///
    /// Panics if the server can't be started. See `Server::try_new` for a fallible version.
    ///
    #[track_caller]
    pub fn new() -> Server {
        Server::try_new().expect("the mock server failed to start")
    }

    ///
    /// Starts a server on a random port.
    ///
    pub fn try_new() -> Result<Server, Error> {
        Server::try_new_with_opts(ServerOpts::default())
    }

    ///
    /// Starts a server with the given options.
    ///
    /// Panics if the server can't be started. See `Server::try_new_with_opts` for a fallible
    /// version.
    ///
    #[track_caller]
    pub fn new_with_opts(opts: ServerOpts) -> Server {
        Server::try_new_with_opts(opts).expect("the mock server failed to start")
    }

    ///
    /// Starts a server with the given options and returns once it is listening.
    ///
    pub fn try_new_with_opts(opts: ServerOpts) -> Result<Server, Error> {
        let state = Arc::new(RwLock::new(State::default()));
        let address = opts.address();
        let (address_sender, address_receiver) = mpsc::channel::<Result<SocketAddr, Error>>();
        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();

        let server_state = state.clone();
        thread::Builder::new()
            .name(format!("httpstub::server({})", address))
            .spawn(move || {
                let runtime = match runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = address_sender.send(Err(Error::new_with_source(
                            ErrorKind::ServerFailure,
                            "could not build the runtime",
                            err,
                        )));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let listener = match TcpListener::bind(&address).await {
                        Ok(listener) => listener,
                        Err(err) => {
                            let _ = address_sender.send(Err(Error::new_with_source(
                                ErrorKind::ServerFailure,
                                address,
                                err,
                            )));
                            return;
                        }
                    };

                    let local_address = listener.local_addr().map_err(|err| {
                        Error::new_with_source(ErrorKind::ServerFailure, "local address", err)
                    });
                    let started = local_address.is_ok();
                    let _ = address_sender.send(local_address);

                    if started {
                        serve(listener, server_state, shutdown_receiver).await;
                    }
                });
            })
            .map_err(|err| {
                Error::new_with_source(ErrorKind::ServerFailure, "could not spawn the thread", err)
            })?;

        let address = address_receiver.recv().map_err(|err| {
            Error::new_with_source(ErrorKind::ServerFailure, "the server thread exited", err)
        })??;

        log::debug!("Server is listening at {}", address);

        Ok(Server {
            address,
            state,
            shutdown: Some(shutdown_sender),
        })
    }

    ///
    /// The host and port of the server, e.g. `"127.0.0.1:1234"`.
    /// Can be used with `std::net::TcpStream`.
    ///
    pub fn host_with_port(&self) -> String {
        self.address.to_string()
    }

    ///
    /// The URL of the server, e.g. `"http://127.0.0.1:1234"`.
    ///
    pub fn url(&self) -> String {
        format!("http://{}", self.address)
    }

    ///
    /// The port the server is listening on.
    ///
    pub fn port(&self) -> u16 {
        self.address.port()
    }

    ///
    /// The raw address of the server.
    ///
    pub fn socket_address(&self) -> SocketAddr {
        self.address
    }

    ///
    /// Removes every stub.
    ///
    pub fn reset(&self) {
        self.write_state().rules.clear();
    }

    ///
    /// The registered stubs, in registration order. A replaced stub keeps the position of the
    /// one it replaced.
    ///
    pub fn rules(&self) -> Vec<Rule> {
        self.read_state()
            .rules
            .iter()
            .map(|registered| registered.rule.clone())
            .collect()
    }

    ///
    /// How many requests the stub for `method` and `path` has served since it was registered.
    ///
    pub fn hits(&self, method: &Method, path: &str) -> usize {
        self.read_state().hits(method, path)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StubRegistry for Server {
    fn stub_for(&self, rule: Rule) -> Result<(), Error> {
        self.write_state().register(rule);
        Ok(())
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            log::debug!("Stopping server at {}", self.address);
            let _ = shutdown.send(());
        }
    }
}

async fn serve(
    listener: TcpListener,
    state: Arc<RwLock<State>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let accepted = match future::select(Box::pin(listener.accept()), &mut shutdown).await {
            Either::Left((accepted, _)) => accepted,
            Either::Right(_) => break,
        };

        let stream = match accepted {
            Ok((stream, _)) => stream,
            Err(err) => {
                log::debug!("Could not accept a connection: {}", err);
                continue;
            }
        };

        let state = state.clone();
        tokio::spawn(async move {
            let service = service_fn(move |request| handle_request(request, state.clone()));

            if let Err(err) = ConnectionBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::debug!("{:?}", err);
            }
        });
    }
}

async fn handle_request(
    request: hyper::Request<Incoming>,
    state: Arc<RwLock<State>>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = request.into_parts();

    // the body is never matched, only drained
    if let Err(err) = body.collect().await {
        log::debug!("Could not read the request body: {}", err);
    }

    let mut state = state.write().unwrap_or_else(PoisonError::into_inner);

    Ok(state.respond(&parts.method, parts.uri.path()))
}
