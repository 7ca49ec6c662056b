use std::error::Error as ErrorTrait;
use std::fmt::Display;

///
/// Contains information about an error occurence
///
#[derive(Debug)]
pub struct Error {
    /// The type of this error
    pub kind: ErrorKind,
    /// Some errors come with more context
    pub context: Option<String>,
    source: Option<Box<dyn ErrorTrait + Send + Sync + 'static>>,
}

impl Error {
    pub(crate) fn new_with_context(kind: ErrorKind, context: impl Display) -> Error {
        Error {
            kind,
            context: Some(context.to_string()),
            source: None,
        }
    }

    pub(crate) fn new_with_source(
        kind: ErrorKind,
        context: impl Display,
        source: impl ErrorTrait + Send + Sync + 'static,
    ) -> Error {
        Error {
            kind,
            context: Some(context.to_string()),
            source: Some(Box::new(source)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (context: {})",
            self.kind.description(),
            self.context.as_deref().unwrap_or("none")
        )?;

        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }

        Ok(())
    }
}

impl ErrorTrait for Error {
    fn source(&self) -> Option<&(dyn ErrorTrait + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn ErrorTrait + 'static))
    }
}

///
/// The type of an error
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A field required for registration was never set
    MissingField,
    /// The HTTP method has no stub registration counterpart
    UnsupportedMethod,
    /// The status code is invalid or out of range
    InvalidStatusCode,
    /// A response header name or value is not valid HTTP
    InvalidHeader,
    /// A response body resource could not be found or read
    ResourceLoad,
    /// The mock server port is unset
    Initialization,
    /// The server could not be started
    ServerFailure,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "a required field is missing",
            ErrorKind::UnsupportedMethod => "unsupported HTTP method",
            ErrorKind::InvalidStatusCode => "invalid status code",
            ErrorKind::InvalidHeader => "invalid response header",
            ErrorKind::ResourceLoad => "error reading resource",
            ErrorKind::Initialization => "the mock server is not initialized",
            ErrorKind::ServerFailure => "the server is not running",
        }
    }
}
