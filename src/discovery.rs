use crate::server::Server;
use crate::{Error, ErrorKind};
use std::collections::BTreeMap;

///
/// Property used to check the stubbing setup itself.
///
pub const SELF_TEST_PROPERTY: &str =
    "spring.cloud.discovery.client.simple.instances.wiremock-self-test.uri[0]";

///
/// Prefix of every overridden URL; the mock server port is appended to it.
///
pub const URL_PREFIX: &str = "http://localhost:";

///
/// A running application's configuration, accepting overrides after startup.
///
pub trait PropertySource {
    ///
    /// Applies all `overrides` as a single batch. Existing keys are replaced.
    ///
    fn apply(&mut self, overrides: Vec<(String, String)>);
}

///
/// An in-memory `PropertySource`.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    /// Creates an empty set of properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of properties set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no property is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All properties, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl PropertySource for Properties {
    fn apply(&mut self, overrides: Vec<(String, String)>) {
        self.values.extend(overrides);
    }
}

///
/// Points service-discovery URL properties at the mock server.
///
/// Each configured key is typically a static discovery entry such as
/// `spring.cloud.discovery.client.simple.instances.<service>.uri[0]`; every one of them is
/// set to `http://localhost:<port>`.
///
/// ```
/// use httpstub::{DiscoveryOverrides, Properties, Server};
///
/// let server = Server::new();
/// let mut properties = Properties::new();
///
/// DiscoveryOverrides::default()
///     .with_key("spring.cloud.discovery.client.simple.instances.billing.uri[0]")
///     .apply_server(&server, &mut properties)
///     .unwrap();
///
/// assert_eq!(
///     Some(server.url().replace("127.0.0.1", "localhost").as_str()),
///     properties.get("spring.cloud.discovery.client.simple.instances.billing.uri[0]")
/// );
/// ```
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryOverrides {
    keys: Vec<String>,
}

impl Default for DiscoveryOverrides {
    fn default() -> Self {
        Self::new([SELF_TEST_PROPERTY])
    }
}

impl DiscoveryOverrides {
    /// Overrides exactly the given keys.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a key to override.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// The keys to override.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    ///
    /// The key/value pairs pointing every key at `port`.
    ///
    /// Fails with `ErrorKind::Initialization` when `port` is 0, i.e. the mock server was
    /// never started.
    ///
    pub fn overrides(&self, port: u16) -> Result<Vec<(String, String)>, Error> {
        if port == 0 {
            return Err(Error::new_with_context(
                ErrorKind::Initialization,
                "the mock server port is 0",
            ));
        }

        let url = format!("{}{}", URL_PREFIX, port);

        Ok(self
            .keys
            .iter()
            .map(|key| (key.clone(), url.clone()))
            .collect())
    }

    ///
    /// Applies the overrides for `port` to `source` in one batch.
    ///
    pub fn apply_to(&self, port: u16, source: &mut dyn PropertySource) -> Result<(), Error> {
        let overrides = self.overrides(port)?;

        log::info!(
            "Mocking URLs with the mock server running on port {}: {:?}",
            port,
            overrides
        );
        source.apply(overrides);

        Ok(())
    }

    ///
    /// Applies the overrides for the port `server` is listening on.
    ///
    pub fn apply_server(
        &self,
        server: &Server,
        source: &mut dyn PropertySource,
    ) -> Result<(), Error> {
        self.apply_to(server.port(), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        assert_eq!(&[SELF_TEST_PROPERTY.to_string()], DiscoveryOverrides::default().keys());
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let mut properties = Properties::new();

        let err = DiscoveryOverrides::default()
            .apply_to(0, &mut properties)
            .unwrap_err();

        assert_eq!(ErrorKind::Initialization, err.kind);
        assert!(properties.is_empty());
    }

    #[test]
    fn test_every_key_is_overridden() {
        let mut properties = Properties::new();
        properties.apply(vec![("a".to_string(), "http://example.com".to_string())]);

        DiscoveryOverrides::new(["a", "b"])
            .apply_to(8089, &mut properties)
            .unwrap();

        assert_eq!(Some("http://localhost:8089"), properties.get("a"));
        assert_eq!(Some("http://localhost:8089"), properties.get("b"));
        assert_eq!(2, properties.len());
    }

    #[test]
    fn test_overrides_are_logged() {
        testing_logger::setup();

        DiscoveryOverrides::new(["service.uri"])
            .apply_to(1234, &mut Properties::new())
            .unwrap();

        testing_logger::validate(|captured_logs| {
            let infos: Vec<_> = captured_logs
                .iter()
                .filter(|log| log.level == log::Level::Info)
                .collect();

            assert_eq!(1, infos.len());
            assert!(infos[0].body.contains("port 1234"));
            assert!(infos[0].body.contains("http://localhost:1234"));
        });
    }
}
