use crate::client_addr::AddressPolicy;
use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull, DurationSeconds};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use trust_dns_client::rr::{LowerName, Name};

pub type Shared = Arc<Config>;

const HEALTHCHECK_PATH: &str = "/healthcheck";

/// The configuration document as it is found on disk, before any of the cross-references
/// between its sections have been checked.
///
/// Each of the three sections may be absent or `null`, in which case it is treated as empty.
/// Hostnames are kept as written; they are parsed as DNS names by [`Config::validate`].
#[serde_as]
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawConfig {
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub credentials: HashMap<String, String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub nsupdatekeys: BTreeMap<String, KeyDescriptor>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub hostnames: BTreeMap<String, String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub server: ServerSettings,
}

/// Where the update key for a hostname comes from. At least one of the two must be set for the
/// configuration to validate.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub key: Option<String>,
    pub filename: Option<PathBuf>,
}

impl KeyDescriptor {
    fn is_empty(&self) -> bool {
        self.key.is_none() && self.filename.is_none()
    }
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
    pub update_path: String,
    pub client_address: AddressPolicy,
    /// How many password hashes may be verified at the same time.
    pub max_concurrent_verifications: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 12345)),
            timeout: Duration::from_secs(10),
            update_path: "/nic/update".to_string(),
            client_address: AddressPolicy::default(),
            max_concurrent_verifications: 8,
        }
    }
}

/// A validated configuration. Only obtainable through [`Config::validate`], so every hostname
/// is known to have an update key and an owner with a stored credential.
#[derive(Debug, Clone)]
pub struct Config {
    credentials: HashMap<String, String>,
    nsupdatekeys: BTreeMap<LowerName, KeyDescriptor>,
    hostnames: BTreeMap<LowerName, String>,
    pub server: ServerSettings,
}

/// A single structural problem found in a [`RawConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NoCredentials,
    NoNsupdateKeys,
    NoHostnames,
    MissingKey(LowerName),
    MissingCredential(String),
    EmptyKeyDescriptor(LowerName),
    InvalidHostname(String),
    DuplicateHostname(String),
    InvalidUpdatePath(String),
    NoVerificationCapacity,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NoCredentials => write!(f, "No credentials."),
            Violation::NoNsupdateKeys => write!(f, "No nsupdatekeys."),
            Violation::NoHostnames => write!(f, "No hostnames."),
            Violation::MissingKey(hostname) => {
                write!(f, "Missing nsupdate-key for hostname {hostname}")
            }
            Violation::MissingCredential(user) => write!(f, "Missing credential for user {user}"),
            Violation::EmptyKeyDescriptor(hostname) => write!(
                f,
                "nsupdate-key {hostname} has neither filename nor inline key."
            ),
            Violation::InvalidHostname(hostname) => {
                write!(f, "Hostname {hostname} is not a valid DNS name.")
            }
            Violation::DuplicateHostname(hostname) => write!(
                f,
                "Hostname {hostname} appears more than once (hostnames are case-insensitive)."
            ),
            Violation::InvalidUpdatePath(path) => write!(
                f,
                "Update path \"{path}\" must start with '/' and differ from {HEALTHCHECK_PATH}."
            ),
            Violation::NoVerificationCapacity => {
                write!(f, "max_concurrent_verifications must be at least 1.")
            }
        }
    }
}

/// Every [`Violation`] found in one validation run, in the order they were detected.
///
/// Displays as one line per violation, each terminated by a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigReport(Vec<Violation>);

impl ConfigReport {
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.0 {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Config {
    /// Load and validate the JSON configuration document at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    ///
    /// Returns [`Error::InvalidJSON`] if the document is not JSON, or a field has the wrong type.
    /// No structural checks are run in that case.
    ///
    /// Returns [`Error::InvalidConfig`] if the document fails [`Config::validate`].
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let raw: RawConfig = serde_json::from_reader(reader)?;
        Self::validate(raw)
    }

    /// Check the cross-references of a parsed document.
    ///
    /// All checks always run, so the returned report names every problem at once: first the
    /// empty sections, then per-hostname problems in hostname order, then key descriptors with
    /// neither an inline key nor a filename, in key order. Hostnames that aren't DNS names or
    /// that collide case-insensitively, and unusable server settings, are reported last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] carrying the full [`ConfigReport`] if any check fails.
    pub fn validate(raw: RawConfig) -> Result<Self, Error> {
        let mut violations = vec![];
        let mut name_violations = vec![];

        let nsupdatekeys = normalize_hostnames(raw.nsupdatekeys, &mut name_violations);
        let hostnames = normalize_hostnames(raw.hostnames, &mut name_violations);

        if raw.credentials.is_empty() {
            violations.push(Violation::NoCredentials);
        }
        if nsupdatekeys.is_empty() {
            violations.push(Violation::NoNsupdateKeys);
        }
        if hostnames.is_empty() {
            violations.push(Violation::NoHostnames);
        }

        for (hostname, user) in &hostnames {
            if !nsupdatekeys.contains_key(hostname) {
                violations.push(Violation::MissingKey(hostname.clone()));
            }
            if !raw.credentials.contains_key(user) {
                violations.push(Violation::MissingCredential(user.clone()));
            }
        }

        for (hostname, descriptor) in &nsupdatekeys {
            if descriptor.is_empty() {
                violations.push(Violation::EmptyKeyDescriptor(hostname.clone()));
            }
        }

        violations.append(&mut name_violations);

        let update_path = &raw.server.update_path;
        if !update_path.starts_with('/') || update_path == HEALTHCHECK_PATH {
            violations.push(Violation::InvalidUpdatePath(update_path.clone()));
        }
        if raw.server.max_concurrent_verifications == 0 {
            violations.push(Violation::NoVerificationCapacity);
        }

        if !violations.is_empty() {
            return Err(Error::InvalidConfig(ConfigReport(violations)));
        }

        Ok(Config {
            credentials: raw.credentials,
            nsupdatekeys,
            hostnames,
            server: raw.server,
        })
    }

    /// The stored password hash for `user`, if the user is known.
    #[must_use]
    pub fn password_hash(&self, user: &str) -> Option<&str> {
        self.credentials.get(user).map(String::as_str)
    }

    /// The user allowed to update `hostname`, if the hostname is configured.
    #[must_use]
    pub fn owner_of(&self, hostname: &LowerName) -> Option<&str> {
        self.hostnames.get(hostname).map(String::as_str)
    }

    #[must_use]
    pub fn key_for(&self, hostname: &LowerName) -> Option<&KeyDescriptor> {
        self.nsupdatekeys.get(hostname)
    }
}

/// Parse the hostname keys of a section as DNS names. Entries that don't parse, or that name a
/// hostname already seen in another spelling, are dropped and reported.
fn normalize_hostnames<V>(
    section: BTreeMap<String, V>,
    violations: &mut Vec<Violation>,
) -> BTreeMap<LowerName, V> {
    let mut normalized = BTreeMap::new();
    for (hostname, value) in section {
        let Ok(name) = Name::from_str(&hostname) else {
            violations.push(Violation::InvalidHostname(hostname));
            continue;
        };
        let name = LowerName::from(name);
        if normalized.contains_key(&name) {
            violations.push(Violation::DuplicateHostname(hostname));
            continue;
        }
        normalized.insert(name, value);
    }
    normalized
}
