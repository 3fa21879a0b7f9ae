//! Lookup catalog: which CSV file backs each domain/stack and which columns are searched
//! and shown.
//!
//! The built-in catalog (`CatalogConfig::default()`) covers the auth reference tables. A
//! TOML file can override individual entries; keys it does not mention keep their defaults.

use crate::bm25::Bm25Params;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Searchable reference domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Authentication methods (JWT, sessions, SAML, ...).
    AuthMethods,
    /// OAuth 2.0 grant flows.
    #[cfg_attr(feature = "cli", value(name = "oauth2-flows"))]
    Oauth2Flows,
    /// Registered and common JWT claims.
    JwtClaims,
    /// HTTP security headers.
    SecurityHeaders,
    /// Hosted identity providers.
    OidcProviders,
    /// General security rules; the fallback domain.
    SecurityRules,
}

impl Domain {
    /// All domains, in detection priority order.
    pub const ALL: [Domain; 6] = [
        Domain::AuthMethods,
        Domain::Oauth2Flows,
        Domain::JwtClaims,
        Domain::SecurityHeaders,
        Domain::OidcProviders,
        Domain::SecurityRules,
    ];

    /// Kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::AuthMethods => "auth-methods",
            Domain::Oauth2Flows => "oauth2-flows",
            Domain::JwtClaims => "jwt-claims",
            Domain::SecurityHeaders => "security-headers",
            Domain::OidcProviders => "oidc-providers",
            Domain::SecurityRules => "security-rules",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown domain: {s}"))
    }
}

/// Technology stack with its own guideline table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    /// Node.js.
    Nodejs,
    /// Python.
    Python,
    /// Go.
    Go,
    /// Java.
    Java,
    /// .NET.
    Dotnet,
}

impl Stack {
    /// All stacks.
    pub const ALL: [Stack; 5] = [
        Stack::Nodejs,
        Stack::Python,
        Stack::Go,
        Stack::Java,
        Stack::Dotnet,
    ];

    /// Lowercase name; the default catalog uses it as the file stem under `stacks/`.
    pub fn as_str(self) -> &'static str {
        match self {
            Stack::Nodejs => "nodejs",
            Stack::Python => "python",
            Stack::Go => "go",
            Stack::Java => "java",
            Stack::Dotnet => "dotnet",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stack::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Stack::ALL.iter().map(|st| st.as_str()).collect();
                format!("unknown stack: {s}. Available: {}", names.join(", "))
            })
    }
}

/// Columns joined into the searchable text, and columns echoed in results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Columns {
    /// Columns joined (space-separated) into each row's search text.
    pub search_cols: Vec<String>,
    /// Columns copied into each result, in this order.
    pub output_cols: Vec<String>,
}

impl Columns {
    fn new(search_cols: &[&str], output_cols: &[&str]) -> Self {
        Self {
            search_cols: search_cols.iter().map(|s| s.to_string()).collect(),
            output_cols: output_cols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A CSV file (relative to the data directory) and its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub file: PathBuf,
    #[serde(flatten)]
    pub columns: Columns,
}

impl TableSpec {
    fn new(file: &str, search_cols: &[&str], output_cols: &[&str]) -> Self {
        Self {
            file: PathBuf::from(file),
            columns: Columns::new(search_cols, output_cols),
        }
    }
}

/// Explicit lookup configuration handed to [`crate::Searcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Result cap used when a search does not pass one.
    pub max_results: usize,
    /// Ranking parameters shared by every search.
    pub params: Bm25Params,
    /// Table for each domain; a missing entry falls back to `security-rules`.
    pub domains: BTreeMap<Domain, TableSpec>,
    /// Stack guideline files; all share `stack_columns`.
    pub stacks: BTreeMap<Stack, PathBuf>,
    /// Search and output columns for every stack table.
    pub stack_columns: Columns,
}

/// On-disk shape: every key optional, merged over the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CatalogFile {
    max_results: Option<usize>,
    params: Option<Bm25Params>,
    domains: BTreeMap<String, TableSpec>,
    stacks: BTreeMap<String, PathBuf>,
    stack_columns: Option<Columns>,
}

pub const DEFAULT_MAX_RESULTS: usize = 3;

impl Default for CatalogConfig {
    fn default() -> Self {
        let domains = BTreeMap::from([
            (
                Domain::AuthMethods,
                TableSpec::new(
                    "auth-methods.csv",
                    &["Method", "Type", "Use Case", "Pros", "Cons"],
                    &[
                        "Method",
                        "Type",
                        "Security Level",
                        "Use Case",
                        "Pros",
                        "Cons",
                        "Implementation Complexity",
                        "Token Format",
                        "Session Storage",
                    ],
                ),
            ),
            (
                Domain::Oauth2Flows,
                TableSpec::new(
                    "oauth2-flows.csv",
                    &["Flow Name", "Grant Type", "Use Case", "Client Type"],
                    &[
                        "Flow Name",
                        "Grant Type",
                        "Use Case",
                        "Security Level",
                        "PKCE Required",
                        "Client Type",
                        "Redirect URI",
                        "Token Response",
                        "Refresh Token Support",
                        "Security Notes",
                    ],
                ),
            ),
            (
                Domain::JwtClaims,
                TableSpec::new(
                    "jwt-claims.csv",
                    &["Claim Name", "Claim Key", "Description", "Validation Rules"],
                    &[
                        "Claim Name",
                        "Claim Key",
                        "Type",
                        "Required",
                        "Description",
                        "Example Value",
                        "Validation Rules",
                        "Security Notes",
                    ],
                ),
            ),
            (
                Domain::SecurityHeaders,
                TableSpec::new(
                    "security-headers.csv",
                    &["Header Name", "Description", "Security Benefit"],
                    &[
                        "Header Name",
                        "Header Value",
                        "Priority",
                        "Description",
                        "Security Benefit",
                        "Implementation Notes",
                        "Browser Support",
                        "Common Mistakes",
                    ],
                ),
            ),
            (
                Domain::OidcProviders,
                TableSpec::new(
                    "oidc-providers.csv",
                    &["Provider", "Type", "Key Features", "Best For"],
                    &[
                        "Provider",
                        "Type",
                        "Free Tier",
                        "Pricing Model",
                        "Key Features",
                        "Best For",
                        "OAuth2 Support",
                        "OIDC Support",
                        "SAML Support",
                        "SDKs Available",
                        "Custom Domains",
                        "Multi-Factor Auth",
                        "User Store",
                        "Compliance",
                    ],
                ),
            ),
            (
                Domain::SecurityRules,
                TableSpec::new(
                    "security-rules.csv",
                    &["Category", "Rule", "Description", "Implementation"],
                    &[
                        "Rule ID",
                        "Category",
                        "Rule",
                        "Severity",
                        "Description",
                        "Implementation",
                        "Code Example",
                        "Mistake to Avoid",
                        "Testing Method",
                    ],
                ),
            ),
        ]);

        let stacks = Stack::ALL
            .into_iter()
            .map(|s| (s, PathBuf::from(format!("stacks/{}.csv", s.as_str()))))
            .collect();

        Self {
            max_results: DEFAULT_MAX_RESULTS,
            params: Bm25Params::default(),
            domains,
            stacks,
            stack_columns: Columns::new(
                &["Category", "Guideline", "Description", "Do", "Don't"],
                &[
                    "Category",
                    "Guideline",
                    "Description",
                    "Do",
                    "Don't",
                    "Code Example",
                    "Library",
                    "Severity",
                ],
            ),
        }
    }
}

impl CatalogConfig {
    /// Parse a TOML override and merge it over the defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let file: CatalogFile = toml::from_str(s)?;
        let mut cfg = Self::default();
        if let Some(n) = file.max_results {
            cfg.max_results = n;
        }
        if let Some(params) = file.params {
            params.validate()?;
            cfg.params = params;
        }
        for (name, spec) in file.domains {
            let domain = name.parse::<Domain>().map_err(Error::UnknownName)?;
            cfg.domains.insert(domain, spec);
        }
        for (name, path) in file.stacks {
            let stack = name.parse::<Stack>().map_err(Error::UnknownName)?;
            cfg.stacks.insert(stack, path);
        }
        if let Some(cols) = file.stack_columns {
            cfg.stack_columns = cols;
        }
        Ok(cfg)
    }

    /// Read and merge a TOML override file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Table backing `domain`.
    ///
    /// Domains removed from the map fall back to `security-rules`, then to the built-in spec.
    pub fn domain_table(&self, domain: Domain) -> TableSpec {
        self.domains
            .get(&domain)
            .or_else(|| self.domains.get(&Domain::SecurityRules))
            .cloned()
            .unwrap_or_else(|| Self::default().domains[&Domain::SecurityRules].clone())
    }

    /// Table backing `stack`, if configured.
    pub fn stack_table(&self, stack: Stack) -> Option<TableSpec> {
        self.stacks.get(&stack).map(|file| TableSpec {
            file: file.clone(),
            columns: self.stack_columns.clone(),
        })
    }
}
