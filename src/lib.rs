//! This library provides a Rust implementation of the Digital Credentials
//! Query Language (DCQL) defined by [OID4VP 1.0], from the wallet's side:
//! parsing a query and selecting, among the credentials a wallet holds, those
//! that satisfy it.
//!
//! [OID4VP 1.0]: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-6>
//!
//! # Usage
//!
//! ```
//! use dcql_matcher::{
//!     core::credential::RawCredential, matcher::DcqlMatcher, parser::DcqlParser,
//! };
//! use serde_json::json;
//!
//! let query = DcqlParser::parse(
//!     r#"{
//!         "credentials": [{
//!             "id": "pid",
//!             "format": "dc+sd-jwt",
//!             "meta": { "vct_values": ["https://credentials.example.com/identity_credential"] },
//!             "claims": [{ "path": ["given_name"] }]
//!         }]
//!     }"#,
//! )?;
//!
//! let credentials = vec![RawCredential::new(
//!     "cred-1",
//!     "dc+sd-jwt",
//!     json!({
//!         "vct": "https://credentials.example.com/identity_credential",
//!         "given_name": "Alice"
//!     }),
//! )];
//!
//! let matches = DcqlMatcher::default().match_credentials(&query, &credentials)?;
//! assert_eq!(matches["pid"][0].id(), "cred-1");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Query Language
//!
//! A DCQL query is a list of Credential Queries, each naming a credential
//! format, format-specific `meta` constraints and the claims requested from
//! the credential. Optional `claim_sets` and `credential_sets` express
//! alternatives:
//! - `claim_sets`: alternative combinations of claims within one credential,
//!   the first satisfiable one is used.
//! - `credential_sets`: alternative combinations of Credential Queries, some
//!   of which may be required.
//!
//! The query model lives in [`core::dcql_query`], and is built by the
//! [`parser::DcqlParser`] which interprets each `meta` object in the context
//! of its format (see [`core::credential_query_meta`]).
//!
//! # Credential Formats
//!
//! The formats defined in OID4VP v1.0 Appendix B are recognized:
//! - **JWT VC** (`jwt_vc_json`) and **LDP VC** (`ldp_vc`): `meta.type_values`
//! - **SD-JWT VC** (`dc+sd-jwt`, legacy `vc+sd-jwt`): `meta.vct_values`
//! - **mso_mdoc** (`mso_mdoc`): `meta.doctype_value`
//!
//! Other format identifiers are carried verbatim, with their `meta` treated as
//! a set of top-level claims the credential must hold.
//!
//! # Matching
//!
//! [`matcher::DcqlMatcher`] evaluates a query against a slice of
//! [`core::credential::RawCredential`]s, whose claims are addressed with the
//! claims path pointers of [`core::claims_path`]. Its behavior can be tuned
//! with a [`config::MatcherConfig`].
pub mod config;
pub mod core;
pub mod matcher;
pub mod parser;
pub mod utils;

pub use config::MatcherConfig;
pub use matcher::{DcqlMatchResult, DcqlMatcher, MatchError};
pub use parser::{DcqlParser, ParseError};
