pub mod claims_path;
pub mod credential;
pub mod credential_format;
pub mod credential_query_meta;
pub mod dcql_query;
pub mod object;
