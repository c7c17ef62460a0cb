//! GraphQL HTTP client for the storefront front-end.
//!
//! This crate provides:
//! - Typed GraphQL operations and wire types.
//! - A reqwest-based transport with credential and retry policies.
//! - Multipart file-upload requests.
//! - Error logging for application and transport failures.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

mod client;
mod error;
mod operation;
mod retry;
mod upload;

pub use client::{CredentialPolicy, GraphqlClient, GraphqlClientBuilder, GraphqlClientConfig};
pub use error::{
    GraphqlClientError, GraphqlError, GraphqlErrorLocation, GraphqlPathSegment, HttpErrorInfo,
};
pub use operation::{GraphqlOperation, GraphqlRequest, GraphqlResponse};
pub use retry::{RetryDecision, RetryPolicy, RetryStrategy};
pub use upload::FileUpload;
