//! Credential source implementations
//!
//! A source owns the provider side of a rotation: it knows the original
//! credential pair, can mint a replacement, and can retire either pair.

mod aws_iam;
mod source;

pub use aws_iam::AwsIamSource;
pub use source::CredentialSource;
