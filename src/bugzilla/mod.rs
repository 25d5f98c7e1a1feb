//! Types and access for the remote Bugzilla instance.

pub mod buglist;
pub mod client;
pub mod detail;
pub mod query;
