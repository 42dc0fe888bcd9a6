//! Repository functions: one function per database operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! Plain SQL with no business logic or domain types.

pub mod workflows;
