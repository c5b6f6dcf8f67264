//! Owner-scoped data access. Every read and write is keyed by the requesting
//! user's id; rows owned by someone else resolve as absent, never as
//! forbidden, so ids cannot be enumerated across accounts.

pub mod projects;
pub mod tasks;
pub mod users;
