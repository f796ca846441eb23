//! Session-token types for the MOREA dashboard: JWT claims carrying the
//! user's role names, and the HTTP-only cookie that transports them.

pub mod cookie;
pub mod token;
