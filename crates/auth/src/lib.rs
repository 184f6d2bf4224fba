//! `supplyline-auth` — accounts, roles, password digests, and HS256 access
//! tokens.

pub mod password;
pub mod role;
pub mod token;
pub mod user;

pub use role::Role;
pub use token::{Claims, TokenCodec, DEFAULT_TTL_HOURS};
pub use user::{NewUser, User, UserProfile};
