//! Bearer-token verification. Tokens are issued elsewhere; this service only
//! checks them and scopes every request to the caller's user id.

mod claims;
pub(crate) mod extractors;
