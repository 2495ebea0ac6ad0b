// Session-call codec
//
// The device's `/cgi` endpoint takes a batch of "acts" (object + operation +
// field list) in a compact bracketed text syntax and answers in the same
// line-oriented style. This module is purely syntactic: every value stays a
// string, coercion happens in `models`.

pub mod reply;
pub mod request;

pub use reply::{ParamObject, Reply};
pub use request::{Act, ActKind, DEFAULT_STACK, encode_acts, query_string};
