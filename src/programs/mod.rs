//! Sample business logic expressed as computations

pub mod multiplier;
pub mod request;

pub use multiplier::{multiplier, multiplier_inspect, simple_call_cc, ZERO_PRODUCT};
pub use request::{handle_request, handle_request_without_db, response, valid_cookie, Request};
