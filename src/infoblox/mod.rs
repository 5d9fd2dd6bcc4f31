//! Client for the ESB gateway in front of Infoblox
//!
//! The gateway exposes a small REST surface for TXT records. Every call is
//! authenticated twice: HTTP Basic auth for Infoblox itself and a
//! subscription key header for the ESB.

mod client;
mod models;

pub use client::InfobloxClient;
pub use models::{
    Credentials, TxtRecord, TxtRecordRequestBody, CHALLENGE_TTL, DEFAULT_VIEW,
    SUBSCRIPTION_KEY_HEADER,
};
