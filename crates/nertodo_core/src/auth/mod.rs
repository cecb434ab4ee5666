//! Credential helpers.

pub mod password;
