//! `/v1/terminal/*`: in-person payment hardware.

pub mod locations;
