//! Types shared between the submission core and the desktop shell.

pub mod domain;
pub mod protocol;
