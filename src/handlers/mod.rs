//! HTTP handlers for host CRUD.

pub mod hosts;
pub use hosts::*;
