//! Request authorization primitives.

pub mod ip;
