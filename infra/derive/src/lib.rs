#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the envcfg workspace.
//!
//! Only one macro lives here today: [`envcfg_error`], which turns a plain enum
//! into the error shape every crate in the workspace uses.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # Features
///
/// * **Derives**: injects `Debug` and `thiserror::Error` unless already derived.
/// * **Context**: generates a companion `<Name>Ext` trait with `.context(...)` for
///   `Result<T, Name>` and for `Result<T, Source>` of every wrapped source error.
/// * **Conversions**: `From<Source>` for each variant with a `source` field, enabling `?`.
/// * **Internal fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Formatting**: a private `format_context` helper for use in `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Every variant uses named fields.
/// 3. A variant with a source error must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use envcfg_derive::envcfg_error;
/// use std::borrow::Cow;
///
/// #[envcfg_error]
/// pub enum PluginError {
///     #[error("Invalid plugin identifier{}: {message}", format_context(.context))]
///     InvalidIdentifier { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal plugin error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn envcfg_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
