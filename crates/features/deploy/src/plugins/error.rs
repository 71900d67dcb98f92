use std::borrow::Cow;

#[envcfg_derive::envcfg_error]
pub enum PluginError {
    /// The identifier is empty or otherwise unusable.
    #[error("Invalid plugin identifier{}: {message}", format_context(.context))]
    InvalidIdentifier { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The plugin is not installed on this host.
    #[error("Plugin not installed{}: {message}", format_context(.context))]
    NotInstalled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
