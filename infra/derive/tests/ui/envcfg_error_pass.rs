use envcfg_derive::envcfg_error;
use std::borrow::Cow;

#[envcfg_error]
pub enum ProbeError {
    #[error("Probe IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal probe error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {}
