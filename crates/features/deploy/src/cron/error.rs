use std::borrow::Cow;

#[envcfg_derive::envcfg_error]
pub enum SchedulerError {
    /// Scheduling needs a running tokio runtime.
    #[error("Scheduler runtime error{}: {message}", format_context(.context))]
    Runtime { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The hook already has a pending event; clear it first.
    #[error("Hook already scheduled{}: {message}", format_context(.context))]
    AlreadyScheduled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
