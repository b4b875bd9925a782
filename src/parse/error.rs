use thiserror::Error;

/// Errors produced when parsing configuration text into rules.
///
/// `rule` fields hold the offending rule rendered back in source syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("expected a rule, found {found}")]
    NotARule { found: String },

    #[error("unknown rule kind '{kind}' in {rule}")]
    UnknownRule { rule: String, kind: String },

    #[error("missing required argument '{argument}' in {rule}")]
    MissingArgument { rule: String, argument: &'static str },

    #[error("unexpected argument '{argument}' in {rule}")]
    UnexpectedArgument { rule: String, argument: String },

    #[error("argument '{argument}' given more than once in {rule}")]
    DuplicateArgument { rule: String, argument: String },

    #[error("too many positional arguments in {rule} (at most {max})")]
    TooManyArguments { rule: String, max: usize },

    #[error("argument '{argument}' in {rule} must be {expected}")]
    TypeMismatch {
        rule: String,
        argument: &'static str,
        expected: &'static str,
    },

    #[error("'projects' must not be empty in {rule}")]
    EmptyProjects { rule: String },

    #[error("unknown test kind '{kind}' in {rule}")]
    UnknownTest { rule: String, kind: String },
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }
}
