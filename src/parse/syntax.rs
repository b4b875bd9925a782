use std::fmt;

use crate::Rule;

/// A literal or call expression as written in configuration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<Node>),
    Call(Call),
    /// `receiver.name(args)`, e.g. `porttest("x").needs(smp4=True)`.
    Method { receiver: Box<Node>, call: Call },
}

/// `name(arg, key=value, ...)`. Arguments keep their source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub(crate) name: String,
    pub(crate) args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Arg {
    pub(crate) keyword: Option<String>,
    pub(crate) value: Node,
}

impl Node {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Node::Str(_) => "string",
            Node::Bool(_) => "boolean",
            Node::Int(_) => "integer",
            Node::List(_) => "list",
            Node::Call(_) => "call",
            Node::Method { .. } => "method call",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Str(s) => write!(f, "{s:?}"),
            Node::Bool(true) => write!(f, "True"),
            Node::Bool(false) => write!(f, "False"),
            Node::Int(i) => write!(f, "{i}"),
            Node::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Node::Call(call) => write!(f, "{call}"),
            Node::Method { receiver, call } => write!(f, "{receiver}.{call}"),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if let Some(keyword) = &arg.keyword {
                write!(f, "{keyword}=")?;
            }
            write!(f, "{}", arg.value)?;
        }
        write!(f, ")")
    }
}

/// The rules of one configuration text, in source order.
///
/// Includes are kept as [`Rule::Include`]; the [`Loader`](crate::Loader)
/// expands them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfig {
    pub rules: Vec<Rule>,
}
