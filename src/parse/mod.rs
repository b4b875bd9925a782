mod error;
mod grammar;
mod lower;
mod syntax;

pub use error::ParseError;
pub use syntax::ParsedConfig;

/// Parse configuration text into its rules, in source order.
///
/// Includes are returned unexpanded; use [`Loader`](crate::Loader) to follow
/// them.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not valid syntax or a rule has an
/// unknown kind, a missing argument or an argument of the wrong type.
pub fn parse(input: &str) -> Result<ParsedConfig, ParseError> {
    use winnow::Parser;
    let nodes = grammar::config
        .parse(input)
        .map_err(|e| ParseError::syntax(e.to_string()))?;
    let rules = lower::lower(nodes)?;
    Ok(ParsedConfig { rules })
}
