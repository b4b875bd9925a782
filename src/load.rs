use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::source::ConfigSource;
use crate::{Document, LoadError, Rule};

/// Loads a named configuration and flattens its includes.
///
/// Includes are expanded depth-first, in place, using an explicit stack of
/// open configs rather than recursion. A config already on that stack is a
/// cycle. Parsed configs are cached by canonical name for the duration of one
/// [`load`](Self::load) call only.
#[derive(Debug, Clone)]
pub struct Loader<S> {
    source: S,
}

/// An open config: its rules and the index of the next one to emit.
struct Frame {
    name: String,
    rules: Rc<[Rule]>,
    next: usize,
}

type ParseCache = HashMap<String, Rc<[Rule]>>;

impl<S: ConfigSource> Loader<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load `name` and every config it includes into one flat [`Document`].
    ///
    /// # Errors
    ///
    /// - [`LoadError::ConfigNotFound`] if `name` or a non-optional include
    ///   does not exist.
    /// - [`LoadError::Parse`] if any loaded config is malformed.
    /// - [`LoadError::CyclicInclude`] if an include chain revisits a config.
    /// - [`LoadError::Io`] if a config exists but cannot be read.
    pub fn load(&self, name: &str) -> Result<Document, LoadError> {
        let root = self.source.resolve_name(name, None);
        let mut cache = ParseCache::new();

        let rules = self
            .read_rules(&root, &mut cache)?
            .ok_or_else(|| LoadError::ConfigNotFound { name: root.clone() })?;

        let mut stack = vec![Frame {
            name: root.clone(),
            rules,
            next: 0,
        }];
        let mut flat = Vec::new();

        while let Some(frame) = stack.last_mut() {
            let rules = Rc::clone(&frame.rules);
            let index = frame.next;
            frame.next += 1;

            let include = match rules.get(index) {
                None => {
                    stack.pop();
                    continue;
                }
                Some(Rule::Include(include)) => include,
                Some(rule) => {
                    flat.push(rule.clone());
                    continue;
                }
            };

            let parent = frame.name.clone();
            let target = self.source.resolve_name(&include.target, Some(&parent));

            if let Some(pos) = stack.iter().position(|f| f.name == target) {
                let mut path: Vec<String> = stack[pos..].iter().map(|f| f.name.clone()).collect();
                path.push(target);
                return Err(LoadError::CyclicInclude { path });
            }

            match self.read_rules(&target, &mut cache)? {
                Some(rules) => {
                    debug!(config = %target, from = %parent, "including config");
                    stack.push(Frame {
                        name: target,
                        rules,
                        next: 0,
                    });
                }
                None if include.optional => {
                    debug!(config = %target, from = %parent, "skipping missing optional include");
                }
                None => return Err(LoadError::ConfigNotFound { name: target }),
            }
        }

        debug!(config = %root, rules = flat.len(), "config loaded");
        Ok(Document::new(root, flat))
    }

    fn read_rules(
        &self,
        name: &str,
        cache: &mut ParseCache,
    ) -> Result<Option<Rc<[Rule]>>, LoadError> {
        if let Some(rules) = cache.get(name) {
            trace!(config = %name, "parse cache hit");
            return Ok(Some(Rc::clone(rules)));
        }

        debug!(config = %name, "reading config");
        let text = self.source.read(name).map_err(|source| LoadError::Io {
            name: name.to_owned(),
            source,
        })?;
        let Some(text) = text else {
            return Ok(None);
        };

        let parsed = crate::parse::parse(&text).map_err(|source| LoadError::Parse {
            config: name.to_owned(),
            source,
        })?;
        let rules: Rc<[Rule]> = parsed.rules.into();
        cache.insert(name.to_owned(), Rc::clone(&rules));
        Ok(Some(rules))
    }
}
