//! Entry-point target references: `module.path:attr.path [extra, ...]`.

use std::fmt;

use crate::error::{Error, Result};

/// Where an entry point's implementation lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointTarget {
    /// Dotted module path.
    pub module: String,
    /// Dotted attribute path inside the module, if any.
    pub attr: Option<String>,
    /// Extras listed after the reference.
    pub extras: Vec<String>,
}

impl EntryPointTarget {
    pub fn parse(target: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidTarget {
            target: target.to_string(),
            reason: reason.to_string(),
        };

        let (reference, extras) = match target.split_once('[') {
            Some((reference, rest)) => {
                let inner = rest
                    .trim_end()
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("unclosed extras"))?;
                let extras = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect();
                (reference.trim(), extras)
            }
            None => (target.trim(), Vec::new()),
        };

        let (module, attr) = match reference.split_once(':') {
            Some((module, attr)) => (module.trim(), Some(attr.trim())),
            None => (reference, None),
        };

        if !is_dotted_path(module) {
            return Err(invalid("module must be a dotted identifier path"));
        }
        if let Some(attr) = attr {
            if !is_dotted_path(attr) {
                return Err(invalid("attribute must be a dotted identifier path"));
            }
        }

        Ok(Self {
            module: module.to_string(),
            attr: attr.map(str::to_string),
            extras,
        })
    }
}

impl fmt::Display for EntryPointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module)?;
        if let Some(attr) = &self.attr {
            write!(f, ":{attr}")?;
        }
        if !self.extras.is_empty() {
            write!(f, " [{}]", self.extras.join(", "))?;
        }
        Ok(())
    }
}

fn is_dotted_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}
