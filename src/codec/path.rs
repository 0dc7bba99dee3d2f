//! Attribute paths for diagnostics

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Attribute(String),
    Index(usize),
    Key(String),
}

/// Location of a node inside a model, rendered as `spec.ipAddresses[0].node`
/// with map keys as `labels["app"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePath {
    steps: Vec<Step>,
}

impl AttributePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn attribute(&self, name: &str) -> Self {
        self.push(Step::Attribute(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.push(Step::Index(index))
    }

    pub fn key(&self, key: &str) -> Self {
        self.push(Step::Key(key.to_string()))
    }

    fn push(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Attribute(name) if i == 0 => f.write_str(name)?,
                Step::Attribute(name) => write!(f, ".{}", name)?,
                Step::Index(index) => write!(f, "[{}]", index)?,
                Step::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}
