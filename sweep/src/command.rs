//! Command templates with a single `{value}` slot

use std::fmt;

/// Placeholder substituted with the sweep parameter
pub const SLOT: &str = "{value}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Expand the slot for one sweep point. The template is not validated.
    pub fn expand(&self, value: u64) -> String {
        self.0.replace(SLOT, &value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand() {
        let t = CommandTemplate::new("lra-simulator --range=30 --nodes=30 --speed={value}");
        assert_eq!(t.expand(16), "lra-simulator --range=30 --nodes=30 --speed=16");
    }

    #[test]
    fn test_template_without_slot_is_passed_through() {
        let t = CommandTemplate::new("lra-simulator --nodes=4");
        assert_eq!(t.expand(8), "lra-simulator --nodes=4");
    }
}
