//! Class list (DOMTokenList for the `class` attribute)

use std::fmt;

/// Ordered, duplicate-free set of class tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a space-separated `class` attribute value
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        for token in value.split_whitespace() {
            list.add(token);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add a token; returns false if it was already present
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Remove a token; returns true if it was present
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        before != self.tokens.len()
    }

    /// Toggle a token. With `force`, behaves like add/remove. Returns the new state.
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let present = match force {
            Some(present) => present,
            None => !self.contains(token),
        };
        if present {
            self.add(token);
        } else {
            self.remove(token);
        }
        present
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dedups() {
        let list = ClassList::parse("sr-only  sr-only visually-hidden");
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_string(), "sr-only visually-hidden");
    }

    #[test]
    fn test_toggle_force() {
        let mut list = ClassList::new();
        assert!(list.toggle("dark", Some(true)));
        assert!(list.toggle("dark", Some(true)));
        assert_eq!(list.len(), 1);

        assert!(!list.toggle("dark", Some(false)));
        assert!(list.is_empty());

        assert!(list.toggle("dark", None));
        assert!(!list.toggle("dark", None));
    }
}
