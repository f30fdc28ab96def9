use serde::{Deserialize, Serialize};

/// An NPC's lines, read one at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dialogue {
    lines: Vec<String>,
    #[serde(skip)]
    cursor: usize,
}

impl Dialogue {
    /// A dialogue made of `lines`, in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: 0,
        }
    }

    /// The next unread line, or `None` once every line was read.
    pub fn advance(&mut self) -> Option<&str> {
        let line = self.lines.get(self.cursor)?;
        self.cursor += 1;
        Some(line)
    }

    /// Returns true once every line was read.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.lines.len()
    }

    /// Returns true if no line was read yet.
    pub fn is_unread(&self) -> bool {
        self.cursor == 0
    }

    /// Every line of the dialogue.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// What the guide says before disappearing into the forest.
pub fn guide_lines() -> Vec<String> {
    [
        "Hey, you! Hunters came down from the summit last night.",
        "They took your family up the mountain path.",
        "You will need a weapon and something to eat before you go.",
        "A Shadow guards the pass. Beat it, then reach the summit.",
        "I must warn the others. Good luck.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_reads_in_order() {
        let mut d = Dialogue::new(["one", "two"]);
        assert!(d.is_unread());
        assert_eq!(d.advance(), Some("one"));
        assert!(!d.is_finished());
        assert_eq!(d.advance(), Some("two"));
        assert!(d.is_finished());
        assert_eq!(d.advance(), None);
    }

    #[test]
    fn empty_dialogue_is_finished() {
        let mut d = Dialogue::default();
        assert!(d.is_finished());
        assert_eq!(d.advance(), None);
    }
}
