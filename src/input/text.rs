use crate::input::keyboard::TextEdit;

/// The text the user has typed so far.
///
/// Length is counted in `char`s. Keyboard edits never grow it past
/// `max_len`; wholesale replacement from the virtual field is not capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedText
{
        value: String,
        max_len: usize,
        revision: u64,
}

impl TypedText
{
        pub fn new(
                initial: &str,
                max_len: usize,
        ) -> Self
        {
                Self {
                        value: initial.chars().take(max_len).collect(),
                        max_len,
                        revision: 0,
                }
        }

        pub fn value(&self) -> &str
        {
                &self.value
        }

        pub fn len(&self) -> usize
        {
                self.value.chars().count()
        }

        pub fn is_empty(&self) -> bool
        {
                self.value.is_empty()
        }

        pub fn max_len(&self) -> usize
        {
                self.max_len
        }

        /// Bumped on every change.
        pub fn revision(&self) -> u64
        {
                self.revision
        }

        /// Applies a keyboard edit. Returns whether the value changed.
        pub fn apply(
                &mut self,
                edit: TextEdit,
        ) -> bool
        {
                let changed = match edit
                {
                        TextEdit::Append(ch) =>
                        {
                                if self.len() < self.max_len
                                {
                                        self.value.push(ch);
                                        true
                                }
                                else
                                {
                                        false
                                }
                        }
                        TextEdit::RemoveLast => self.value.pop().is_some(),
                        TextEdit::Consume | TextEdit::Ignore => false,
                };

                if changed
                {
                        self.revision += 1;
                }

                changed
        }

        /// Replaces the value wholesale.
        pub fn replace(
                &mut self,
                value: impl Into<String>,
        ) -> bool
        {
                let value = value.into();

                if value == self.value
                {
                        return false;
                }

                if value.chars().count() > self.max_len
                {
                        log::debug!("Virtual field value exceeds {} characters", self.max_len);
                }

                self.value = value;
                self.revision += 1;
                true
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn append_stops_at_max_len()
        {
                let mut text = TypedText::new("abc", 4);

                assert!(text.apply(TextEdit::Append('d')));
                assert!(!text.apply(TextEdit::Append('e')));
                assert_eq!(text.value(), "abcd");
                assert_eq!(text.revision(), 1);
        }

        #[test]
        fn remove_last_on_empty_is_noop()
        {
                let mut text = TypedText::new("", 20);

                assert!(!text.apply(TextEdit::RemoveLast));
                assert_eq!(text.revision(), 0);
        }

        #[test]
        fn remove_last_drops_whole_char()
        {
                let mut text = TypedText::new("né", 20);

                assert!(text.apply(TextEdit::RemoveLast));
                assert_eq!(text.value(), "n");
        }

        #[test]
        fn length_counts_chars_not_bytes()
        {
                let mut text = TypedText::new("ééééé", 6);

                assert_eq!(text.len(), 5);
                assert!(text.apply(TextEdit::Append('é')));
                assert!(!text.apply(TextEdit::Append('é')));
        }

        #[test]
        fn replace_bypasses_cap()
        {
                let mut text = TypedText::new("Jesse", 20);
                let long = "x".repeat(30);

                assert!(text.replace(long.clone()));
                assert_eq!(text.value(), long);
                assert!(!text.replace(long));
        }

        #[test]
        fn initial_value_is_capped()
        {
                let text = TypedText::new("abcdef", 3);

                assert_eq!(text.value(), "abc");
        }
}
