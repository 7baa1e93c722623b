use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, ModifiersState, NamedKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind
{
        Backspace,
        Enter,
        /// The text a key produces, as reported by the platform.
        Character(String),
        Other,
}

/// A key press with the modifier state at the time it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput
{
        pub key: KeyKind,
        pub ctrl: bool,
        pub meta: bool,
        pub alt: bool,
}

/// What a key press does to the typed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit
{
        Append(char),
        RemoveLast,
        /// Handled, but changes nothing.
        Consume,
        Ignore,
}

impl KeyInput
{
        pub fn new(key: KeyKind) -> Self
        {
                Self {
                        key,
                        ctrl: false,
                        meta: false,
                        alt: false,
                }
        }

        pub fn character(text: &str) -> Self
        {
                Self::new(KeyKind::Character(text.to_string()))
        }

        pub fn with_modifiers(
                mut self,
                modifiers: ModifiersState,
        ) -> Self
        {
                self.ctrl = modifiers.control_key();
                self.meta = modifiers.super_key();
                self.alt = modifiers.alt_key();
                self
        }

        /// Translates a winit key event. Releases yield `None`; auto-repeat
        /// presses are kept.
        pub fn from_winit(
                event: &KeyEvent,
                modifiers: ModifiersState,
        ) -> Option<Self>
        {
                if event.state != ElementState::Pressed
                {
                        return None;
                }

                Some(Self::from_logical_key(&event.logical_key).with_modifiers(modifiers))
        }

        pub fn from_logical_key(key: &Key) -> Self
        {
                let kind = match key
                {
                        Key::Named(NamedKey::Backspace) => KeyKind::Backspace,
                        Key::Named(NamedKey::Enter) => KeyKind::Enter,
                        Key::Named(NamedKey::Space) => KeyKind::Character(" ".to_string()),
                        Key::Character(text) => KeyKind::Character(text.to_string()),
                        _ => KeyKind::Other,
                };

                Self::new(kind)
        }

        pub fn has_command_modifier(&self) -> bool
        {
                self.ctrl || self.meta || self.alt
        }

        pub fn edit(&self) -> TextEdit
        {
                match &self.key
                {
                        KeyKind::Backspace => TextEdit::RemoveLast,
                        KeyKind::Enter => TextEdit::Consume,
                        KeyKind::Character(text) if !self.has_command_modifier() =>
                        {
                                let mut chars = text.chars();

                                match (chars.next(), chars.next())
                                {
                                        (Some(ch), None) => TextEdit::Append(ch),
                                        _ => TextEdit::Ignore,
                                }
                        }
                        _ => TextEdit::Ignore,
                }
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn printable_key_appends()
        {
                assert_eq!(KeyInput::character("a").edit(), TextEdit::Append('a'));
                assert_eq!(KeyInput::character("é").edit(), TextEdit::Append('é'));
        }

        #[test]
        fn modified_keys_are_ignored()
        {
                let ctrl_c = KeyInput::character("c").with_modifiers(ModifiersState::CONTROL);
                let cmd_v = KeyInput::character("v").with_modifiers(ModifiersState::SUPER);
                let alt_x = KeyInput::character("x").with_modifiers(ModifiersState::ALT);

                assert_eq!(ctrl_c.edit(), TextEdit::Ignore);
                assert_eq!(cmd_v.edit(), TextEdit::Ignore);
                assert_eq!(alt_x.edit(), TextEdit::Ignore);
        }

        #[test]
        fn shift_does_not_block_typing()
        {
                let upper = KeyInput::character("A").with_modifiers(ModifiersState::SHIFT);

                assert_eq!(upper.edit(), TextEdit::Append('A'));
        }

        #[test]
        fn named_keys_map_to_policy()
        {
                assert_eq!(KeyInput::from_logical_key(&Key::Named(NamedKey::Backspace)).edit(), TextEdit::RemoveLast);
                assert_eq!(KeyInput::from_logical_key(&Key::Named(NamedKey::Enter)).edit(), TextEdit::Consume);
                assert_eq!(KeyInput::from_logical_key(&Key::Named(NamedKey::Space)).edit(), TextEdit::Append(' '));
                assert_eq!(KeyInput::from_logical_key(&Key::Named(NamedKey::ArrowLeft)).edit(), TextEdit::Ignore);
                assert_eq!(KeyInput::from_logical_key(&Key::Named(NamedKey::F1)).edit(), TextEdit::Ignore);
        }

        #[test]
        fn multi_char_text_is_ignored()
        {
                assert_eq!(KeyInput::from_logical_key(&Key::Character("ab".into())).edit(), TextEdit::Ignore);
        }
}
