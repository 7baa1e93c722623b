//! Input bridge: hardware keyboard and the virtual text field both end up
//! as mutations of one [`TypedText`].

pub mod capture;
pub mod keyboard;
pub mod text;

pub use capture::{MemoryCapture, TextCapture};
pub use keyboard::{KeyInput, KeyKind, TextEdit};
pub use text::TypedText;

/// Which input listeners the scene currently has installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerSet
{
        pub keyboard: bool,
        pub resize: bool,
        pub pointer: bool,
        pub virtual_input: bool,
}

impl ListenerSet
{
        pub fn all() -> Self
        {
                Self {
                        keyboard: true,
                        resize: true,
                        pointer: true,
                        virtual_input: true,
                }
        }

        pub fn none() -> Self
        {
                Self::default()
        }

        pub fn any(&self) -> bool
        {
                self.keyboard || self.resize || self.pointer || self.virtual_input
        }
}
