//! Text capture devices for touch input.
//!
//! On touch screens there is no hardware keyboard to listen to, so the scene
//! keeps an invisible text field around and focuses it when the render
//! surface is tapped. The field's value then replaces the typed text as a
//! whole on every change.

/// An external text field the scene can focus and read.
pub trait TextCapture
{
        fn value(&self) -> String;

        /// Raises the field, enables pointer events on it and focuses it so
        /// the on-screen keyboard appears.
        fn activate(&mut self);

        fn is_active(&self) -> bool;
}

/// In-memory capture used on native targets and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryCapture
{
        value: String,
        active: bool,
        activations: u32,
}

impl MemoryCapture
{
        pub fn new() -> Self
        {
                Self::default()
        }

        /// Simulates the user editing the field; returns the new value as the
        /// field would report it in its change notification.
        pub fn set_value(
                &mut self,
                value: impl Into<String>,
        ) -> String
        {
                self.value = value.into();
                self.value.clone()
        }

        pub fn activations(&self) -> u32
        {
                self.activations
        }
}

impl TextCapture for MemoryCapture
{
        fn value(&self) -> String
        {
                self.value.clone()
        }

        fn activate(&mut self)
        {
                self.active = true;
                self.activations += 1;
        }

        fn is_active(&self) -> bool
        {
                self.active
        }
}

#[cfg(target_arch = "wasm32")]
pub use web::HiddenInput;

#[cfg(target_arch = "wasm32")]
mod web
{
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;
        use winit::event_loop::EventLoopProxy;

        use super::TextCapture;
        use crate::engine::AppEvent;

        const HIDDEN_STYLE: &str = "position: absolute; top: 0; left: 0; width: 100%; height: 100%; \
                opacity: 0; background: transparent; border: none; color: transparent; outline: none; \
                pointer-events: none;";

        /// An invisible `<input>` laid over the canvas. Its `input` events are
        /// forwarded to the event loop as [`AppEvent::VirtualInput`].
        pub struct HiddenInput
        {
                element: web_sys::HtmlInputElement,
                on_input: Closure<dyn FnMut(web_sys::Event)>,
                active: bool,
        }

        impl HiddenInput
        {
                pub fn attach(proxy: EventLoopProxy<AppEvent>) -> anyhow::Result<Self>
                {
                        let document = web_sys::window()
                                .and_then(|w| w.document())
                                .ok_or_else(|| anyhow::anyhow!("No document to attach the hidden input to"))?;

                        let element: web_sys::HtmlInputElement = document
                                .create_element("input")
                                .map_err(|e| anyhow::anyhow!("Failed to create input: {:?}", e))?
                                .dyn_into()
                                .map_err(|_| anyhow::anyhow!("Created element is not an input"))?;

                        element.set_type("text");
                        element.style().set_css_text(HIDDEN_STYLE);

                        document.body()
                                .ok_or_else(|| anyhow::anyhow!("Document has no body"))?
                                .append_child(&element)
                                .map_err(|e| anyhow::anyhow!("Failed to append input: {:?}", e))?;

                        let source = element.clone();

                        let on_input = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
                                if proxy.send_event(AppEvent::VirtualInput(source.value())).is_err()
                                {
                                        log::warn!("Event loop closed, dropping virtual input");
                                }
                        });

                        element.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())
                                .map_err(|e| anyhow::anyhow!("Failed to listen for input: {:?}", e))?;

                        Ok(Self {
                                element,
                                on_input,
                                active: false,
                        })
                }
        }

        impl TextCapture for HiddenInput
        {
                fn value(&self) -> String
                {
                        self.element.value()
                }

                fn activate(&mut self)
                {
                        let style = self.element.style();

                        if style.set_property("pointer-events", "auto").is_err()
                                || style.set_property("z-index", "2").is_err()
                        {
                                log::warn!("Failed to raise the hidden input");
                        }

                        if self.element.focus().is_err()
                        {
                                log::warn!("Failed to focus the hidden input");
                        }

                        self.active = true;
                        log::info!("focused");
                }

                fn is_active(&self) -> bool
                {
                        self.active
                }
        }

        impl Drop for HiddenInput
        {
                fn drop(&mut self)
                {
                        let _ = self
                                .element
                                .remove_event_listener_with_callback("input", self.on_input.as_ref().unchecked_ref());
                        self.element.remove();
                }
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn memory_capture_tracks_focus_and_value()
        {
                let mut capture = MemoryCapture::new();
                assert!(!capture.is_active());

                capture.activate();
                capture.activate();

                assert!(capture.is_active());
                assert_eq!(capture.activations(), 2);
                assert_eq!(capture.set_value("Ana"), "Ana");
                assert_eq!(capture.value(), "Ana");
        }
}
