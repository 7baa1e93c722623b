use colored::*;

use crate::utils::random::get_random_u128;

const MESSAGES: [(&str, Color); 8] = [
        ("The cursor stopped blinking.", Color::Red),
        ("Every field has been cleared.", Color::Magenta),
        ("The input lost focus for good.", Color::Yellow),
        ("Backspace was held down until nothing was left.", Color::Cyan),
        ("The form was submitted to the void.", Color::Green),
        ("All glyphs have been un-extruded.", Color::Blue),
        ("The last keystroke has been rendered.", Color::BrightRed),
        ("Name received. Goodbye.", Color::BrightYellow),
];

pub fn get_exit_message(config: &crate::config::Config) -> String
{
        if !config.show_exit_message
        {
                return String::new();
        }

        // A failing RNG just means a predictable farewell.
        let choice = get_random_u128(MESSAGES.len() as u128).unwrap_or(0) as usize;

        let (message, color) = MESSAGES[choice % MESSAGES.len()];

        message.color(color).to_string()
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::config::Config;

        #[test]
        fn disabled_message_is_empty()
        {
                let config = Config {
                        show_exit_message: false,
                        ..Default::default()
                };

                assert!(get_exit_message(&config).is_empty());
        }

        #[test]
        fn enabled_message_is_one_of_the_known_lines()
        {
                let message = get_exit_message(&Config::default());

                assert!(MESSAGES.iter().any(|(text, _)| message.contains(text)));
        }
}
