// Synthetic key presses through enigo.

use anyhow::{Context, Result};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use zone_trigger::core_modules::interfaces::{ActionEmitter, CollaboratorError};

pub struct KeyPresser {
    enigo: Enigo,
    key: Key,
}

impl KeyPresser {
    pub fn new(key: Key) -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("key injector unavailable")?;
        Ok(Self { enigo, key })
    }
}

impl ActionEmitter for KeyPresser {
    fn press(&mut self) -> Result<(), CollaboratorError> {
        self.enigo.key(self.key, Direction::Click)?;
        Ok(())
    }
}

/// Parses a `--key` value: a named key or any single character.
pub fn parse_key(name: &str) -> Result<Key, String> {
    let key = match name.to_ascii_lowercase().as_str() {
        "space" => Key::Space,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c),
                _ => return Err(format!("unknown key `{name}`")),
            }
        }
    };
    Ok(key)
}
