// Global keyboard polling. `P` toggles the trigger, `Alt+P` exits.

use device_query::{DeviceQuery, DeviceState, Keycode};
use zone_trigger::core_modules::interfaces::HotkeyPoller;

pub const TOGGLE_HINT: &str = "P";
pub const EXIT_HINT: &str = "Alt+P";

pub struct KeyboardHotkeys {
    device: DeviceState,
}

impl KeyboardHotkeys {
    pub fn new() -> Self {
        Self {
            device: DeviceState::new(),
        }
    }

    fn sample(&self) -> (bool, bool) {
        let keys = self.device.get_keys();
        let p = keys.contains(&Keycode::P);
        let alt = keys.iter().any(|key| matches!(key, Keycode::LAlt | Keycode::RAlt));
        (p, alt)
    }
}

impl HotkeyPoller for KeyboardHotkeys {
    fn toggle_held(&mut self) -> bool {
        let (p, alt) = self.sample();
        p && !alt
    }

    fn exit_held(&mut self) -> bool {
        let (p, alt) = self.sample();
        p && alt
    }
}
