use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    /// Unit-length pan direction in screen axes (y-down).
    pub fn pan_direction(&self) -> (f32, f32) {
        let axis = |negative: InputAction, positive: InputAction| -> f32 {
            match (self.is_down(negative), self.is_down(positive)) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            }
        };
        let x = axis(InputAction::PanLeft, InputAction::PanRight);
        let y = axis(InputAction::PanUp, InputAction::PanDown);
        let length = (x * x + y * y).sqrt();
        if length <= f32::EPSILON {
            return (0.0, 0.0);
        }
        (x / length, y / length)
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::PanUp => 0,
            InputAction::PanDown => 1,
            InputAction::PanLeft => 2,
            InputAction::PanRight => 3,
            InputAction::Quit => 4,
        }
    }

    pub fn from_physical_key(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::PanUp),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::PanDown),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::PanLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::PanRight),
            KeyCode::Escape => Some(InputAction::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrows_map_to_pan_actions() {
        let cases = [
            (KeyCode::KeyW, InputAction::PanUp),
            (KeyCode::ArrowUp, InputAction::PanUp),
            (KeyCode::KeyS, InputAction::PanDown),
            (KeyCode::ArrowLeft, InputAction::PanLeft),
            (KeyCode::KeyD, InputAction::PanRight),
            (KeyCode::Escape, InputAction::Quit),
        ];
        for (code, action) in cases {
            assert_eq!(
                InputAction::from_physical_key(PhysicalKey::Code(code)),
                Some(action),
                "code={code:?}"
            );
        }
        assert_eq!(
            InputAction::from_physical_key(PhysicalKey::Code(KeyCode::KeyQ)),
            None
        );
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let mut states = ActionStates::default();
        states.set(InputAction::PanLeft, true);
        states.set(InputAction::PanRight, true);
        assert_eq!(states.pan_direction(), (0.0, 0.0));

        states.set(InputAction::PanRight, false);
        assert_eq!(states.pan_direction(), (-1.0, 0.0));
    }

    #[test]
    fn diagonal_pan_is_normalized() {
        let mut states = ActionStates::default();
        states.set(InputAction::PanDown, true);
        states.set(InputAction::PanRight, true);
        let (x, y) = states.pan_direction();
        assert!((x - y).abs() < 0.0001);
        assert!(((x * x + y * y).sqrt() - 1.0).abs() < 0.0001);
        assert!(y > 0.0);
    }
}
