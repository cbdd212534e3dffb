use anaglyph_input::Action;
use anaglyph_scene::MANY_BOXES;
use winit::keyboard::KeyCode;

/// Default key bindings.
pub fn action_for(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::Space => Action::ToggleOrbit,
        KeyCode::KeyR => Action::ResetCamera,
        KeyCode::KeyM => Action::CycleStereoMode,
        KeyCode::Comma => Action::DecreaseIpd,
        KeyCode::Period => Action::IncreaseIpd,
        KeyCode::Digit1 => Action::SetBoxCount(1),
        KeyCode::Digit0 => Action::SetBoxCount(MANY_BOXES),
        KeyCode::ArrowUp => Action::OrbitUp,
        KeyCode::ArrowDown => Action::OrbitDown,
        KeyCode::ArrowLeft => Action::OrbitLeft,
        KeyCode::ArrowRight => Action::OrbitRight,
        KeyCode::Escape => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Resolve a key event to an action, dropping repeats of one-shot actions.
pub fn action_for_event(key: KeyCode, repeat: bool) -> Option<Action> {
    action_for(key).filter(|action| !repeat || action.accepts_repeat())
}
