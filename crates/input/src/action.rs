/// A high-level action produced by the keyboard surface.
///
/// The application state consumes actions, never raw key events, so any
/// windowing layer can drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start or stop the automatic orbit.
    ToggleOrbit,
    /// Return the camera to its home pose.
    ResetCamera,
    /// None → Toe-in → Asymmetric → None.
    CycleStereoMode,
    DecreaseIpd,
    IncreaseIpd,
    /// Regenerate the scene with this many boxes.
    SetBoxCount(usize),
    OrbitUp,
    OrbitDown,
    OrbitLeft,
    OrbitRight,
    /// End the main loop.
    Quit,
}

impl Action {
    /// Whether holding the key keeps firing this action.
    pub fn accepts_repeat(self) -> bool {
        matches!(
            self,
            Action::DecreaseIpd
                | Action::IncreaseIpd
                | Action::OrbitUp
                | Action::OrbitDown
                | Action::OrbitLeft
                | Action::OrbitRight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_actions_repeat() {
        assert!(Action::IncreaseIpd.accepts_repeat());
        assert!(Action::OrbitLeft.accepts_repeat());
    }

    #[test]
    fn toggles_fire_once() {
        for action in [
            Action::ToggleOrbit,
            Action::ResetCamera,
            Action::CycleStereoMode,
            Action::SetBoxCount(1),
            Action::Quit,
        ] {
            assert!(!action.accepts_repeat(), "{action:?}");
        }
    }
}
