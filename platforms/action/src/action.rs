use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the stepper
    #[key("q")]
    Quit,
    /// Restore the loaded tape and move the head back to the sentinel
    #[key("r")]
    Reset,
    /// Perform one transition
    #[key("space")]
    Step,
    /// Toggle automatic stepping
    #[key("p")]
    ToggleAutoPlay,
    /// Halve the pause between automatic steps
    #[key("+")]
    Faster,
    /// Double the pause between automatic steps
    #[key("-")]
    Slower,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Load the previous embedded tape
    #[key("left")]
    PreviousProgram,
    /// Load the next embedded tape
    #[key("right")]
    NextProgram,
}
