use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};

use crate::error::RunError;
use crate::pipeline;

pub const WINDOW_TITLE: &str = "Music Analyzer";
pub const LOAD_LABEL: &str = "Load Music File";
pub const EXIT_LABEL: &str = "Exit";

const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "wave", "mp3", "flac", "ogg", "oga", "m4a", "aac", "aif", "aiff", "caf",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellAction {
    Load,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Done,
}

/// The window the user drives. Passed explicitly to `run` so nothing holds
/// on to it beyond a single session.
pub trait Shell {
    /// Block until the user presses one of the two buttons.
    fn choose_action(&mut self) -> ShellAction;
    /// `None` when the picker is cancelled.
    fn pick_file(&mut self) -> Option<PathBuf>;
}

/// Native dialogs: a two-button prompt and the platform file picker.
#[derive(Default)]
pub struct NativeShell;

impl Shell for NativeShell {
    fn choose_action(&mut self) -> ShellAction {
        let result = MessageDialog::new()
            .set_title(WINDOW_TITLE)
            .set_description("Pick an audio file to render its analysis figure.")
            .set_level(MessageLevel::Info)
            .set_buttons(MessageButtons::OkCancelCustom(
                LOAD_LABEL.to_string(),
                EXIT_LABEL.to_string(),
            ))
            .show();
        action_for(result)
    }

    fn pick_file(&mut self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title(LOAD_LABEL)
            .add_filter("Audio", AUDIO_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
    }
}

/// Closing the prompt any other way counts as Exit.
fn action_for(result: MessageDialogResult) -> ShellAction {
    match result {
        MessageDialogResult::Ok | MessageDialogResult::Yes => ShellAction::Load,
        MessageDialogResult::Custom(label) if label == LOAD_LABEL => ShellAction::Load,
        _ => ShellAction::Exit,
    }
}

/// One transition out of Idle.
pub fn step<F>(shell: &mut dyn Shell, auto_close: bool, analyze: &mut F) -> (State, Option<PathBuf>)
where
    F: FnMut(&Path) -> Result<PathBuf, RunError>,
{
    match shell.choose_action() {
        ShellAction::Exit => (State::Done, None),
        ShellAction::Load => {
            let Some(path) = shell.pick_file() else {
                log::debug!("File selection cancelled");
                return (State::Idle, None);
            };
            let result = analyze(&path);
            pipeline::report(&result);
            match result {
                Ok(output) if auto_close => (State::Done, Some(output)),
                Ok(output) => (State::Idle, Some(output)),
                Err(_) => (State::Idle, None),
            }
        }
    }
}

/// Drive the shell until the user exits, or until the first success when
/// `auto_close` is set. Returns every figure written.
pub fn run<F>(shell: &mut dyn Shell, auto_close: bool, mut analyze: F) -> Vec<PathBuf>
where
    F: FnMut(&Path) -> Result<PathBuf, RunError>,
{
    let mut written = Vec::new();
    loop {
        let (state, output) = step(shell, auto_close, &mut analyze);
        written.extend(output);
        if state == State::Done {
            log::info!("Closing {}", WINDOW_TITLE);
            return written;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    enum Input {
        Press(ShellAction),
        Pick(Option<&'static str>),
    }

    struct ScriptedShell {
        script: VecDeque<Input>,
    }

    impl ScriptedShell {
        fn new(script: Vec<Input>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl Shell for ScriptedShell {
        fn choose_action(&mut self) -> ShellAction {
            match self.script.pop_front() {
                Some(Input::Press(action)) => action,
                Some(Input::Pick(_)) => panic!("expected a button press"),
                None => ShellAction::Exit,
            }
        }

        fn pick_file(&mut self) -> Option<PathBuf> {
            match self.script.pop_front() {
                Some(Input::Pick(path)) => path.map(PathBuf::from),
                _ => panic!("expected a file pick"),
            }
        }
    }

    fn fake_analyze(path: &Path) -> Result<PathBuf, RunError> {
        if path.extension().is_some_and(|e| e == "txt") {
            Err(RunError::Load(anyhow::anyhow!("not audio")))
        } else {
            Ok(path.with_extension("png"))
        }
    }

    #[test]
    fn exit_before_choosing_writes_nothing() {
        let mut calls = 0;
        let mut shell = ScriptedShell::new(vec![Input::Press(ShellAction::Exit)]);
        let written = run(&mut shell, true, |p| {
            calls += 1;
            fake_analyze(p)
        });
        assert!(written.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn cancel_and_failure_return_to_idle() {
        let mut shell = ScriptedShell::new(vec![
            Input::Press(ShellAction::Load),
            Input::Pick(None),
            Input::Press(ShellAction::Load),
            Input::Pick(Some("notes.txt")),
            Input::Press(ShellAction::Load),
            Input::Pick(Some("song.wav")),
            // Never reached: auto-close ends the session after the success.
            Input::Press(ShellAction::Load),
        ]);
        let written = run(&mut shell, true, fake_analyze);
        assert_eq!(written, vec![PathBuf::from("song.png")]);
        assert_eq!(shell.script.len(), 1);
    }

    #[test]
    fn keep_open_allows_several_analyses() {
        let mut shell = ScriptedShell::new(vec![
            Input::Press(ShellAction::Load),
            Input::Pick(Some("a.wav")),
            Input::Press(ShellAction::Load),
            Input::Pick(Some("b.flac")),
            Input::Press(ShellAction::Exit),
        ]);
        let written = run(&mut shell, false, fake_analyze);
        assert_eq!(written, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
    }

    #[test]
    fn step_reports_state_transitions() {
        let mut shell = ScriptedShell::new(vec![
            Input::Press(ShellAction::Load),
            Input::Pick(Some("bad.txt")),
        ]);
        let (state, output) = step(&mut shell, true, &mut fake_analyze);
        assert_eq!(state, State::Idle);
        assert!(output.is_none());
    }

    #[test]
    fn dialog_results_map_to_actions() {
        assert_eq!(
            action_for(MessageDialogResult::Custom(LOAD_LABEL.to_string())),
            ShellAction::Load
        );
        assert_eq!(
            action_for(MessageDialogResult::Custom(EXIT_LABEL.to_string())),
            ShellAction::Exit
        );
        assert_eq!(action_for(MessageDialogResult::Ok), ShellAction::Load);
        assert_eq!(action_for(MessageDialogResult::Cancel), ShellAction::Exit);
    }
}
