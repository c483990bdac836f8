//! Test doubles shared by the menu tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;

use gcp_vm_manager_core::error::Result;
use gcp_vm_manager_core::execution::{CommandOutput, CommandRunner, SessionOutcome};
use gcp_vm_manager_core::gcloud::Gcloud;

use crate::app::App;
use crate::menus::console::Console;
use crate::menus::style::OutputStyle;

pub(crate) type TestApp<'r> = App<'r, Cursor<Vec<u8>>, Vec<u8>>;

/// Replays canned results and records every argument vector, in call order.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    outputs: RefCell<VecDeque<CommandOutput>>,
    sessions: RefCell<VecDeque<Result<SessionOutcome>>>,
    calls: RefCell<Vec<Vec<String>>>,
    interactive_calls: RefCell<Vec<Vec<String>>>,
}

impl RecordingRunner {
    pub(crate) fn with_outputs(outputs: Vec<CommandOutput>) -> Self {
        Self {
            outputs: RefCell::new(outputs.into()),
            ..Self::default()
        }
    }

    pub(crate) fn with_sessions(sessions: Vec<Result<SessionOutcome>>) -> Self {
        Self {
            sessions: RefCell::new(sessions.into()),
            ..Self::default()
        }
    }

    pub(crate) fn push_output(&self, output: CommandOutput) {
        self.outputs.borrow_mut().push_back(output);
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub(crate) fn interactive_calls(&self) -> Vec<Vec<String>> {
        self.interactive_calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, args: &[String]) -> CommandOutput {
        self.calls.borrow_mut().push(args.to_vec());
        self.outputs.borrow_mut().pop_front().unwrap_or_default()
    }

    fn run_interactive(&self, args: &[String]) -> Result<SessionOutcome> {
        self.interactive_calls.borrow_mut().push(args.to_vec());
        self.sessions
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(SessionOutcome::Completed(0)))
    }
}

pub(crate) fn app_with<'r>(runner: &'r RecordingRunner, input: &str, config_path: &str) -> TestApp<'r> {
    let console = Console::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
        OutputStyle::plain(),
    );
    App::new(runner, Gcloud::default(), console, config_path, false)
}

pub(crate) fn output_of(app: TestApp<'_>) -> String {
    String::from_utf8_lossy(&app.into_console().into_output()).into_owned()
}
