// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Utilities shared by all subcommands.

use anyhow::anyhow;
use clap::ColorChoice;
use onyx_common::Error;
use onyx_core::provider::Prompter;
use reedline::DefaultPrompt;
use reedline::DefaultPromptSegment;
use reedline::Reedline;
use reedline::Signal;
use supports_color::Stream;

pub(crate) fn should_colorize(color: ColorChoice, stream: Stream) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Auto => supports_color::on(stream).is_some(),
        ColorChoice::Never => false,
    }
}

/// Terminal-backed [`Prompter`].  Ctrl-C and Ctrl-D abort the invocation.
pub(crate) struct ReadlinePrompter {
    editor: Reedline,
}

impl ReadlinePrompter {
    pub fn new() -> ReadlinePrompter {
        ReadlinePrompter { editor: Reedline::create() }
    }
}

impl Prompter for ReadlinePrompter {
    fn read_line(&mut self, message: &str) -> Result<String, Error> {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(message.to_string()),
            DefaultPromptSegment::Empty,
        );
        match self.editor.read_line(&prompt) {
            Ok(Signal::Success(input)) => Ok(input),
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                Err(Error::Provider(anyhow!("operation aborted")))
            }
            Err(err) => Err(Error::Provider(
                anyhow::Error::new(err).context("reading input"),
            )),
        }
    }
}
