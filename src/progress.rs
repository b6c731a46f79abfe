// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of ProgressPrinter structure for printing the progress of frame writing.

use colored::{ColoredString, Colorize};
use std::io::Write;

/// Progress of writing frames into an archive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressStatus {
    /// Frames are being written.
    Running,
    /// All frames have been written.
    Completed,
    /// Writing failed.
    Failed,
}

/// String that can be used inside `ProgressPrinter`.
#[derive(Debug, Clone, PartialEq)]
struct ProgressMessage {
    msg: ColoredString,
}

impl ProgressMessage {
    /// Create new `ProgressMessage`.
    ///
    /// ## Panics
    /// Panics if the string is longer than 9 characters.
    fn new(string: ColoredString) -> Self {
        if string.chars().count() > 9 {
            panic!("FATAL CASTEP_H5MD ERROR | ProgressMessage::new | `ProgressMessage` can not be longer than 9 characters.");
        }

        ProgressMessage { msg: string }
    }

    /// Print formatted `ProgressMessage`.
    fn print(&self, out: &mut dyn Write, colored: bool) {
        if colored {
            write!(out, "[{: ^9}]   ", self.msg)
                .expect("FATAL CASTEP_H5MD ERROR | ProgressMessage::print (1) | Could not write to `ProgressPrinter` stream.");
        } else {
            write!(out, "[{: ^9}]   ", self.msg.as_ref() as &str)
                .expect("FATAL CASTEP_H5MD ERROR | ProgressMessage::print (2) | Could not write to `ProgressPrinter` stream.");
        }
    }
}

/// Structure handling printing of progress of writing frames into an h5md archive.
/// Constructed using `ProgressPrinter::new()` and passed to the conversion
/// using `ConvertOptions::with_progress()`.
pub struct ProgressPrinter {
    /// Stream to write the progress info to. Default: standard error output.
    output: Box<dyn Write>,
    status: ProgressStatus,
    /// Print every `print_freq`th frame. Default: 100 frames.
    print_freq: usize,
    /// If true, the output will be colored. Default: true.
    colored: bool,
    /// Default: "Frame".cyan().
    frame_msg: ColoredString,
    /// Default: "Time".bright_purple().
    time_msg: ColoredString,
    /// Default: "RUNNING".yellow().
    running_msg: ProgressMessage,
    /// Default: "COMPLETED".green().
    completed_msg: ProgressMessage,
    /// Default: "FAILED!".red().
    failed_msg: ProgressMessage,
    /// String terminating the progress message. Default: `\r` (carriage return).
    terminating: String,
}

impl ProgressPrinter {
    /// Create an instance of `ProgressPrinter` with default parameters.
    ///
    /// The default values of the `ProgressPrinter` parameters.
    /// - `output`: `std::io::stderr()`
    /// - `status`: `ProgressStatus::Running`
    /// - `print_freq`: `100` (progress info will be printed every 100 frames written)
    /// - `colored`: `true`
    /// - `frame_msg`: `"Frame".cyan()`
    /// - `time_msg`: `"Time".bright_purple()`
    /// - `running_msg`: `"RUNNING".yellow()`
    /// - `completed_msg`: `"COMPLETED".green()`
    /// - `failed_msg`: `"FAILED!".red()`
    /// - `terminating`: `\r` (useful to set to `\n` when printing to a file)
    ///
    /// ## Example
    /// ```no_run
    /// use castep_h5md::prelude::*;
    ///
    /// let file = std::fs::File::create("progress.log").unwrap();
    /// let printer = ProgressPrinter::new()
    ///     .with_output(Box::from(file))
    ///     .with_print_freq(10)
    ///     .with_colored(false)
    ///     .with_terminating("\n");
    ///
    /// let options = ConvertOptions::default().with_progress(printer);
    /// ```
    pub fn new() -> Self {
        ProgressPrinter {
            output: Box::from(std::io::stderr()),
            status: ProgressStatus::Running,
            print_freq: 100,
            colored: true,
            frame_msg: "Frame".cyan(),
            time_msg: "Time".bright_purple(),
            running_msg: ProgressMessage::new("RUNNING".yellow()),
            completed_msg: ProgressMessage::new("COMPLETED".green()),
            failed_msg: ProgressMessage::new("FAILED!".red()),
            terminating: String::from("\r"),
        }
    }

    /// Create new `ProgressPrinter` with specific `output` stream.
    pub fn with_output(mut self, stream: Box<dyn Write>) -> Self {
        self.output = stream;
        self
    }

    /// Set new status to an already constructed `ProgressPrinter`.
    pub fn set_status(&mut self, status: ProgressStatus) {
        self.status = status;
    }

    /// Create new `ProgressPrinter` with specific value for `print_freq`.
    ///
    /// ## Panics
    /// Panics if `print_freq` is zero.
    pub fn with_print_freq(mut self, print_freq: usize) -> Self {
        if print_freq == 0 {
            panic!("FATAL CASTEP_H5MD ERROR | ProgressPrinter::with_print_freq | Printing frequency must be positive.");
        }

        self.print_freq = print_freq;
        self
    }

    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn with_frame_msg(mut self, frame_msg: ColoredString) -> Self {
        self.frame_msg = frame_msg;
        self
    }

    pub fn with_time_msg(mut self, time_msg: ColoredString) -> Self {
        self.time_msg = time_msg;
        self
    }

    /// ## Panics
    /// Panics if the `running_msg` is longer than 9 characters.
    pub fn with_running_msg(mut self, running_msg: ColoredString) -> Self {
        self.running_msg = ProgressMessage::new(running_msg);
        self
    }

    /// ## Panics
    /// Panics if the `completed_msg` is longer than 9 characters.
    pub fn with_completed_msg(mut self, completed_msg: ColoredString) -> Self {
        self.completed_msg = ProgressMessage::new(completed_msg);
        self
    }

    /// ## Panics
    /// Panics if the `failed_msg` is longer than 9 characters.
    pub fn with_failed_msg(mut self, failed_msg: ColoredString) -> Self {
        self.failed_msg = ProgressMessage::new(failed_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `terminating`.
    pub fn with_terminating(mut self, string: &str) -> Self {
        self.terminating = string.to_string();
        self
    }

    /// Print progress info about frame writing.
    /// `frames_written` is the number of frames written so far, `time` is the time of the last frame in ps.
    ///
    /// While running, the info is only printed every `print_freq`th frame.
    pub fn print(&mut self, frames_written: usize, n_frames: usize, time: f64) {
        if self.status == ProgressStatus::Running && frames_written % self.print_freq != 0 {
            return;
        }

        match self.status {
            ProgressStatus::Running => self.running_msg.print(&mut self.output, self.colored),
            ProgressStatus::Completed => self.completed_msg.print(&mut self.output, self.colored),
            ProgressStatus::Failed => self.failed_msg.print(&mut self.output, self.colored),
        }

        let (frame_msg, time_msg) = if self.colored {
            (self.frame_msg.to_string(), self.time_msg.to_string())
        } else {
            (
                (self.frame_msg.as_ref() as &str).to_owned(),
                (self.time_msg.as_ref() as &str).to_owned(),
            )
        };

        write!(
            self.output,
            "{} {:8} / {} | {} {:.3} ps{}",
            frame_msg, frames_written, n_frames, time_msg, time, self.terminating
        )
        .expect("FATAL CASTEP_H5MD ERROR | ProgressPrinter::print (1) | Could not write to `ProgressPrinter` stream.");

        // the final message must stay visible
        if self.status != ProgressStatus::Running && !self.terminating.ends_with('\n') {
            writeln!(self.output)
                .expect("FATAL CASTEP_H5MD ERROR | ProgressPrinter::print (2) | Could not write to `ProgressPrinter` stream.");
        }

        self.output
            .flush()
            .expect("FATAL CASTEP_H5MD ERROR | ProgressPrinter::print (3) | Could not flush `ProgressPrinter` stream.");
    }
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
