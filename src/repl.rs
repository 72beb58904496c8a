//! Line-oriented interactive shell.
//!
//! The shell starts at the directory prompt, where the user either names a
//! directory to index, loads a saved session with `:load`, or edits the
//! settings for the next build with `:settings`. Once an index exists every
//! line is a query, except `:save` and `:quit`.

use crate::index::build::build_index_with_threads;
use crate::index::types::SearchConfig;
use crate::output::write_report;
use crate::session::SearchSession;
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::warn;

pub const QUIT: &str = ":quit";
pub const LOAD: &str = ":load";
pub const SAVE: &str = ":save";
pub const SETTINGS: &str = ":settings";
pub const DONE: &str = ":done";

const DIRECTORY_PROMPT: &str = "Please enter a directory of files, or type :load to load a stored session, or type :settings to view or change the settings.\nYou can at any time type :quit to quit";
const QUERY_PROMPT: &str = "Please enter query or type :save to save your session";

/// What the caller should do after a dialog step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Shell state
pub struct Repl<R, W> {
    input: R,
    out: W,
    /// Settings used for the next directory build
    pub config: SearchConfig,
    threads: usize,
    session: Option<SearchSession>,
}

impl<R: BufRead, W: WriteColor> Repl<R, W> {
    pub fn new(input: R, out: W, config: SearchConfig, threads: usize) -> Self {
        Self {
            input,
            out,
            config,
            threads: threads.max(1),
            session: None,
        }
    }

    /// The session built or loaded so far
    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the shell until `:quit` or end of input.
    ///
    /// With `directory` the startup dialog is skipped; a failed build of that
    /// directory is returned as an error.
    pub fn run(&mut self, directory: Option<&Path>) -> Result<()> {
        if let Some(dir) = directory {
            self.build(dir)?;
        } else if self.startup()? == Flow::Quit {
            return Ok(());
        }
        self.query_loop()
    }

    fn startup(&mut self) -> Result<Flow> {
        loop {
            let Some(line) = self.prompt(DIRECTORY_PROMPT)? else {
                return Ok(Flow::Quit);
            };
            match line.as_str() {
                "" => continue,
                QUIT => return Ok(Flow::Quit),
                LOAD => {
                    if self.load_dialog()? == Flow::Quit {
                        return Ok(Flow::Quit);
                    }
                    if self.session.is_some() {
                        return Ok(Flow::Continue);
                    }
                }
                SETTINGS => {
                    if self.settings_dialog()? == Flow::Quit {
                        return Ok(Flow::Quit);
                    }
                }
                path => {
                    let dir = PathBuf::from(path);
                    match self.build(&dir) {
                        Ok(()) => return Ok(Flow::Continue),
                        Err(e) => self.error(&format!("{:#}", e))?,
                    }
                }
            }
        }
    }

    fn build(&mut self, dir: &Path) -> Result<()> {
        let index = build_index_with_threads(dir, self.config.clone(), self.threads, true)?;
        writeln!(
            self.out,
            "{} files read in directory {}",
            index.document_count(),
            dir.display()
        )?;
        self.session = Some(SearchSession::new(index));
        Ok(())
    }

    fn load_dialog(&mut self) -> Result<Flow> {
        writeln!(self.out, "Please enter the file path for the stored session:")?;
        let Some(path) = self.prompt("")? else {
            return Ok(Flow::Quit);
        };
        if path == QUIT {
            return Ok(Flow::Quit);
        }
        match SearchSession::load(Path::new(&path)) {
            Ok(session) => {
                writeln!(self.out, "Session loaded successfully!")?;
                writeln!(
                    self.out,
                    "{} files in session",
                    session.index().document_count()
                )?;
                self.session = Some(session);
            }
            Err(e) => {
                warn!(path = %path, error = %e, "session load failed");
                self.error(&format!("The session could not be loaded from {}: {}", path, e))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn settings_dialog(&mut self) -> Result<Flow> {
        writeln!(self.out)?;
        writeln!(self.out, "Current settings:")?;
        writeln!(self.out, "{}", self.config.describe())?;
        writeln!(self.out)?;
        writeln!(self.out, "To change a setting, type keyword = desired_value")?;
        writeln!(self.out, "(e.g. to make searches case sensitive, type case_sensitive = True)")?;
        writeln!(self.out, "To exit settings, type {}", DONE)?;

        loop {
            let Some(line) = self.prompt("")? else {
                return Ok(Flow::Quit);
            };
            match line.as_str() {
                "" => continue,
                DONE => return Ok(Flow::Continue),
                QUIT => return Ok(Flow::Quit),
                _ => {}
            }

            let Some((key, value)) = line.split_once('=') else {
                self.error("Settings are changed with keyword = desired_value")?;
                continue;
            };
            let mut candidate = self.config.clone();
            let applied = candidate
                .apply_setting(key.trim(), value.trim())
                .and_then(|()| candidate.validate());
            match applied {
                Ok(()) => {
                    self.config = candidate;
                    writeln!(self.out)?;
                    writeln!(self.out, "Current settings:")?;
                    writeln!(self.out, "{}", self.config.describe())?;
                    writeln!(self.out)?;
                    writeln!(self.out, "Type {} to exit settings", DONE)?;
                }
                Err(e) => self.error(&e.to_string())?,
            }
        }
    }

    fn query_loop(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.prompt(QUERY_PROMPT)? else {
                return Ok(());
            };
            match line.as_str() {
                QUIT => return Ok(()),
                SAVE => {
                    if self.save_dialog()? == Flow::Quit {
                        return Ok(());
                    }
                }
                query => {
                    let Some(session) = self.session.as_mut() else {
                        return Ok(());
                    };
                    let report = session.search_str(query);
                    writeln!(self.out)?;
                    write_report(&mut self.out, &report)?;
                    writeln!(self.out)?;
                }
            }
        }
    }

    fn save_dialog(&mut self) -> Result<Flow> {
        writeln!(self.out, "Please enter a path for saving your session:")?;
        let Some(path) = self.prompt("")? else {
            return Ok(Flow::Quit);
        };
        if path == QUIT {
            return Ok(Flow::Quit);
        }
        let Some(session) = self.session.as_ref() else {
            return Ok(Flow::Continue);
        };
        match session.save(Path::new(&path)) {
            Ok(()) => writeln!(self.out, "Session saved successfully!")?,
            Err(e) => {
                warn!(path = %path, error = %e, "session save failed");
                self.error(&format!("The session could not be stored at {}: {}", path, e))?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Print `message` (if any) and `> `, then read one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        if !message.is_empty() {
            writeln!(self.out, "{}", message)?;
        }
        write!(self.out, "> ")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(self.out, "Error!")?;
        self.out.reset()?;
        writeln!(self.out, " {}", message)?;
        Ok(())
    }
}
