use std::io::{self, Stderr};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Exclusive hold on the controlling terminal. Raw mode, the alternate screen and
/// the process's standard descriptors are put back when the guard drops, whichever
/// way the picker exits.
pub(crate) struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    _stdio: SavedStdio,
}

impl TerminalGuard {
    pub(crate) fn acquire() -> io::Result<Self> {
        let stdio = SavedStdio::capture()?;
        enable_raw_mode()?;
        let mut stderr = io::stderr();
        if let Err(err) = execute!(stderr, EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(err);
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stderr)) {
            Ok(terminal) => terminal,
            Err(err) => {
                execute!(io::stderr(), LeaveAlternateScreen).ok();
                disable_raw_mode().ok();
                return Err(err);
            }
        };
        Ok(Self {
            terminal,
            _stdio: stdio,
        })
    }

    pub(crate) fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stderr>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
    }
}

/// Duplicates of stdin/stdout/stderr taken before the terminal driver touches
/// them, restored on drop.
#[cfg(unix)]
struct SavedStdio {
    saved: Vec<(libc::c_int, libc::c_int)>,
}

#[cfg(unix)]
impl SavedStdio {
    fn capture() -> io::Result<Self> {
        let mut saved = Vec::with_capacity(3);
        for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            // SAFETY: dup on a standard descriptor has no memory-safety preconditions.
            let copy = unsafe { libc::dup(fd) };
            if copy < 0 {
                let err = io::Error::last_os_error();
                for (_, copy) in &saved {
                    // SAFETY: `copy` was returned by dup above and is owned here.
                    unsafe { libc::close(*copy) };
                }
                return Err(err);
            }
            saved.push((fd, copy));
        }
        Ok(Self { saved })
    }
}

#[cfg(unix)]
impl Drop for SavedStdio {
    fn drop(&mut self) {
        for (fd, copy) in self.saved.drain(..) {
            // SAFETY: `copy` is a descriptor owned by this struct; `fd` is a standard
            // descriptor number.
            unsafe {
                libc::dup2(copy, fd);
                libc::close(copy);
            }
        }
    }
}

#[cfg(not(unix))]
struct SavedStdio;

#[cfg(not(unix))]
impl SavedStdio {
    fn capture() -> io::Result<Self> {
        Ok(Self)
    }
}
