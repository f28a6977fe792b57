// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Output plumbing (§4.7): a child's stdout/stderr are either plain pipes
//! or a pseudo-terminal pair, created before `fork()` so the supervisor
//! retains the read ends.

use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use nix::fcntl::{self, FcntlArg, FdFlag};
use nix::pty::{self, Winsize};
use nix::sys::stat;
use nix::sys::termios;
use nix::unistd::{self, Gid, Uid};

use crate::error::IoPlumbingError;

/// One output stream's two ends: the supervisor keeps `read_end`, the
/// child's side becomes `write_end` (stdout/stderr after `dup2`).
pub struct OutputChannel {
    pub read_end: OwnedFd,
    pub write_end: OwnedFd,
}

/// The fallback terminal size used when the supervisor is not itself
/// attached to a controlling terminal (the common case, since it is PID 1
/// in a container).
const FALLBACK_WINSIZE: Winsize = Winsize { ws_row: 24, ws_col: 80, ws_xpixel: 0, ws_ypixel: 0 };

/// Create a single stdout or stderr channel, as a plain pipe.
pub fn create_pipe() -> Result<OutputChannel, IoPlumbingError> {
    let (read_end, write_end) = unistd::pipe()?;
    set_cloexec(&read_end)?;
    Ok(OutputChannel { read_end, write_end })
}

/// Create a single stdout or stderr channel, as a pseudo-terminal pair.
///
/// Ownership of the slave side is *not* set here: per §4.2 step 1, that
/// happens in the forked child (see [`chown_slave`]), while the slave is
/// still reachable as fd 1/2 and the child still has the privileges to
/// change it.
pub fn create_pty() -> Result<OutputChannel, IoPlumbingError> {
    let template = terminal_template()?;
    let pty = pty::openpty(Some(&FALLBACK_WINSIZE), Some(&template))?;

    set_cloexec(&pty.master)?;
    Ok(OutputChannel { read_end: pty.master, write_end: pty.slave })
}

/// §4.2 step 1: change ownership of a pty slave to the target identity and
/// restrict its permissions to owner-rw + group-w (mode 0620). Called in
/// the forked child, before the identity switch, once the slave has been
/// `dup2`'d onto `fd`.
pub fn chown_slave(fd: RawFd, uid: Uid, gid: Gid) -> Result<(), IoPlumbingError> {
    unistd::fchown(fd, Some(uid), Some(gid))?;
    let mut mode = stat::Mode::empty();
    mode.insert(stat::Mode::S_IRUSR);
    mode.insert(stat::Mode::S_IWUSR);
    mode.insert(stat::Mode::S_IWGRP);
    stat::fchmod(fd, mode)?;
    Ok(())
}

/// §4.1: terminal attributes copied from the supervisor's own controlling
/// terminal if it has one, otherwise a raw-mode fallback (echo, canonical
/// mode, signal generation, and input/output translation all disabled) —
/// the usual posture for a program driving its own pty without a real
/// terminal backing it.
fn terminal_template() -> Result<termios::Termios, IoPlumbingError> {
    let stdin = std::io::stdin();
    if let Ok(attrs) = termios::tcgetattr(&stdin) {
        return Ok(attrs);
    }
    raw_termios()
}

/// Builds a raw-mode `Termios` with no controlling terminal to copy from.
/// There is no safe zero-argument constructor for `Termios`, so a base is
/// borrowed from a throwaway pty pair (immediately dropped) and put into
/// raw mode with `cfmakeraw`.
fn raw_termios() -> Result<termios::Termios, IoPlumbingError> {
    let scratch = pty::openpty(Some(&FALLBACK_WINSIZE), None)?;
    let mut attrs = termios::tcgetattr(&scratch.slave)?;
    termios::cfmakeraw(&mut attrs);
    Ok(attrs)
}

fn set_cloexec(fd: &OwnedFd) -> Result<(), IoPlumbingError> {
    fcntl::fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok(())
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
