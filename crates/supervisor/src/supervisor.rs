// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! The supervisor event loop (§4.4): a single-threaded cooperative cycle
//! of reap, dispatch, termination-check, schedule, bounded by a 1-second
//! multiplexer timeout so the termination check still runs when nothing
//! else happens.

use std::collections::HashMap;
use std::ffi::CString;
use std::os::fd::{AsFd, AsRawFd, RawFd};

use initd_core::{ChildId, ChildSpec, ExitStatus, LifecycleState};
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags};
use nix::sys::signal::{self, SigSet, Signal};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Gid, Pid, Uid};

use crate::child::ChildInstance;
use crate::credentials;
use crate::error::SupervisorError;
use crate::graph::resolve_preconditions;
use crate::io;
use crate::log_sink::LogSink;
use crate::stream_kind::StreamKind;

const POLL_TIMEOUT: u16 = 1000;
const READ_BUFFER: usize = 4096;

/// How the event loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Every child reached a terminal state and the quit flag was set, or
    /// nothing could run.
    Clean,
    /// A `simple`-type child exited non-zero, which unconditionally
    /// initiates shutdown.
    ChildCrashed,
}

struct OutputDescriptor {
    child: ChildId,
    kind: StreamKind,
}

/// Owns every child, the dependency graph's resolved preconditions, and the
/// OS-facing plumbing (epoll instance, signalfd, pid table).
pub struct Supervisor<L: LogSink> {
    children: Vec<ChildInstance>,
    pid_registry: HashMap<Pid, ChildId>,
    descriptors: HashMap<RawFd, OutputDescriptor>,
    epoll: Epoll,
    signal_fd: SignalFd,
    sink: L,
    quit: bool,
}

impl<L: LogSink> Supervisor<L> {
    pub fn new(specs: Vec<ChildSpec>, sink: L) -> Result<Self, SupervisorError> {
        let preconditions = resolve_preconditions(&specs)?;
        let children: Vec<ChildInstance> = specs
            .into_iter()
            .zip(preconditions)
            .enumerate()
            .map(|(i, (spec, preconditions))| {
                ChildInstance::new(ChildId::new(i), spec, preconditions)
            })
            .collect();

        let mut mask = SigSet::empty();
        mask.add(Signal::SIGCHLD);
        mask.add(Signal::SIGINT);
        mask.add(Signal::SIGQUIT);
        mask.add(Signal::SIGTERM);
        signal::sigprocmask(signal::SigmaskHow::SIG_BLOCK, Some(&mask), None)
            .map_err(SupervisorError::SignalSetup)?;
        let signal_fd = SignalFd::with_flags(&mask, SfdFlags::SFD_CLOEXEC | SfdFlags::SFD_NONBLOCK)
            .map_err(SupervisorError::SignalSetup)?;

        let epoll = Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC).map_err(SupervisorError::EpollSetup)?;
        epoll
            .add(signal_fd.as_fd(), EpollEvent::new(EpollFlags::EPOLLIN, signal_fd.as_raw_fd() as u64))
            .map_err(SupervisorError::EpollSetup)?;

        // Declare ourselves the subreaper so orphaned grandchildren are
        // reparented to us instead of the real PID 1, and get reaped by the
        // same `waitpid` loop as direct children.
        nix::sys::prctl::set_child_subreaper(true).map_err(SupervisorError::SignalSetup)?;

        Ok(Self {
            children,
            pid_registry: HashMap::new(),
            descriptors: HashMap::new(),
            epoll,
            signal_fd,
            sink,
            quit: false,
        })
    }

    /// Runs the event loop to completion.
    pub fn run(&mut self) -> Result<ShutdownReason, SupervisorError> {
        self.sink.info("initd", "entering event loop");
        self.refresh_blocked();

        let mut crashed = false;
        loop {
            self.reap(&mut crashed);

            self.dispatch_events()?;

            if self.running_count() == 0 && self.quit {
                break;
            }

            if !self.quit {
                self.schedule()?;
                if self.running_count() == 0 {
                    break;
                }
            }
        }

        self.sink.info("initd", "event loop exited");
        Ok(if crashed { ShutdownReason::ChildCrashed } else { ShutdownReason::Clean })
    }

    fn running_count(&self) -> usize {
        self.children.iter().filter(|child| child.state == LifecycleState::Running).count()
    }

    fn reap(&mut self, crashed: &mut bool) {
        let flags = WaitPidFlag::WNOHANG;
        loop {
            match wait::waitpid(Pid::from_raw(-1), Some(flags)) {
                Ok(WaitStatus::Exited(pid, code)) => self.handle_exit(pid, ExitStatus::Exited(code), crashed),
                Ok(WaitStatus::Signaled(pid, sig, _)) => {
                    self.handle_exit(pid, ExitStatus::Signaled(sig as i32), crashed)
                }
                Ok(WaitStatus::StillAlive) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    }

    fn handle_exit(&mut self, pid: Pid, status: ExitStatus, crashed: &mut bool) {
        let Some(&id) = self.pid_registry.get(&pid) else {
            self.sink.warn("initd", &format!("reaped untracked pid {pid}"));
            return;
        };
        self.pid_registry.remove(&pid);

        let name = self.children[id.index()].spec.name.clone();
        let kind = self.children[id.index()].spec.kind;

        // Reap runs before event dispatch every iteration (§4.4), so a
        // child's final buffered line has to be drained here, before
        // `notify_exit`, rather than waiting for a hang-up event that
        // `dispatch_events` may never get a chance to see this iteration.
        self.close_output(id, &name);

        self.children[id.index()].notify_exit(status);
        let new_state = self.children[id.index()].state;

        if new_state == LifecycleState::Crashed {
            self.sink.error(&name, &format!("exited with status {}", status.code()));
            *crashed = true;
            self.quit = true;
            self.forward_to_all(Signal::SIGINT);
        } else {
            self.sink.info(&name, &format!("exited cleanly ({kind:?})"));
        }

        self.refresh_blocked();
    }

    fn dispatch_events(&mut self) -> Result<(), SupervisorError> {
        let mut buffer = [EpollEvent::empty(); 16];
        let count = match self.epoll.wait(&mut buffer, POLL_TIMEOUT) {
            Ok(count) => count,
            Err(_) => return Ok(()),
        };

        for event in buffer.iter().take(count) {
            let fd = event.data() as RawFd;
            if fd == self.signal_fd.as_raw_fd() {
                self.handle_signal_event();
            } else if let Some(descriptor) = self.descriptors.get(&fd) {
                let child = descriptor.child;
                let kind = descriptor.kind;
                let flags = event.events();
                // A short-lived child's final write is commonly delivered
                // as EPOLLIN|EPOLLHUP together (data buffered, write end
                // already closed); read it before unregistering, or the
                // last line is discarded.
                let mut handled = false;
                if flags.contains(EpollFlags::EPOLLIN) {
                    self.dispatch_output(fd, child, kind);
                    handled = true;
                }
                if flags.contains(EpollFlags::EPOLLHUP) {
                    self.unregister_fd(fd);
                    handled = true;
                }
                if !handled {
                    // §4.4 step 3 / §7: a registered descriptor reporting
                    // neither readability nor hang-up is an event shape
                    // this loop has no handler for.
                    return Err(SupervisorError::UnexpectedEvent(fd));
                }
            } else {
                // An fd neither the signal source nor a registered child
                // descriptor: the multiplexer handed back something this
                // loop never registered.
                return Err(SupervisorError::UnexpectedEvent(fd));
            }
        }
        Ok(())
    }

    fn handle_signal_event(&mut self) {
        while let Ok(Some(info)) = self.signal_fd.read_signal() {
            let Ok(sig) = Signal::try_from(info.ssi_signo as i32) else { continue };
            match sig {
                Signal::SIGCHLD => {}
                Signal::SIGINT | Signal::SIGQUIT | Signal::SIGTERM => {
                    self.quit = true;
                    self.forward_to_all(sig);
                }
                other => self.forward_to_all(other),
            }
        }
    }

    fn forward_to_all(&self, sig: Signal) {
        for pid in self.pid_registry.keys() {
            let _ = signal::kill(*pid, sig);
        }
    }

    fn dispatch_output(&mut self, fd: RawFd, child: ChildId, kind: StreamKind) {
        let name = self.children[child.index()].spec.name.clone();
        self.read_and_dispatch(fd, &name, kind);
    }

    /// Reads up to one buffer's worth of data from `fd` and, if non-empty
    /// after trimming, dispatches it to the sink at the level `kind`
    /// implies (§4.7: one unbuffered read per iteration, no line-splitting).
    fn read_and_dispatch(&self, fd: RawFd, name: &str, kind: StreamKind) {
        let mut buf = [0u8; READ_BUFFER];
        let read = unistd::read(fd, &mut buf).unwrap_or(0);
        if read == 0 {
            return;
        }
        let text = String::from_utf8_lossy(&buf[..read]);
        let trimmed = text.trim_matches('\n');
        if trimmed.is_empty() {
            return;
        }

        match kind {
            StreamKind::Stdout => self.sink.info(name, trimmed),
            StreamKind::Stderr => self.sink.warn(name, trimmed),
        }
    }

    /// Drains and unregisters a just-reaped child's output descriptors.
    ///
    /// Called from `handle_exit`, ahead of `notify_exit`, so the read ends
    /// stay open and registered through reap and are only closed here —
    /// after one last read — rather than being silently dropped by the
    /// lifecycle transition (§3 invariant 3, §4.4 step 3).
    fn close_output(&mut self, id: ChildId, name: &str) {
        let (stdout, stderr) = self.children[id.index()].take_output();
        if let Some(fd) = stdout {
            self.read_and_dispatch(fd.as_raw_fd(), name, StreamKind::Stdout);
            self.unregister_fd(fd.as_raw_fd());
            // `fd` drops here, closing the read end.
        }
        if let Some(fd) = stderr {
            self.read_and_dispatch(fd.as_raw_fd(), name, StreamKind::Stderr);
            self.unregister_fd(fd.as_raw_fd());
        }
    }

    /// Removes `fd` from the multiplexer and from `descriptors`. Idempotent:
    /// safe to call on an fd already removed (e.g. the kernel dropped it
    /// from epoll's interest list when it was closed).
    fn unregister_fd(&mut self, fd: RawFd) {
        let _ = self.epoll.delete(unsafe { std::os::fd::BorrowedFd::borrow_raw(fd) });
        self.descriptors.remove(&fd);
    }

    fn refresh_blocked(&mut self) {
        let states: HashMap<ChildId, LifecycleState> =
            self.children.iter().map(|child| (child.id, child.state)).collect();
        for child in &mut self.children {
            child.refresh(|id| states.get(&id).copied());
        }
    }

    fn schedule(&mut self) -> Result<(), SupervisorError> {
        let ready: Vec<ChildId> =
            self.children.iter().filter(|child| child.is_ready()).map(|child| child.id).collect();
        for id in ready {
            self.attempt_start(id)?;
        }
        Ok(())
    }

    fn attempt_start(&mut self, id: ChildId) -> Result<(), SupervisorError> {
        let spec = self.children[id.index()].spec.clone();

        let (stdout, stderr) = if spec.terminal == initd_core::TerminalPolicy::Pty {
            (io::create_pty().map_err(SupervisorError::Io)?, io::create_pty().map_err(SupervisorError::Io)?)
        } else {
            (io::create_pipe().map_err(SupervisorError::Io)?, io::create_pipe().map_err(SupervisorError::Io)?)
        };

        let username = resolve_username(spec.uid);
        let current_env: Vec<(String, String)> = std::env::vars().collect();
        let env_strings = initd_core::build_environment(&current_env, &spec.env, &username)
            .map_err(|_| SupervisorError::ForkFailed { name: spec.name.clone(), source: nix::errno::Errno::EINVAL })?;

        let result = unsafe {
            // Single-threaded: see the safety note in `new`.
            unistd::fork()
        };

        match result.map_err(|source| SupervisorError::ForkFailed { name: spec.name.clone(), source })? {
            ForkResult::Parent { child: pid } => {
                drop(stdout.write_end);
                drop(stderr.write_end);

                self.register_io(id, &stdout.read_end, StreamKind::Stdout)?;
                self.register_io(id, &stderr.read_end, StreamKind::Stderr)?;
                self.pid_registry.insert(pid, id);
                self.sink.info(&spec.name, &format!("started (pid {pid})"));
                self.children[id.index()].mark_started(pid, stdout.read_end, stderr.read_end);
                Ok(())
            }
            ForkResult::Child => {
                drop(stdout.read_end);
                drop(stderr.read_end);
                run_child(&spec, stdout.write_end, stderr.write_end, &env_strings)
            }
        }
    }

    fn register_io(
        &mut self,
        child: ChildId,
        fd: &std::os::fd::OwnedFd,
        kind: StreamKind,
    ) -> Result<(), SupervisorError> {
        let raw = fd.as_raw_fd();
        self.epoll
            .add(fd, EpollEvent::new(EpollFlags::EPOLLIN, raw as u64))
            .map_err(SupervisorError::EpollSetup)?;
        self.descriptors.insert(raw, OutputDescriptor { child, kind });
        Ok(())
    }
}

fn resolve_username(uid: u32) -> String {
    unistd::User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|user| user.name).unwrap_or_else(|| uid.to_string())
}

/// Runs in the forked child: dup the write ends onto 1/2, drop signal
/// blocking, switch identity and exec. Never returns.
fn run_child(
    spec: &ChildSpec,
    stdout: std::os::fd::OwnedFd,
    stderr: std::os::fd::OwnedFd,
    env: &[String],
) -> ! {
    while unistd::dup2(stdout.as_raw_fd(), 1).is_err() {}
    while unistd::dup2(stderr.as_raw_fd(), 2).is_err() {}
    drop(stdout);
    drop(stderr);

    if signal::sigprocmask(signal::SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None).is_err() {
        exit_child_setup_failure();
    }

    // §4.2 step 1: still running under the supervisor's own privileges, so
    // this must happen before the uid/gid switch below.
    if spec.terminal == initd_core::TerminalPolicy::Pty {
        let uid = Uid::from_raw(spec.uid);
        let gid = Gid::from_raw(spec.gid);
        if io::chown_slave(1, uid, gid).is_err() || io::chown_slave(2, uid, gid).is_err() {
            exit_child_setup_failure();
        }
    }

    let mut unknown_caps = Vec::new();
    let caps = credentials::parse_capabilities(&spec.capabilities, |name| unknown_caps.push(name.to_string()));
    for name in &unknown_caps {
        eprintln!("initd: unknown capability '{name}', skipping");
    }

    if credentials::apply_identity(Uid::from_raw(spec.uid), Gid::from_raw(spec.gid), &caps).is_err() {
        exit_child_setup_failure();
    }

    let Ok(path) = CString::new(spec.path.as_str()) else { exit_child_setup_failure() };
    let mut args: Vec<CString> = vec![path.clone()];
    for arg in &spec.args {
        let Ok(arg) = CString::new(arg.as_str()) else { exit_child_setup_failure() };
        args.push(arg);
    }
    let env: Vec<CString> = env.iter().filter_map(|e| CString::new(e.as_str()).ok()).collect();

    let _ = unistd::execvpe(&path, &args, &env);
    // execvpe only returns on failure.
    exit_child_setup_failure()
}

/// Exit code used for any setup failure between `fork()` and `exec()`,
/// matching the reference implementation's convention of reserving a
/// distinct code for child-side setup failure (never returns).
fn exit_child_setup_failure() -> ! {
    std::process::exit(127)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
