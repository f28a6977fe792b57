// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Switches a forked child to its configured uid/gid and ambient
//! capabilities, in the narrow window between `fork()` and `exec()`.
//!
//! The capability dance below is the standard Linux trick for handing a
//! non-root process a fixed capability set that survives a `setuid()` call:
//! capabilities are raised into the permitted/effective/inheritable sets
//! under `PR_SET_KEEPCAPS`, the uid/gid switch happens, and only then are
//! they dropped back down to the ones the child actually asked for and
//! raised into the ambient set, which is what `execve()` preserves across
//! the image change.

use std::str::FromStr;

use caps::{CapSet, CapsHashSet, Capability};
use nix::sys::prctl;
use nix::unistd::{self, Gid, Uid};

use crate::error::CredentialError;

/// Parse a spec's `capabilities` list, warning (via `on_unknown`) about and
/// skipping any name the `caps` crate does not recognize.
pub fn parse_capabilities(
    names: &[String],
    mut on_unknown: impl FnMut(&str),
) -> CapsHashSet {
    let mut set = CapsHashSet::default();
    for name in names {
        match Capability::from_str(name) {
            Ok(cap) => {
                set.insert(cap);
            }
            Err(_) => on_unknown(name),
        }
    }
    set
}

/// Switch the calling (forked) process to `uid`/`gid`, ending up with
/// exactly `capabilities` in its ambient set.
///
/// Must run after `fork()` and before `exec()`, in the child.
pub fn apply_identity(
    uid: Uid,
    gid: Gid,
    capabilities: &CapsHashSet,
) -> Result<(), CredentialError> {
    let mut transitional = capabilities.clone();
    transitional.insert(Capability::CAP_SETUID);
    transitional.insert(Capability::CAP_SETGID);
    transitional.insert(Capability::CAP_SETPCAP);
    transitional.insert(Capability::CAP_SETFCAP);

    caps::set(None, CapSet::Inheritable, &transitional)?;
    caps::set(None, CapSet::Effective, &transitional)?;
    prctl::set_keepcaps(true)?;

    unistd::setgid(gid)?;
    unistd::setgroups(&[gid])?;
    unistd::setuid(uid)?;

    prctl::set_keepcaps(false)?;
    caps::set(None, CapSet::Inheritable, &transitional)?;
    caps::set(None, CapSet::Effective, &transitional)?;
    caps::clear(None, CapSet::Ambient)?;

    caps::set(None, CapSet::Ambient, capabilities)?;
    caps::set(None, CapSet::Inheritable, capabilities)?;
    caps::set(None, CapSet::Effective, capabilities)?;

    Ok(())
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
