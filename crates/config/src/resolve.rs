// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Resolves a program entry's numeric or symbolic identity to a concrete
//! uid/gid pair, at load time (per §3: "resolved to numeric uid/gid at
//! construction").

use nix::unistd::{Group, User};

use crate::error::ConfigError;
use crate::schema::RawProgram;

const DEFAULT_UID: u32 = 65534;
const DEFAULT_GID: u32 = 65534;

/// Resolved identity for a program entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

/// Resolve `uid`/`gid` and `user`/`group` into a concrete [`Identity`].
///
/// Numeric and symbolic forms may not both be used for the same axis
/// (uid vs. user, gid vs. group); when both are given, a warning is logged
/// and the symbolic resolution wins — note this is deliberately *not* the
/// `gid`-writes-`uid` copy-paste defect from the reference implementation
/// (design note #2): `gid` is read into `gid`.
pub fn resolve_identity(name: &str, program: &RawProgram) -> Result<Identity, ConfigError> {
    let uid = match (&program.user, program.uid) {
        (Some(user), Some(_)) => {
            tracing::warn!(program = name, user, "both 'uid' and 'user' given; 'user' wins");
            resolve_user(user)?
        }
        (Some(user), None) => resolve_user(user)?,
        (None, Some(uid)) => uid,
        (None, None) => DEFAULT_UID,
    };

    let gid = match (&program.group, program.gid) {
        (Some(group), Some(_)) => {
            tracing::warn!(program = name, group, "both 'gid' and 'group' given; 'group' wins");
            resolve_group(group)?
        }
        (Some(group), None) => resolve_group(group)?,
        (None, Some(gid)) => gid,
        (None, None) => DEFAULT_GID,
    };

    Ok(Identity { uid, gid })
}

fn resolve_user(name: &str) -> Result<u32, ConfigError> {
    User::from_name(name)?
        .map(|user| user.uid.as_raw())
        .ok_or_else(|| ConfigError::UnknownUser(name.to_string()))
}

fn resolve_group(name: &str) -> Result<u32, ConfigError> {
    Group::from_name(name)?
        .map(|group| group.gid.as_raw())
        .ok_or_else(|| ConfigError::UnknownGroup(name.to_string()))
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
