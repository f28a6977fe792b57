// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

mod help;
mod run;
