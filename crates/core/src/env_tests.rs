// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

use super::*;

fn kv(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn get<'a>(rendered: &'a [String], key: &str) -> Option<&'a str> {
    rendered.iter().find_map(|line| line.strip_prefix(&format!("{key}="))).map(|v| v)
}

#[test]
fn non_whitelisted_variables_are_dropped() {
    let env = kv(&[("HOME", "/root"), ("SECRET_TOKEN", "xyz")]);
    let policy = EnvPolicy::default();
    let rendered = build_environment(&env, &policy, "nobody").unwrap();
    assert!(get(&rendered, "SECRET_TOKEN").is_none());
    assert_eq!(get(&rendered, "HOME"), Some("/root"));
}

#[test]
fn user_is_always_forced_to_resolved_username() {
    let env = kv(&[("USER", "root")]);
    let policy = EnvPolicy::default();
    let rendered = build_environment(&env, &policy, "nobody").unwrap();
    assert_eq!(get(&rendered, "USER"), Some("nobody"));
}

#[test]
fn default_env_fills_only_absent_slots() {
    let env = kv(&[("HOME", "/custom/home")]);
    let policy = EnvPolicy { default_env: true, ..EnvPolicy::default() };
    let rendered = build_environment(&env, &policy, "nobody").unwrap();
    // inherited HOME wins over the /app default
    assert_eq!(get(&rendered, "HOME"), Some("/custom/home"));
    // PATH was absent from the inherited set, so the default fills it
    assert_eq!(get(&rendered, "PATH"), Some("/usr/local/bin:/usr/bin:/bin"));
}

#[test]
fn default_env_false_means_no_defaults_at_all() {
    let env = kv(&[]);
    let policy = EnvPolicy::default();
    let rendered = build_environment(&env, &policy, "nobody").unwrap();
    assert!(get(&rendered, "PATH").is_none());
}

/// End-to-end scenario 6 from the supervisor spec.
#[test]
fn environment_filtering_scenario() {
    let env = kv(&[
        ("HOME", "/root"),
        ("LANG", "en_US.UTF-8"),
        ("LANGUAGE", "en_US"),
        ("LOGNAME", "root"),
        ("PATH", "/usr/bin:/bin"),
        ("PWD", "/root"),
        ("SHELL", "/bin/zsh"),
        ("TERM", "xterm-256color"),
        ("USER", "root"),
        ("EDITOR", "vim"),
        ("SECRET", "nope"),
    ]);
    let policy = EnvPolicy {
        whitelist: vec!["EDITOR".to_string()],
        default_env: false,
        extra: vec![
            EnvVarTemplate { key: "FOO".to_string(), template: "bar".to_string() },
            EnvVarTemplate {
                key: "BAR".to_string(),
                template: "{{ USER }}-{{ FOO }}".to_string(),
            },
        ],
    };

    let rendered = build_environment(&env, &policy, "nobody").unwrap();

    assert_eq!(get(&rendered, "HOME"), Some("/root"));
    assert_eq!(get(&rendered, "EDITOR"), Some("vim"));
    assert_eq!(get(&rendered, "USER"), Some("nobody"));
    assert_eq!(get(&rendered, "FOO"), Some("bar"));
    assert_eq!(get(&rendered, "BAR"), Some("nobody-bar"));
    assert!(get(&rendered, "SECRET").is_none());
}

#[test]
fn extras_are_evaluated_in_declaration_order() {
    let policy = EnvPolicy {
        extra: vec![
            EnvVarTemplate { key: "A".to_string(), template: "1".to_string() },
            EnvVarTemplate { key: "B".to_string(), template: "{{ A }}2".to_string() },
            EnvVarTemplate { key: "C".to_string(), template: "{{ B }}3".to_string() },
        ],
        ..EnvPolicy::default()
    };
    let rendered = build_environment(&[], &policy, "nobody").unwrap();
    assert_eq!(get(&rendered, "C"), Some("123"));
}
