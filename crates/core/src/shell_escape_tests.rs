// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    plain = { "abc", "abc" },
    space = { "a b", "'a b'" },
    single_quote = { "a'b", "'a'\\''b'" },
)]
fn escapes_as_expected(input: &str, expected: &str) {
    assert_eq!(escape_str(input), expected);
}

#[test]
fn unchanged_string_has_no_quotes_added() {
    assert_eq!(escape_str("plain-word_42"), "plain-word_42");
}

#[test]
fn escaped_output_round_trips_through_a_shell() {
    use std::process::Command;

    for raw in ["a b", "a'b", "$HOME", "weird(chars)[here]"] {
        let escaped = escape_str(raw);
        let output = Command::new("sh")
            .arg("-c")
            .arg(format!("echo {escaped}"))
            .output()
            .expect("sh should be available");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.trim_end_matches('\n'), raw);
    }
}
