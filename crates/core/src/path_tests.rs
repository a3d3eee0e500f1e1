// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    plain = { "/work", &["logs"], true, "/work/logs" },
    trailing_slash = { "/work/", &["logs"], true, "/work/logs" },
    multi = { "/work", &["logs", "output.log"], true, "/work/logs/output.log" },
    absolute_part_resets = { "/work", &["/elsewhere"], true, "/elsewhere" },
    windows_plain = { "C:\\work", &["logs"], false, "C:\\work\\logs" },
    windows_absolute_reset = { "C:\\work", &["D:\\elsewhere"], false, "D:\\elsewhere" },
)]
fn joins_paths(base: &str, parts: &[&str], is_posix: bool, expected: &str) {
    assert_eq!(path_join(base, parts, is_posix), expected);
}

#[yare::parameterized(
    posix_absolute = { "/foo", true, true },
    posix_relative = { "foo/bar", true, false },
    windows_drive_absolute = { "C:\\foo", false, true },
    windows_drive_relative = { "C:foo", false, false },
    windows_bare_root = { "\\foo", false, false },
    windows_unc = { "\\\\server\\share", false, true },
)]
fn detects_absolute(path: &str, is_posix: bool, expected: bool) {
    assert_eq!(is_absolute(path, is_posix), expected);
}

#[test]
fn path_join_is_associative_under_same_family() {
    // path_join(path_join(a, [b]), [c]) == path_join(a, [b, c])
    let a = "/root";
    let b = "mid";
    let c = "leaf";
    let left = path_join(&path_join(a, &[b], true), &[c], true);
    let right = path_join(a, &[b, c], true);
    assert_eq!(left, right);
}
