// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn writes_a_pixmap() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("frame.ppm");
    Command::cargo_bin("explore")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "40x30"])
        .assert()
        .success();
    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"P6"));
    // Header, then three bytes a pixel.
    assert!(bytes.len() > 40 * 30 * 3);
}

#[test]
fn writes_a_png_after_gestures() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("frame.png");
    Command::cargo_bin("explore")
        .unwrap()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "64x48",
            "--zoom",
            "10,20,3",
            "--pan",
            "-5,4",
            "--zoom",
            "32,24,-1",
            "--resize",
            "80x48",
            "--scheduler",
            "scoped",
            "-j",
            "1",
        ])
        .assert()
        .success();
    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[test]
fn rejects_a_bad_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("frame.ppm");
    Command::cargo_bin("explore")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "forty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse image size"));
}

#[test]
fn rejects_an_inverted_view() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("frame.ppm");
    Command::cargo_bin("explore")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-r", "1.0,-1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid viewport"));
}

#[test]
fn rejects_a_zero_sized_raster() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("frame.ppm");
    Command::cargo_bin("explore")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("raster must be at least 1x1"));
}

#[test]
fn rejects_an_absurd_zoom() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("frame.ppm");
    for clicks in &["1,1,-2147483648", "1,1,2147483647", "1,1,1001"] {
        Command::cargo_bin("explore")
            .unwrap()
            .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "-z", *clicks])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Zoom clicks must be between"));
    }
    assert!(!out.exists());
}
