use assert_cmd::Command;
use predicates::prelude::*;

fn cnvt() -> Command {
    Command::cargo_bin("cnvt").unwrap()
}

#[test]
fn help_lists_stream_types() {
    cnvt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stream types"))
        .stdout(predicate::str::contains("--container"));
}

#[test]
fn codecs_listing_needs_no_files() {
    cnvt()
        .arg("--codecs")
        .assert()
        .success()
        .stdout(predicate::str::contains("h264"))
        .stdout(predicate::str::contains("aac"));
}

#[test]
fn input_and_output_are_required() {
    cnvt()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));

    cnvt()
        .arg("in.mp4")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn resize_without_video_codec_is_rejected() {
    cnvt()
        .args(["in.mkv", "out.mkv", "--hd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a video codec"));
}

#[test]
fn conflicting_resolution_flags_are_rejected() {
    cnvt()
        .args(["in.mkv", "out.mkv", "--codec", "v", "h264", "--hd", "--uhd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("conflicting resize options"));
}

#[test]
fn mono_and_stereo_conflict() {
    cnvt()
        .args(["in.mkv", "out.mkv", "--codec", "a", "aac", "--mono", "--stereo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_stream_type_is_rejected() {
    cnvt()
        .args(["in.mkv", "out.mkv", "--codec", "x", "h264"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid stream type"));
}

#[test]
fn missing_input_fails_cleanly() {
    cnvt()
        .args(["definitely-not-here.mkv", "out.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("definitely-not-here.mkv"));
}
