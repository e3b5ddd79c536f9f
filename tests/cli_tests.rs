//! Command-line behaviour of the converter binary

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_table(path: &Path, waves: usize, wavelength: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for w in 0..waves {
        for n in 0..wavelength {
            let phase = n as f32 / wavelength as f32;
            let amp = 0.1 + 0.8 * (w % 7) as f32 / 7.0;
            let sample = amp * (2.0 * std::f32::consts::PI * phase).sin();
            writer.write_sample((sample * 32767.0) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn cmd() -> Command {
    Command::cargo_bin("stratum-wavetable").unwrap()
}

#[test]
fn test_converts_and_reports_factor() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pad.wav");
    write_table(&input, 128, 2048);

    cmd()
        .arg("--no-thumb")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("reduced by factor 2 to 64 waves"))
        // Loudest source wave, before any channel summing
        .stderr(predicate::str::contains("max excursion 0.78"));

    assert!(dir.path().join("pad_mw.wav").is_file());
    assert!(!dir.path().join("pad.png").exists());
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lead.wav");
    write_table(&input, 16, 256);

    let output = cmd()
        .args(["--json", "--no-thumb", "--crop", "--average", "--wavelength", "256"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let line = String::from_utf8(output.stdout).unwrap();
    let report: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(report["metadata"]["waves_out"], 16);
    assert_eq!(report["metadata"]["reduction"], "crop");
    assert_eq!(report["metadata"]["normalization"], "local");
    assert_eq!(report["output_format"], "float32");
}

#[test]
fn test_missing_file_fails() {
    cmd()
        .arg("/definitely/not/here.wav")
        .assert()
        .failure()
        .stderr(predicate::str::contains("here.wav"))
        .stderr(predicate::str::contains("Input not found"));
}

#[test]
fn test_too_short_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blip.wav");
    write_table(&input, 1, 100);

    cmd()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient samples"));

    assert!(!dir.path().join("blip_mw.wav").exists());
}

#[test]
fn test_zero_wavelength_rejected() {
    cmd()
        .args(["--wavelength", "0", "whatever.wav"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Wavelength"));
}

#[test]
fn test_batch_reports_each_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.wav");
    write_table(&good, 4, 2048);
    let missing = dir.path().join("missing.wav");

    cmd()
        .args(["--no-thumb", "--jobs", "2"])
        .arg(&good)
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.wav"));

    assert!(dir.path().join("good_mw.wav").is_file());
}

#[test]
fn test_repeated_input_is_not_converted_twice() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("loop.wav");
    write_table(&input, 4, 2048);

    cmd()
        .args(["--json", "--jobs", "2"])
        .arg(&input)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output collision"))
        .stdout(predicate::str::contains("\"waves_out\":4").count(1));

    assert!(dir.path().join("loop_mw.wav").is_file());
    assert!(dir.path().join("loop.png").is_file());
}

#[test]
fn test_same_stem_inputs_in_one_batch() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("pad.wav");
    let other = dir.path().join("pad.flac");
    write_table(&wav, 4, 2048);
    write_table(&other, 8, 2048);

    cmd()
        .args(["--jobs", "2"])
        .arg(&wav)
        .arg(&other)
        .assert()
        .success();

    assert!(dir.path().join("pad_mw.wav").is_file());
    assert!(dir.path().join("pad_flac_mw.wav").is_file());
    assert!(dir.path().join("pad.png").is_file());
    assert!(dir.path().join("pad_flac.png").is_file());
}
