use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("music-bingo-{}-{name}", std::process::id()))
}

fn write_listing(name: &str, tracks: usize) -> PathBuf {
    let mut text = String::from("[game]\ntickets = 24\n");
    for index in 0..tracks {
        text.push_str(&format!(
            "\n[[track]]\ntitle = \"Song {index}\"\nartist = \"Band {}\"\nduration_secs = 200\n",
            index % 4
        ));
    }
    let path = scratch_path(name);
    fs::write(&path, text).expect("write listing");
    path
}

fn music_bingo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_music-bingo"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run music-bingo")
}

#[test]
fn generated_record_checks_back() {
    let listing = write_listing("listing.toml", 20);
    let record = scratch_path("record.txt");

    let generated = music_bingo(&[
        "generate",
        listing.to_str().expect("utf-8 path"),
        "--seed",
        "7",
        "--record-out",
        record.to_str().expect("utf-8 path"),
    ]);
    assert!(generated.status.success(), "generate failed: {generated:?}");
    let stdout = String::from_utf8_lossy(&generated.stdout);
    assert!(stdout.contains("Playback order"));
    assert_eq!(stdout.matches("Ticket ").count(), 24);

    let saved = fs::read_to_string(&record).expect("record written");
    assert!(saved.starts_with("bingo:v1:20x24:"));

    let checked = music_bingo(&[
        "check",
        record.to_str().expect("utf-8 path"),
        "--ticket",
        "1",
        "--played",
        "20",
    ]);
    assert!(checked.status.success(), "check failed: {checked:?}");
    let stdout = String::from_utf8_lossy(&checked.stdout);
    assert!(stdout.contains("Ticket 1 wins at track"));
    assert!(stdout.contains("After 20 tracks the ticket has won"));

    let missing = music_bingo(&[
        "check",
        record.to_str().expect("utf-8 path"),
        "--ticket",
        "99",
    ]);
    assert!(!missing.status.success());

    let _ = fs::remove_file(listing);
    let _ = fs::remove_file(record);
}

#[test]
fn small_pool_is_reported() {
    let listing = write_listing("small.toml", 10);

    let generated = music_bingo(&["generate", listing.to_str().expect("utf-8 path")]);
    assert!(!generated.status.success());
    let stderr = String::from_utf8_lossy(&generated.stderr);
    assert!(
        stderr.contains("track pool holds 10 tracks but at least 15 are required"),
        "unexpected error output: {stderr}"
    );

    let _ = fs::remove_file(listing);
}
