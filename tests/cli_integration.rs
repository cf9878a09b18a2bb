use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two libraries (`main`, `ssd`) on disk, one compat directory and a config pointing at them.
struct Setup {
    dir: TempDir,
    config: PathBuf,
}

impl Setup {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main/steamapps");
        let ssd = dir.path().join("ssd/steamapps");
        let compat = main.join("compatdata");
        fs::create_dir_all(main.join("common")).unwrap();
        fs::create_dir_all(&ssd).unwrap();
        fs::create_dir_all(compat.join("220")).unwrap();
        fs::create_dir_all(compat.join("999")).unwrap();

        install(&main, "220", "Half-Life 2", 2_000);
        install(&main, "400", "Portal", 1_000);

        let config = dir.path().join("config.json");
        let json = serde_json::json!({
            "libraries": { "Main": main, "ssd": ssd },
            "compat_data": { "main": compat },
            "reserve": 0
        });
        fs::write(&config, serde_json::to_string_pretty(&json).unwrap()).unwrap();

        Self { dir, config }
    }

    fn library(&self, id: &str) -> PathBuf {
        self.dir.path().join(id).join("steamapps")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("steam-storage").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("STEAM_STORAGE_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(&self.config);
        cmd
    }
}

fn install(library: &Path, app_id: &str, name: &str, size: u64) {
    let manifest = format!(
        "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"name\"\t\t\"{name}\"\n\t\"installdir\"\t\t\"{name}\"\n\t\"SizeOnDisk\"\t\t\"{size}\"\n}}\n"
    );
    fs::write(library.join(format!("appmanifest_{app_id}.acf")), manifest).unwrap();
    let game_dir = library.join("common").join(name);
    fs::create_dir_all(game_dir.join("bin")).unwrap();
    fs::write(game_dir.join("bin/game.exe"), b"binary").unwrap();
}

fn bare_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("steam-storage").unwrap();
    cmd.current_dir(dir)
        .env_remove("STEAM_STORAGE_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_list_shows_libraries_and_games() {
    let setup = Setup::new();
    setup
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("main"))
        .stdout(predicate::str::contains("GB free"))
        .stdout(predicate::str::contains("Half-Life 2"))
        .stdout(predicate::str::contains("Portal"));
}

#[test]
fn test_list_flag_form_with_filter() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["-l", "ssd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Portal").not())
        .stdout(predicate::str::contains("No games installed."));
}

#[test]
fn test_list_unknown_library_fails() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["--list", "usb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Library not found: usb"));
}

#[test]
fn test_move_relocates_manifest_and_files() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["-m", "220", "SSD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved Half-Life 2 (220) from main to ssd"));

    let ssd = setup.library("ssd");
    let main = setup.library("main");
    assert!(ssd.join("appmanifest_220.acf").is_file());
    assert!(ssd.join("common/Half-Life 2/bin/game.exe").is_file());
    assert!(!main.join("appmanifest_220.acf").exists());
    assert!(!main.join("common/Half-Life 2").exists());

    // and back again
    setup
        .cmd()
        .args(["--move", "Half-Life 2", "main"])
        .assert()
        .success();
    assert!(main.join("common/Half-Life 2/bin/game.exe").is_file());
}

#[test]
fn test_move_prompts_for_missing_arguments() {
    let setup = Setup::new();
    setup
        .cmd()
        .arg("move")
        .write_stdin("Portal\nssd\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter game"))
        .stdout(predicate::str::contains("[main, ssd]"))
        .stdout(predicate::str::contains("Moved Portal (400)"));
    assert!(setup.library("ssd").join("appmanifest_400.acf").is_file());
}

#[test]
fn test_move_unknown_game_fails() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["-m", "Portal 2", "ssd"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Game not found: Portal 2"));
}

#[test]
fn test_delete_with_yes() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["-d", "400", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted Portal (400) from main"));

    let main = setup.library("main");
    assert!(!main.join("appmanifest_400.acf").exists());
    assert!(!main.join("common/Portal").exists());
    assert!(main.join("common/Half-Life 2").exists());
}

#[test]
fn test_delete_declined_keeps_everything() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["--delete", "Portal"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[y/N]"))
        .stdout(predicate::str::contains("Cancelled."));
    assert!(setup.library("main").join("common/Portal").exists());
}

#[test]
fn test_delete_confirmed_from_stdin() {
    let setup = Setup::new();
    setup
        .cmd()
        .arg("delete")
        .write_stdin("400\ny\n")
        .assert()
        .success();
    assert!(!setup.library("main").join("common/Portal").exists());
}

#[test]
fn test_optimise_dry_run_moves_nothing() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["-o", "main", "ssd", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Optimising main -> ssd"))
        .stdout(predicate::str::contains("Would move Half-Life 2 (220)"))
        .stdout(predicate::str::contains("Would move Portal (400)"))
        .stdout(predicate::str::contains("would move 2 games"));
    assert!(setup.library("main").join("common/Portal").exists());
}

#[test]
fn test_optimise_moves_largest_first() {
    let setup = Setup::new();
    let out = setup
        .cmd()
        .args(["--optimise", "main", "ssd"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    let hl2 = out.find("Moved Half-Life 2").unwrap();
    let portal = out.find("Moved Portal").unwrap();
    assert!(hl2 < portal);
    assert!(setup.library("ssd").join("common/Portal").exists());
}

#[test]
fn test_optimise_with_huge_reserve_moves_nothing() {
    let setup = Setup::new();
    setup
        .cmd()
        .args(["-o", "main", "ssd", "--reserve", "1000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("does not fit"))
        .stdout(predicate::str::contains("moved 0 games"));
}

#[test]
fn test_compat_marks_orphans() {
    let setup = Setup::new();
    setup
        .cmd()
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"220\s+installed").unwrap())
        .stdout(predicate::str::is_match(r"999\s+orphaned").unwrap());
}

#[test]
fn test_no_command_prints_help() {
    let dir = tempfile::tempdir().unwrap();
    bare_cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Game Commands:"))
        .stdout(predicate::str::contains("-o, --optimise"));
}

#[test]
fn test_help_for_command() {
    let dir = tempfile::tempdir().unwrap();
    bare_cmd(dir.path())
        .args(["-h", "move"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Move a game to another library"));
}

#[test]
fn test_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    bare_cmd(dir.path())
        .arg("frobnicate")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Command frobnicate not found."))
        .stdout(predicate::str::contains("Library Commands:"));
}

#[test]
fn test_unknown_flag_command() {
    let dir = tempfile::tempdir().unwrap();
    bare_cmd(dir.path())
        .arg("-x")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Command -x not found."));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    bare_cmd(dir.path())
        .args(["--config", "does-not-exist.json", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Configuration error"));
}

#[test]
fn test_config_from_environment() {
    let setup = Setup::new();
    bare_cmd(setup.dir.path())
        .env("STEAM_STORAGE_CONFIG", &setup.config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Portal"));
}

#[test]
fn test_local_config_file() {
    let setup = Setup::new();
    fs::copy(&setup.config, setup.dir.path().join("steam_storage.json")).unwrap();
    bare_cmd(setup.dir.path())
        .arg("-l")
        .assert()
        .success()
        .stdout(predicate::str::contains("Half-Life 2"));
}
