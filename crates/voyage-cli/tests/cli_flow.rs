use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::ptr::NonNull;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::serialize::OwnedData;
use rusqlite::{Connection, DatabaseName};

use voyage_core::storage::{AgeSqliteStorage, StorageEngine};

const PASSPHRASE: &str = "test-passphrase-secure-123";
const CREW_USER: &str = "2b7c4a9e-5d1f-4c3a-9e8b-7f6a5d4c3b2a";

const ITINERARY: &str = r##"{
    "stops": [
        {"id": 1, "name": "Lefkada", "country": "Greece", "lat": 38.83, "lon": 20.71,
         "type": "marina", "arrival": "2026-05-01", "departure": "2026-05-04",
         "duration": "3 days", "distanceToNext": 42.5, "phase": "ionian",
         "schengen": true, "season": "spring", "marinaName": "Lefkas Marina"},
        {"id": 2, "name": "Kotor", "country": "Montenegro", "lat": 42.42, "lon": 18.77,
         "type": "anchorage", "arrival": "2026-05-10", "departure": "2026-05-12",
         "duration": "2 days", "distanceToNext": 0, "phase": "adriatic",
         "schengen": false, "season": "spring"}
    ],
    "phases": [
        {"id": "ionian", "name": "Ionian", "stops": 1, "days": 3, "schengen": true, "color": "#3b82f6"},
        {"id": "adriatic", "name": "Adriatic", "stops": 1, "days": 2, "schengen": false, "color": "#10b981"}
    ]
}"##;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_voyage"))
}

struct TestEnv {
    base: PathBuf,
    config_home: PathBuf,
    data_home: PathBuf,
}

impl TestEnv {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let base = std::env::temp_dir().join(format!(
            "voyage_{}_{}_{}",
            prefix,
            std::process::id(),
            nanos
        ));
        let config_home = base.join("config");
        let data_home = base.join("data");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        std::fs::create_dir_all(&data_home).expect("create data dir");
        Self {
            base,
            config_home,
            data_home,
        }
    }

    fn journal_path(&self) -> PathBuf {
        self.data_home.join("voyage").join("voyage.journal")
    }

    fn config_path(&self) -> PathBuf {
        self.config_home.join("voyage").join("config.toml")
    }

    fn itinerary_path(&self) -> PathBuf {
        let path = self.base.join("stops.json");
        if !path.exists() {
            std::fs::write(&path, ITINERARY).expect("write itinerary");
        }
        path
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env("XDG_CONFIG_HOME", &self.config_home)
            .env("XDG_DATA_HOME", &self.data_home)
            .env("HOME", &self.base)
            .env("VOYAGE_PASSPHRASE", PASSPHRASE)
            .env("NO_COLOR", "1")
            .env_remove("VOYAGE_USER")
            .env_remove("VOYAGE_PATH")
            .env_remove("VOYAGE_CONFIG")
            .env_remove("VOYAGE_ITINERARY");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run voyage")
    }

    /// Run as a second crew member sharing the same journal file.
    fn run_as_crew(&self, args: &[&str]) -> Output {
        self.command(args)
            .env("VOYAGE_USER", CREW_USER)
            .output()
            .expect("run voyage")
    }

    fn init(&self) {
        let itinerary = self.itinerary_path();
        let output = self.run(&[
            "init",
            "--no-input",
            "--display-name",
            "Skipper",
            "--itinerary",
            &itinerary.to_string_lossy(),
            "--timezone",
            "Europe/Athens",
        ]);
        assert_success(&output, "init");
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.base);
    }
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: stdout={}, stderr={}",
        what,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("parse json output")
}

fn plain_value(output: &Output, key: &str) -> String {
    let prefix = format!("{}=", key);
    stdout(output)
        .lines()
        .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
        .unwrap_or_else(|| panic!("missing {} in output: {}", key, stdout(output)))
}

fn open_sqlite_from_file(path: &Path, passphrase: &str) -> Connection {
    let encrypted = std::fs::read(path).expect("read should succeed");
    let plaintext = voyage_core::storage::encryption::decrypt(&encrypted, passphrase)
        .expect("decrypt should succeed");

    let size: i32 = plaintext
        .len()
        .try_into()
        .expect("payload length should fit in sqlite3_malloc");
    let raw = unsafe { rusqlite::ffi::sqlite3_malloc(size) as *mut u8 };
    if raw.is_null() {
        panic!("sqlite3_malloc returned null");
    }

    let owned = unsafe {
        std::ptr::copy_nonoverlapping(plaintext.as_ptr(), raw, plaintext.len());
        let ptr = NonNull::new(raw).expect("nonnull");
        OwnedData::from_raw_nonnull(ptr, plaintext.len())
    };

    let mut conn = Connection::open_in_memory().expect("open_in_memory should succeed");
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .expect("pragma should succeed");
    conn.deserialize(DatabaseName::Main, owned, false)
        .expect("deserialize should succeed");
    conn
}

#[test]
fn test_cli_init_writes_config_and_journal() {
    let env = TestEnv::new("init");
    env.init();

    assert!(env.journal_path().exists(), "journal file should exist");
    let config = std::fs::read_to_string(env.config_path()).expect("read config");
    let value: toml::Value = toml::from_str(&config).expect("parse config");
    assert_eq!(
        value["session"]["display_name"].as_str(),
        Some("Skipper")
    );
    assert_eq!(value["ui"]["timezone"].as_str(), Some("Europe/Athens"));
    assert!(value["itinerary"]["path"]
        .as_str()
        .expect("itinerary path")
        .ends_with("stops.json"));
    let user_id = value["session"]["user_id"].as_str().expect("user id");
    assert!(uuid::Uuid::parse_str(user_id).is_ok());

    // Re-running init keeps the same user so existing rows stay owned.
    let second = env.base.join("second.journal");
    let init = env.run(&["init", "--no-input", &second.to_string_lossy()]);
    assert_success(&init, "second init");
    assert!(second.exists());
    let again: toml::Value =
        toml::from_str(&std::fs::read_to_string(env.config_path()).expect("read config"))
            .expect("parse config");
    assert_eq!(again["session"]["user_id"].as_str(), Some(user_id));
}

#[test]
fn test_cli_stops_and_stop() {
    let env = TestEnv::new("stops");
    env.init();

    let stops = env.run(&["stops", "--json"]);
    assert_success(&stops, "stops");
    let value = json(&stops);
    let array = value.as_array().expect("stops array");
    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["name"], "Lefkada");
    assert_eq!(array[0]["distanceToNext"], 42.5);

    let filtered = env.run(&["stops", "kot"]);
    assert_success(&filtered, "stops kot");
    let output = stdout(&filtered);
    assert!(output.contains("Kotor"));
    assert!(!output.contains("Lefkada"));

    let stop = env.run(&["stop", "1", "--json"]);
    assert_success(&stop, "stop");
    let value = json(&stop);
    assert_eq!(value["marinaName"], "Lefkas Marina");
    assert_eq!(value["phaseInfo"]["name"], "Ionian");

    let missing = env.run(&["stop", "99"]);
    assert_eq!(missing.status.code(), Some(3));
}

#[test]
fn test_cli_add_list_show() {
    let env = TestEnv::new("add");
    env.init();

    let add = env.run(&[
        "add",
        "1",
        "--title",
        "Arrived in Lefkada",
        "--body",
        "Calm crossing.\n\nDinner at the harbour.",
        "--mood",
        "Great",
        "--weather",
        "sunny",
    ]);
    assert_success(&add, "add");
    let entry_id = plain_value(&add, "entry_id");
    assert_eq!(plain_value(&add, "stop_id"), "1");
    assert_eq!(plain_value(&add, "is_public"), "false");

    let list = env.run(&["list", "--json"]);
    assert_success(&list, "list");
    let value = json(&list);
    let array = value.as_array().expect("list array");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["id"], entry_id.as_str());
    assert_eq!(array[0]["stop_name"], "Lefkada");
    assert_eq!(array[0]["mood"], "great");
    let blocks = array[0]["blocks"].as_array().expect("blocks");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["type"], "text");
    assert_eq!(blocks[1]["content"], "Dinner at the harbour.");

    let show = env.run(&["show", &entry_id[..8]]);
    assert_success(&show, "show");
    let output = stdout(&show);
    assert!(output.contains("title=Arrived in Lefkada"));
    assert!(output.contains("Calm crossing."));
    assert!(output.contains("block 2 text"));
    assert!(output.contains("visibility=private"));
}

#[test]
fn test_cli_add_rejects_unknown_stop_and_mood() {
    let env = TestEnv::new("add_bad");
    env.init();

    let add = env.run(&["add", "42", "--title", "Nowhere", "--body", "x"]);
    assert_eq!(add.status.code(), Some(3));
    assert!(stderr(&add).contains("Stop not found: 42"));

    let add = env.run(&["add", "1", "--title", "Meh", "--body", "x", "--mood", "grumpy"]);
    assert_eq!(add.status.code(), Some(4));
    assert!(stderr(&add).contains("grumpy"));
}

#[test]
fn test_cli_entry_arguments_do_not_replace_journal_path() {
    let env = TestEnv::new("entry-args");
    env.init();
    let journal = env.journal_path().to_string_lossy().to_string();

    let add = env.run(&["add", "1", "--title", "Lefkas", "--body", "Calm", "--public"]);
    assert_success(&add, "add");
    let entry_id = plain_value(&add, "entry_id");

    let photo = env.run(&[
        "--journal", &journal, "photo", "add", "1", "quay.png", "--entry", &entry_id,
    ]);
    assert_success(&photo, "photo add --entry");

    let photos = env.run(&["photo", "list", "--entry", &entry_id[..8], "--json"]);
    assert_success(&photos, "photo list --entry");
    let value = json(&photos);
    assert_eq!(value.as_array().expect("photo array").len(), 1);
    assert_eq!(value[0]["journal_id"], entry_id.as_str());

    let comment = env.run(&["--journal", &journal, "comment", "add", &entry_id, "Nice quay"]);
    assert_success(&comment, "comment add");
    let threads = env.run(&["comment", "list", &entry_id, "--json"]);
    assert_success(&threads, "comment list");
    assert_eq!(json(&threads)[0]["comment"]["content"], "Nice quay");
}

#[test]
fn test_cli_photos_and_block_editing() {
    let env = TestEnv::new("photos");
    env.init();

    let photo = env.run(&[
        "photo",
        "add",
        "2",
        "IMG_0042.JPG",
        "--caption",
        "Bay of Kotor",
        "--session",
        "draft-1",
    ]);
    assert_success(&photo, "photo add");
    let photo_id = plain_value(&photo, "photo_id");
    let storage_path = plain_value(&photo, "storage_path");
    assert!(storage_path.contains("/2/"));
    assert!(storage_path.ends_with(".jpg"));

    let add = env.run(&[
        "add",
        "2",
        "--title",
        "Kotor walls",
        "--body",
        "Climbed to the fortress.",
        "--photo",
        &photo_id[..8],
    ]);
    assert_success(&add, "add with photo");
    let entry_id = plain_value(&add, "entry_id");
    assert_eq!(plain_value(&add, "photo_count"), "1");

    let photos = env.run(&["photo", "list", "--entry", &entry_id, "--json"]);
    assert_success(&photos, "photo list");
    let value = json(&photos);
    let array = value.as_array().expect("photo array");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["journal_id"], entry_id.as_str());
    assert!(array[0]["temp_session_id"].is_null());

    // Blocks are now: 1 text, 2 photo.
    let edit = env.run(&[
        "edit",
        &entry_id,
        "--caption",
        "2",
        "From the fortress",
        "--append",
        "Gelato after.",
    ]);
    assert_success(&edit, "edit caption/append");

    let show = env.run(&["show", &entry_id, "--json"]);
    assert_success(&show, "show json");
    let value = json(&show);
    let blocks = value["blocks"].as_array().expect("blocks");
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1]["type"], "photo");
    assert_eq!(blocks[1]["photoId"], photo_id.as_str());
    assert_eq!(blocks[1]["caption"], "From the fortress");
    assert_eq!(blocks[2]["content"], "Gelato after.");

    let edit = env.run(&["edit", &entry_id, "--move-up", "2"]);
    assert_success(&edit, "edit move");
    let value = json(&env.run(&["show", &entry_id, "--json"]));
    assert_eq!(value["blocks"][0]["type"], "photo");

    let edit = env.run(&["edit", &entry_id, "--remove-block", "1"]);
    assert_success(&edit, "edit remove");
    let value = json(&env.run(&["show", &entry_id, "--json"]));
    let blocks = value["blocks"].as_array().expect("blocks");
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().all(|block| block["type"] == "text"));

    let edit = env.run(&["edit", &entry_id, "--caption", "1", "nope"]);
    assert_eq!(edit.status.code(), Some(4));

    let caption = env.run(&["photo", "caption", &photo_id]);
    assert_success(&caption, "photo caption clear");
    let remove = env.run(&["photo", "remove", &photo_id]);
    assert_success(&remove, "photo remove");
    assert_eq!(plain_value(&remove, "storage_path"), storage_path);
}

#[test]
fn test_cli_search_and_empty_results() {
    let env = TestEnv::new("search");
    env.init();

    let add = env.run(&[
        "add",
        "1",
        "--title",
        "Snorkelling",
        "--body",
        "Turtles near the reef",
    ]);
    assert_success(&add, "add");

    let search = env.run(&["search", "turtles", "--json"]);
    assert_success(&search, "search");
    let value = json(&search);
    assert_eq!(value.as_array().expect("search array").len(), 1);

    let search = env.run(&["search", "glacier"]);
    assert_success(&search, "search empty");
    assert!(stdout(&search).contains("count=0"));

    let search = env.run(&["search", "  "]);
    assert_eq!(search.status.code(), Some(4));
}

#[test]
fn test_cli_visibility_comments_reactions_feed() {
    let env = TestEnv::new("social");
    env.init();

    let add = env.run(&[
        "add",
        "1",
        "--title",
        "Private log",
        "--body",
        "Engine trouble.",
    ]);
    assert_success(&add, "add private");
    let entry_id = plain_value(&add, "entry_id");

    // Another user cannot see a private entry.
    let show = env.run_as_crew(&["show", &entry_id]);
    assert_eq!(show.status.code(), Some(3));
    let comment = env.run_as_crew(&["comment", "add", &entry_id, "Hello?"]);
    assert!(!comment.status.success());

    let edit = env.run(&["edit", &entry_id, "--public"]);
    assert_success(&edit, "publish");

    let show = env.run_as_crew(&["show", &entry_id]);
    assert_success(&show, "crew show");
    let edit = env.run_as_crew(&["edit", &entry_id, "--title", "Hijacked"]);
    assert_eq!(edit.status.code(), Some(3));

    let comment = env.run_as_crew(&["comment", "add", &entry_id, "Hope it's fixed!"]);
    assert_success(&comment, "comment add");
    let comment_id = plain_value(&comment, "comment_id");

    let reply = env.run(&[
        "comment",
        "add",
        &entry_id,
        "All good now.",
        "--reply-to",
        &comment_id,
    ]);
    assert_success(&reply, "reply");
    let reply_id = plain_value(&reply, "comment_id");

    let threads = env.run(&["comment", "list", &entry_id, "--json"]);
    assert_success(&threads, "comment list");
    let value = json(&threads);
    let array = value.as_array().expect("threads");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["comment"]["content"], "Hope it's fixed!");
    assert!(array[0]["comment"]["author_name"].is_null());
    assert_eq!(array[0]["replies"][0]["comment"]["author_name"], "Skipper");

    let plain = env.run(&["comment", "list", &entry_id]);
    assert!(stdout(&plain).contains(&format!("depth=1 parent={}", comment_id)));

    // Only the author may delete a comment.
    let delete = env.run(&["comment", "delete", &comment_id]);
    assert!(!delete.status.success());
    let delete = env.run(&["comment", "delete", &reply_id]);
    assert_success(&delete, "comment delete");

    let react = env.run_as_crew(&["react", &entry_id, "heart", "--json"]);
    assert_success(&react, "react");
    let value = json(&react);
    assert_eq!(value["change"]["action"], "added");
    assert_eq!(value["reactions"]["heart"], 1);

    let react = env.run_as_crew(&["react", &entry_id, "amazed", "--json"]);
    let value = json(&react);
    assert_eq!(value["change"]["action"], "changed");
    assert_eq!(value["reactions"]["heart"], 0);
    assert_eq!(value["reactions"]["amazed"], 1);

    let react = env.run_as_crew(&["react", &entry_id, "amazed", "--json"]);
    assert_eq!(json(&react)["change"]["action"], "removed");

    let react = env.run_as_crew(&["react", &entry_id, "meh"]);
    assert_eq!(react.status.code(), Some(4));

    let feed = env.run_as_crew(&["feed", "--json"]);
    assert_success(&feed, "feed");
    let value = json(&feed);
    let items = value.as_array().expect("feed array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], entry_id.as_str());
    assert_eq!(items[0]["comment_count"], 1);
    assert_eq!(items[0]["preview"], "Engine trouble.");

    let delete = env.run(&["delete", &entry_id, "--yes"]);
    assert_success(&delete, "delete");
    let feed = env.run(&["feed"]);
    assert!(stdout(&feed).contains("count=0"));
}

#[test]
fn test_cli_delete_requires_confirmation_without_tty() {
    let env = TestEnv::new("delete");
    env.init();
    let add = env.run(&["add", "1", "--title", "Keep", "--body", "x"]);
    let entry_id = plain_value(&add, "entry_id");

    let delete = env.run(&["delete", &entry_id]);
    assert!(!delete.status.success());
    let list = json(&env.run(&["list", "--json"]));
    assert_eq!(list.as_array().expect("list").len(), 1);
}

#[test]
fn test_cli_check_and_backup() {
    let env = TestEnv::new("check");
    env.init();
    let add = env.run(&["add", "1", "--title", "Logbook", "--body", "Integrity"]);
    assert_success(&add, "add");

    let check = env.run(&["check"]);
    assert_success(&check, "check");
    assert!(stdout(&check).contains("status=ok"));

    let destination = env.base.join("backups").join("copy.journal");
    let backup = env.run(&["backup", &destination.to_string_lossy()]);
    assert_success(&backup, "backup");
    assert!(destination.exists());
    let storage =
        AgeSqliteStorage::open(&destination, PASSPHRASE).expect("backup opens with passphrase");
    storage.check_integrity().expect("backup is intact");
}

#[test]
fn test_cli_check_failure() {
    let env = TestEnv::new("check_fail");
    env.init();
    let add = env.run(&["add", "1", "--title", "Break", "--body", "Integrity break"]);
    assert_success(&add, "add");
    let entry_id = plain_value(&add, "entry_id");

    let journal_path = env.journal_path();
    let conn = open_sqlite_from_file(&journal_path, PASSPHRASE);
    conn.execute("DELETE FROM journals_fts WHERE journal_id = ?", [entry_id])
        .expect("delete fts");
    let data = conn.serialize(DatabaseName::Main).expect("serialize");
    let encrypted =
        voyage_core::storage::encryption::encrypt(data.as_ref(), PASSPHRASE).expect("encrypt");
    std::fs::write(&journal_path, encrypted).expect("write");

    let check = env.run(&["check"]);
    assert_eq!(check.status.code(), Some(6));
    let output = stderr(&check);
    assert!(output.contains("status=failed"));
    assert!(output.contains("Search index missing entries"));
    assert!(output.contains("hint="));
}

#[test]
fn test_cli_missing_config_message() {
    let env = TestEnv::new("missing_config");
    let list = env.run(&["list"]);
    assert!(!list.status.success());
    let output = stderr(&list);
    assert!(output.contains("No session user configured") || output.contains("voyage init"));

    let list = env.command(&["list"]).env("VOYAGE_USER", CREW_USER).output().expect("run");
    assert!(!list.status.success());
    let output = stderr(&list);
    assert!(output.contains("No journal configured at"));
    assert!(output.contains(&*env.config_path().to_string_lossy()));
}

#[test]
fn test_cli_missing_journal_message() {
    let env = TestEnv::new("missing_journal");
    env.init();
    let missing = env.base.join("nowhere.journal");
    let list = env.run(&["list", "--journal", &missing.to_string_lossy()]);
    assert!(!list.status.success());
    let output = stderr(&list);
    assert!(output.contains("No journal found at"));
    assert!(output.contains(&*missing.to_string_lossy()));
}

#[test]
fn test_cli_init_no_input_requires_passphrase() {
    let env = TestEnv::new("init_no_pass");
    let init = env
        .command(&["init", "--no-input"])
        .env_remove("VOYAGE_PASSPHRASE")
        .output()
        .expect("run init");
    assert!(!init.status.success());
    assert!(stderr(&init).contains("--no-input requires VOYAGE_PASSPHRASE"));
}

#[test]
fn test_cli_wrong_passphrase_exit_code() {
    let env = TestEnv::new("wrong_pass");
    env.init();
    let list = env
        .command(&["list"])
        .env("VOYAGE_PASSPHRASE", "wrong-passphrase")
        .output()
        .expect("run list");
    assert_eq!(list.status.code(), Some(5));
}

#[test]
fn test_cli_show_not_found_exit_code() {
    let env = TestEnv::new("not_found");
    env.init();
    let show = env.run(&["show", "00000000-0000-0000-0000-000000000000"]);
    assert_eq!(show.status.code(), Some(3));
    assert!(stderr(&show).contains("hint="));
}

#[test]
fn test_cli_quickstart_output() {
    let env = TestEnv::new("quickstart");
    let output = env.run(&[]);
    assert_success(&output, "quickstart");
    assert!(stdout(&output).contains("Quickstart:"));
}

#[test]
fn test_cli_invalid_args_exit_code() {
    let output = Command::new(bin()).arg("add").output().expect("run add");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:") || stderr.contains("error:"));
}
