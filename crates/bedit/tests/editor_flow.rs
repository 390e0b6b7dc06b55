use bedit::{App, Config, ScriptedConsole};
use tempfile::TempDir;

fn app(config: &Config, lines: &[&str]) -> App<ScriptedConsole> {
    App::new(config, ScriptedConsole::new(lines.iter().copied()))
}

#[tokio::test]
async fn insert_between_lines_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hello.bas");
    std::fs::write(&path, "10 PRINT \"HELLO\"\n20 GOTO 10\n").unwrap();

    let mut config = Config::default();
    config.editor.gap = 100;
    let mut app = app(
        &config,
        &["150 PRINT \"WORLD\"", "list", "listr 2", "save", "quit"],
    );
    app.open(path.clone()).await;
    app.run().await.unwrap();

    assert_eq!(
        app.console.output(),
        vec![
            "[100] 10 PRINT \"HELLO\"",
            "[150] PRINT \"WORLD\"",
            "[200] 20 GOTO 10",
            "[2] PRINT \"WORLD\"",
        ]
    );
    assert!(app.console.errors().is_empty());
    assert!(!app.is_modified());

    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        saved.lines().collect::<Vec<_>>(),
        vec!["10 PRINT \"HELLO\"", "PRINT \"WORLD\"", "20 GOTO 10"]
    );
}

#[tokio::test]
async fn make_room_then_fill_it() {
    let mut app = app(
        &Config::default(),
        &["10 A", "11 B", "pushf 11 9", "15 between", "list", "quit", "y"],
    );
    app.run().await.unwrap();

    assert_eq!(app.console.output(), vec!["[10] A", "[15] between", "[20] B"]);
    assert!(app.should_quit());
}

#[cfg(unix)]
#[tokio::test]
async fn exec_streams_shell_output() {
    let mut app = app(
        &Config::default(),
        &["exec echo one; echo two", "quit", "yes"],
    );
    app.run().await.unwrap();

    assert_eq!(app.console.output(), vec!["one", "two"]);
    assert!(app.console.has_message("exited with code 0"));
    assert!(app.should_quit());
}
