//! Scripted REPL sessions.

use sqlchat::chat::{Session, GREETING};
use sqlchat::config::ConnectionConfig;
use sqlchat::db::MockDatabaseClient;
use sqlchat::llm::MockLlmClient;
use sqlchat::repl::Repl;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_test::io::Builder;

async fn run_script(mut repl: Repl, script: &[&[u8]]) -> (Repl, String) {
    let mut builder = Builder::new();
    for chunk in script {
        builder.read(chunk);
    }
    let reader = BufReader::new(builder.build());
    let mut output = Vec::new();

    repl.run(reader, &mut output).await.unwrap();

    (repl, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_unconnected_session_script() {
    let repl = Repl::new(
        Session::new(Box::new(MockLlmClient::new())),
        ConnectionConfig::default(),
    )
    .with_prompt(false);

    let (repl, output) = run_script(
        repl,
        &[b"How many rows?\n", b"/connect password=pw\n", b"/status\n"],
    )
    .await;

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], format!("AI: {GREETING}"));
    assert_eq!(lines[1], "Error: Please connect to the database first!");
    assert_eq!(
        lines[2],
        "Error: Connection error: All fields are required to connect to the database."
    );
    assert_eq!(lines[3], "Not connected");
    assert_eq!(
        lines[4],
        "Form: host=localhost port=3306 user=root password=(set) database="
    );
    assert_eq!(repl.session().history().len(), 1);
}

#[tokio::test]
async fn test_mock_connected_script() {
    let llm = MockLlmClient::new()
        .with_response("SQL Response:", "Mock explanation.")
        .then_reply("SELECT name FROM players");
    let mut session = Session::new(Box::new(llm));
    session.attach(Arc::new(MockDatabaseClient::new()), "mock");
    let repl = Repl::new(session, ConnectionConfig::default()).with_prompt(false);

    let (repl, output) = run_script(repl, &[b"who plays?\n", b"/quit\n"]).await;

    assert_eq!(
        output,
        format!("AI: {GREETING}\nAI: Mock explanation.\n")
    );
    assert_eq!(repl.session().history().len(), 3);
    assert!(!repl.session().is_connected());
}

#[tokio::test]
async fn test_prompt_is_written_before_each_read() {
    let repl = Repl::new(
        Session::new(Box::new(MockLlmClient::new())),
        ConnectionConfig::default(),
    );

    let (_repl, output) = run_script(repl, &[b"/help\n"]).await;

    assert!(output.starts_with(&format!("AI: {GREETING}\nYou: Type a question")));
    assert!(output.ends_with("You: "));
}
