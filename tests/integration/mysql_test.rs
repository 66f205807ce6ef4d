//! MySQL integration tests.
//!
//! Skipped unless DATABASE_URL points at a MySQL server. The tests create and
//! drop their own tables.

use sqlchat::chat::{Session, TurnOutcome};
use sqlchat::config::ConnectionConfig;
use sqlchat::db::{self, DatabaseClient, MySqlClient, Value};
use sqlchat::llm::MockLlmClient;

/// Helper to get the test connection form from the environment.
fn get_test_form() -> Option<ConnectionConfig> {
    let url = std::env::var("DATABASE_URL").ok()?;
    ConnectionConfig::from_connection_string(&url).ok()
}

/// Helper to create a test client.
async fn get_test_client() -> Option<MySqlClient> {
    let form = get_test_form()?;
    MySqlClient::connect(&form).await.ok()
}

#[tokio::test]
async fn test_execute_simple_select() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query("SELECT 1 AS num, 'hello' AS greeting")
        .await
        .unwrap();

    assert_eq!(result.columns.len(), 2);
    assert_eq!(result.columns[0].name, "num");
    assert_eq!(result.rows, vec![vec![Value::Int(1), Value::from("hello")]]);
    assert_eq!(result.to_text(), "[(1, 'hello')]");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_syntax_error_is_query_error() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let err = client.execute_query("SELEC nothing").await.unwrap_err();
    assert_eq!(err.category(), "Query Error");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_schema_text_and_rank_rewrite() {
    let Some(form) = get_test_form() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let Ok(client) = db::connect(&form).await else {
        eprintln!("Skipping test: cannot connect to DATABASE_URL");
        return;
    };

    client
        .execute_query("DROP TABLE IF EXISTS `rank`")
        .await
        .unwrap();
    client
        .execute_query(
            "CREATE TABLE `rank` (player_id INT NOT NULL PRIMARY KEY, position INT NULL)",
        )
        .await
        .unwrap();
    let inserted = client
        .execute_query("INSERT INTO `rank` VALUES (1, 3), (2, 1), (3, NULL), (4, 2)")
        .await
        .unwrap();
    assert_eq!(inserted.to_text(), "4 rows affected");

    // SUM over an INT column comes back as DECIMAL.
    let sum = client
        .execute_query("SELECT SUM(position) FROM `rank`")
        .await
        .unwrap();
    assert_eq!(sum.to_text(), "[(6,)]");

    let schema = client.schema_info().await.unwrap();
    assert!(schema.contains("CREATE TABLE `rank`"));
    assert!(schema.contains("`player_id` int"));
    assert!(schema.contains("PRIMARY KEY (`player_id`)"));
    assert!(schema.contains("3 rows from rank table:"));

    // Unquoted `FROM rank` is a syntax error on MySQL 8; the pipeline must quote it.
    let llm = MockLlmClient::new()
        .then_reply("SELECT COUNT(*) FROM rank;")
        .then_reply("There are 4 rows.");
    let observer = llm.clone();
    let mut session = Session::new(Box::new(llm));
    session.connect(&form).await.unwrap();

    let outcome = session
        .ask("How many rows in rank table?")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome, TurnOutcome::Answered("There are 4 rows.".to_string()));
    assert!(observer.prompts()[1].ends_with("SQL Response: [(4,)]"));

    session.close().await.unwrap();
    client
        .execute_query("DROP TABLE IF EXISTS `rank`")
        .await
        .unwrap();
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_tinyint_flag_renders_as_number() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    client
        .execute_query("DROP TABLE IF EXISTS sqlchat_flags")
        .await
        .unwrap();
    client
        .execute_query("CREATE TABLE sqlchat_flags (id INT PRIMARY KEY, active TINYINT(1))")
        .await
        .unwrap();
    client
        .execute_query("INSERT INTO sqlchat_flags VALUES (1, TRUE), (2, FALSE)")
        .await
        .unwrap();

    let result = client
        .execute_query("SELECT id, active FROM sqlchat_flags ORDER BY id")
        .await
        .unwrap();
    assert_eq!(result.to_text(), "[(1, 1), (2, 0)]");

    client
        .execute_query("DROP TABLE IF EXISTS sqlchat_flags")
        .await
        .unwrap();
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_connect_with_wrong_password() {
    let Some(mut form) = get_test_form() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    form.password = "definitely-not-the-password".to_string();

    let err = db::connect(&form).await.err().unwrap();
    assert_eq!(err.category(), "Connection Error");
}
