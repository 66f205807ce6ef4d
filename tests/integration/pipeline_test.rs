//! End-to-end pipeline tests against in-memory doubles.
//!
//! These run without a database or network.

use pretty_assertions::assert_eq;
use sqlchat::chat::{
    ConversationTurn, Session, TurnOutcome, EMPTY_QUERY_MESSAGE, ERROR_PREFIX, GREETING,
};
use sqlchat::config::ConnectionConfig;
use sqlchat::db::{Column, ColumnInfo, MockDatabaseClient, QueryResult, Schema, Table, Value};
use sqlchat::llm::MockLlmClient;
use std::sync::Arc;

fn rank_schema() -> Schema {
    let mut table = Table::new("rank");
    table.columns = vec![
        Column::new("player_id", "int"),
        Column::new("position", "int").nullable(true),
    ];
    table.primary_key = vec!["player_id".to_string()];
    table.sample_rows = vec![
        vec![Value::Int(1), Value::Int(3)],
        vec![Value::Int(2), Value::Int(1)],
    ];

    let mut schema = Schema::new();
    schema.tables.push(table);
    schema
}

fn connected(llm: MockLlmClient, db: MockDatabaseClient) -> (Session, Arc<MockDatabaseClient>) {
    let db = Arc::new(db);
    let mut session = Session::new(Box::new(llm));
    session.attach(db.clone(), "root@localhost:3306/league");
    (session, db)
}

fn assert_alternating(turns: &[ConversationTurn]) {
    assert_eq!(turns[0], ConversationTurn::Assistant(GREETING.to_string()));
    for (i, turn) in turns.iter().enumerate().skip(1) {
        let expect_user = i % 2 == 1;
        assert_eq!(
            matches!(turn, ConversationTurn::User(_)),
            expect_user,
            "turn {i} out of order: {turn:?}"
        );
    }
}

#[tokio::test]
async fn test_rank_table_example() {
    let db = MockDatabaseClient::with_schema(rank_schema()).with_result(
        "FROM `rank`",
        QueryResult::with_data(
            vec![ColumnInfo::new("COUNT(*)", "BIGINT")],
            vec![vec![Value::Int(42)]],
        ),
    );
    let llm = MockLlmClient::new()
        .then_reply("SELECT COUNT(*) FROM rank;")
        .then_reply("There are 42 rows in the rank table.");
    let observer = llm.clone();
    let (mut session, db) = connected(llm, db);

    let outcome = session
        .ask("How many rows in rank table?")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        outcome,
        TurnOutcome::Answered("There are 42 rows in the rank table.".to_string())
    );
    assert_eq!(db.executed_queries(), vec!["SELECT COUNT(*) FROM `rank`;"]);
    assert_eq!(db.schema_fetches(), 2);

    let prompts = observer.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("CREATE TABLE `rank`"));
    assert!(prompts[0].contains("2 rows from rank table:"));
    assert!(prompts[0].contains("Question: How many rows in rank table?"));
    assert!(prompts[1].contains("SQL Query: SELECT COUNT(*) FROM `rank`;"));
    assert!(prompts[1].ends_with("SQL Response: [(42,)]"));

    assert_eq!(
        session.history().turns(),
        &[
            ConversationTurn::Assistant(GREETING.to_string()),
            ConversationTurn::User("How many rows in rank table?".to_string()),
            ConversationTurn::Assistant("There are 42 rows in the rank table.".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_history_grows_by_two_per_question() {
    let llm = MockLlmClient::new()
        .then_reply("SELECT 1")
        .then_reply("one")
        .then_reply("")
        .then_fail("rate limited")
        .then_reply("SELECT * FROM missing")
        .then_reply("SELECT 2")
        .then_fail("overloaded");
    let db = MockDatabaseClient::new().with_error("missing", "Table 'league.missing' doesn't exist");
    let (mut session, _db) = connected(llm, db);

    let questions = ["q1", "q2", "q3", "q4", "q5", "q6"];
    for (n, question) in questions.iter().enumerate() {
        session.ask(question).await.unwrap();
        assert_eq!(session.history().len(), 1 + 2 * (n + 1));
    }

    assert_alternating(session.history().turns());
}

#[tokio::test]
async fn test_failures_are_prefixed_and_recorded_once() {
    let db = MockDatabaseClient::new().with_error("missing", "Table 'league.missing' doesn't exist");
    let llm = MockLlmClient::new().then_reply("SELECT * FROM missing");
    let (mut session, db) = connected(llm, db);

    let outcome = session.ask("show missing").await.unwrap().unwrap();

    assert!(outcome.is_failure());
    assert_eq!(
        outcome.message(),
        format!("{ERROR_PREFIX}Query error: Table 'league.missing' doesn't exist")
    );
    assert_eq!(db.executed_queries().len(), 1);
    assert_eq!(
        session.history().last(),
        Some(&ConversationTurn::Assistant(outcome.message().to_string()))
    );
    assert_eq!(session.history().len(), 3);
}

#[tokio::test]
async fn test_empty_synthesis_never_executes() {
    let llm = MockLlmClient::new().then_reply("\n\n");
    let (mut session, db) = connected(llm, MockDatabaseClient::new());

    let outcome = session.ask("gibberish").await.unwrap().unwrap();

    assert_eq!(outcome, TurnOutcome::EmptyQuery(EMPTY_QUERY_MESSAGE.to_string()));
    assert!(db.executed_queries().is_empty());
    assert_eq!(session.history().len(), 3);
}

#[tokio::test]
async fn test_follow_up_question_sees_previous_answer() {
    let llm = MockLlmClient::new()
        .then_reply("SELECT COUNT(*) FROM rank")
        .then_reply("42 rows.");
    let observer = llm.clone();
    let (mut session, _db) = connected(llm, MockDatabaseClient::with_schema(rank_schema()));

    session.ask("How many rows in rank table?").await.unwrap();
    session.ask("And how many have a position?").await.unwrap();

    let prompts = observer.prompts();
    let follow_up = &prompts[2];
    assert!(follow_up.contains("User: How many rows in rank table?\nAssistant: 42 rows.\nUser: And how many have a position?"));
}

#[tokio::test]
async fn test_missing_field_never_reaches_driver() {
    let mut session = Session::new(Box::new(MockLlmClient::new()));

    for field in ConnectionConfig::FIELDS {
        let mut form = ConnectionConfig {
            password: "pw".into(),
            database: "league".into(),
            ..Default::default()
        };
        form.set_field(field, "").unwrap();

        let err = session.connect(&form).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Connection error: All fields are required to connect to the database."
        );
    }

    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_question_before_connect_is_rejected() {
    let llm = MockLlmClient::new();
    let observer = llm.clone();
    let mut session = Session::new(Box::new(llm));

    let err = session.ask("How many rows?").await.unwrap_err();

    assert_eq!(err.to_string(), "Please connect to the database first!");
    assert_eq!(session.history().len(), 1);
    assert_eq!(observer.call_count(), 0);
}
