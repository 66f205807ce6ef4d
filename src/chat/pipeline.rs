//! The two-stage question answering pipeline.
//!
//! One turn runs strictly in sequence: the question is turned into SQL by the
//! LLM, the SQL runs against the database, and the LLM explains the result.
//! [`TurnOrchestrator`] is the only failure boundary; every error inside a
//! turn becomes a user-facing message there.

use tracing::{debug, warn};

use crate::chat::history::ConversationHistory;
use crate::db::DatabaseClient;
use crate::error::Result;
use crate::llm::prompt::{as_messages, build_explanation_prompt, build_sql_prompt};
use crate::llm::LlmClient;

/// Reply when the model returns no SQL.
pub const EMPTY_QUERY_MESSAGE: &str = "Sorry, I couldn't generate a SQL query for that question.";

/// Prefix of the reply when any stage fails.
pub const ERROR_PREFIX: &str = "Error processing your query: ";

/// Rewrites `FROM rank` to ``FROM `rank` ``.
///
/// `rank` is a reserved word in MySQL 8. This is an exact, case-sensitive
/// substring replacement for that one table name and nothing more. Applying
/// it twice gives the same result as applying it once.
pub fn rewrite_reserved_table(sql: &str) -> String {
    sql.replace("FROM rank", "FROM `rank`")
}

/// Produces a SQL statement from the question and conversation context.
pub struct QuerySynthesizer<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> QuerySynthesizer<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Makes one LLM call and returns its response with whitespace trimmed.
    pub async fn synthesize(
        &self,
        question: &str,
        history: &ConversationHistory,
        schema: &str,
    ) -> Result<String> {
        let prompt = build_sql_prompt(schema, &history.render_for_prompt(), question);
        let response = self.llm.complete(&as_messages(prompt)).await?;
        Ok(response.trim().to_string())
    }
}

/// Runs a synthesized query and captures its textual result.
pub struct Executor<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    pub async fn execute(&self, sql: &str) -> Result<String> {
        self.db.run(sql).await
    }
}

/// Produces the natural-language answer for an executed query.
pub struct ResultExplainer<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> ResultExplainer<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Makes one LLM call and returns the raw response text.
    pub async fn explain(
        &self,
        question: &str,
        query: &str,
        response: &str,
        schema: &str,
    ) -> Result<String> {
        let prompt = build_explanation_prompt(schema, question, query, response);
        self.llm.complete(&as_messages(prompt)).await
    }
}

/// Where a turn currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Idle,
    Synthesizing,
    Executing,
    Explaining,
    Done,
    EmptyQuery,
    Failed,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The explainer's answer.
    Answered(String),
    /// The model produced no SQL.
    EmptyQuery(String),
    /// A stage failed; the text carries [`ERROR_PREFIX`] and the error.
    Failed(String),
}

impl TurnOutcome {
    /// The text shown to the user and appended to the history.
    pub fn message(&self) -> &str {
        match self {
            Self::Answered(text) | Self::EmptyQuery(text) | Self::Failed(text) => text,
        }
    }

    /// The terminal stage this outcome corresponds to.
    pub fn stage(&self) -> TurnStage {
        match self {
            Self::Answered(_) => TurnStage::Done,
            Self::EmptyQuery(_) => TurnStage::EmptyQuery,
            Self::Failed(_) => TurnStage::Failed,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Sequences synthesis, execution and explanation for one question.
pub struct TurnOrchestrator<'a> {
    db: &'a dyn DatabaseClient,
    llm: &'a dyn LlmClient,
}

impl<'a> TurnOrchestrator<'a> {
    pub fn new(db: &'a dyn DatabaseClient, llm: &'a dyn LlmClient) -> Self {
        Self { db, llm }
    }

    /// Runs one turn. Never fails: errors from any stage are folded into
    /// [`TurnOutcome::Failed`].
    pub async fn run_turn(&self, question: &str, history: &ConversationHistory) -> TurnOutcome {
        let mut stage = TurnStage::Idle;

        match self.try_run_turn(question, history, &mut stage).await {
            Ok(outcome) => {
                debug!("Turn finished: {:?} -> {:?}", stage, outcome.stage());
                outcome
            }
            Err(e) => {
                warn!("Turn failed while {:?}: {}", stage, e);
                TurnOutcome::Failed(format!("{ERROR_PREFIX}{e}"))
            }
        }
    }

    async fn try_run_turn(
        &self,
        question: &str,
        history: &ConversationHistory,
        stage: &mut TurnStage,
    ) -> Result<TurnOutcome> {
        advance(stage, TurnStage::Synthesizing);
        let schema = self.db.schema_info().await?;
        let sql = QuerySynthesizer::new(self.llm)
            .synthesize(question, history, &schema)
            .await?;

        if sql.is_empty() {
            return Ok(TurnOutcome::EmptyQuery(EMPTY_QUERY_MESSAGE.to_string()));
        }

        let sql = rewrite_reserved_table(&sql);
        debug!("Synthesized SQL: {}", sql);

        advance(stage, TurnStage::Executing);
        let response = Executor::new(self.db).execute(&sql).await?;

        advance(stage, TurnStage::Explaining);
        // Fetched again rather than reusing the synthesis-stage schema.
        let schema = self.db.schema_info().await?;
        let answer = ResultExplainer::new(self.llm)
            .explain(question, &sql, &response, &schema)
            .await?;

        Ok(TurnOutcome::Answered(answer))
    }
}

fn advance(stage: &mut TurnStage, next: TurnStage) {
    debug!("Turn stage {:?} -> {:?}", stage, next);
    *stage = next;
}
