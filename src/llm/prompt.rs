//! Prompt construction for the two pipeline stages.
//!
//! Both templates are fixed; only the placeholders are substituted.

use crate::llm::types::Message;

/// Template for turning a question into a SQL query.
const SQL_PROMPT_TEMPLATE: &str = r#"You are a data analyst at a company. You are interacting with a user who is asking you questions about the company's database.
Based on the table schema below, write a SQL query that would answer the user's question. Take the conversation history into account.
<SCHEMA>{schema}</SCHEMA>
Conversation History: {chat_history}
Write only the SQL query and nothing else.
Question: {question}
SQL Query:"#;

/// Template for explaining a query result in natural language.
const EXPLANATION_PROMPT_TEMPLATE: &str = r#"You are a data analyst. Based on the question, SQL query, and its result, provide a natural language explanation.
<SCHEMA>{schema}</SCHEMA>
Question: {question}
SQL Query: {query}
SQL Response: {response}"#;

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so text inside them that looks
/// like a placeholder is left alone.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let replacement = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match replacement {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Renders the SQL synthesis prompt.
pub fn build_sql_prompt(schema: &str, chat_history: &str, question: &str) -> String {
    render(
        SQL_PROMPT_TEMPLATE,
        &[
            ("schema", schema),
            ("chat_history", chat_history),
            ("question", question),
        ],
    )
}

/// Renders the result explanation prompt.
pub fn build_explanation_prompt(schema: &str, question: &str, query: &str, response: &str) -> String {
    render(
        EXPLANATION_PROMPT_TEMPLATE,
        &[
            ("schema", schema),
            ("question", question),
            ("query", query),
            ("response", response),
        ],
    )
}

/// Wraps a rendered prompt as the single message of a request.
pub fn as_messages(prompt: String) -> Vec<Message> {
    vec![Message::user(prompt)]
}
