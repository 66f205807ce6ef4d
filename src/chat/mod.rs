//! Chat session and the question answering pipeline.

pub mod history;
pub mod pipeline;
pub mod session;

pub use history::{ConversationHistory, ConversationTurn, GREETING};
pub use pipeline::{
    rewrite_reserved_table, Executor, QuerySynthesizer, ResultExplainer, TurnOrchestrator,
    TurnOutcome, TurnStage, EMPTY_QUERY_MESSAGE, ERROR_PREFIX,
};
pub use session::{Session, NOT_CONNECTED_MESSAGE};
