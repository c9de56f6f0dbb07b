use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvoSynthError {
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Knowledge base contains no places")]
    EmptyKnowledgeBase,

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
