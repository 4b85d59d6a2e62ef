pub mod db;
pub mod extract;
pub mod mailer;
pub mod summarizer_llm;

pub use db::DbAdapter;
pub use mailer::LogMailer;
pub use summarizer_llm::OpenAiSummaryAdapter;
