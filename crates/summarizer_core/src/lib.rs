pub mod dispatch;
pub mod domain;
pub mod ports;
pub mod validation;

pub use dispatch::{bounds_for, detect_language, parse_length, ModelRegistry};
pub use domain::{
    AuthSession, GenerationBounds, Language, LengthChoice, NewSummary, Summary, SummaryPage,
    User, UserCredentials,
};
pub use ports::{DatabaseService, MailService, PortError, PortResult, SummarizationService};
pub use validation::{validate_input, InputError, MAX_INPUT_WORDS};
