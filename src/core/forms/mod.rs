pub mod forms_api;
pub mod forms_models;
pub mod quiz_builder;
pub mod quiz_workflow;
pub mod response_reader;

pub use forms_api::{FormsApi, FormsError, PermissionsApi, TokenProvider};
pub use forms_models::*;
pub use quiz_builder::{BuiltQuiz, QuizBuilder, QuizQuestion};
pub use quiz_workflow::{QuizWorkflow, WorkflowReport};
pub use response_reader::{render_responses, ResponseReader};
