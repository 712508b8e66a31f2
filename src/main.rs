// This is the entry point of the quiz builder.
//
// **Architecture Overview:**
// - `core/` = Workflow logic and the traits it talks through (no HTTP)
// - `infra/` = Implementations of core traits (Google APIs, in-memory backend)
//
// This file's job is to:
// 1. Load configuration
// 2. Construct the clients (dependency injection)
// 3. Run the scenario and print the form id and the response dump

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::forms::{
    render_responses, FormsApi, PermissionsApi, QuizBuilder, QuizQuestion, QuizWorkflow,
    ResponseReader, TokenProvider,
};
use crate::infra::forms::InMemoryForms;
use crate::infra::google::{GoogleDriveClient, GoogleFormsClient, ServiceAccountAuth};
use std::sync::Arc;

const DEFAULT_FORM_TITLE: &str = "New Form Quiz";

fn scenario_question() -> QuizQuestion {
    QuizQuestion::new(
        "Which of these singers was not a member of Destiny's Child?",
        &["Kelly Rowland", "Beyoncé", "Rihanna", "Michelle Williams"],
        "Rihanna",
    )
}

async fn run_scenario<F, P, T>(
    forms: F,
    permissions: P,
    tokens: &T,
    title: &str,
) -> anyhow::Result<()>
where
    F: FormsApi + Clone,
    P: PermissionsApi,
    T: TokenProvider,
{
    let workflow = QuizWorkflow::new(
        QuizBuilder::new(forms.clone(), permissions),
        ResponseReader::new(forms),
    );

    let report = workflow.run(tokens, title, &scenario_question()).await?;

    println!("{}", report.quiz.form_id);
    if let Some(uri) = &report.quiz.responder_uri {
        tracing::info!("Quiz is live at {}", uri);
    }
    println!(
        "{}",
        render_responses(&report.responses_form_id, &report.responses)
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let title =
        std::env::var("QUIZ_FORM_TITLE").unwrap_or_else(|_| DEFAULT_FORM_TITLE.to_string());
    let offline = std::env::var("QUIZ_OFFLINE")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Every client is constructed (and checked) before the workflow starts.

    if offline {
        tracing::info!("QUIZ_OFFLINE is set, using the in-memory forms backend");
        let backend = Arc::new(InMemoryForms::new("offline-token"));
        return run_scenario(
            Arc::clone(&backend),
            Arc::clone(&backend),
            backend.as_ref(),
            &title,
        )
        .await;
    }

    let auth = ServiceAccountAuth::from_env().await?;
    tracing::info!(account = auth.client_email(), "Loaded service account");

    let forms = GoogleFormsClient::new()?;
    let drive = GoogleDriveClient::new()?;

    run_scenario(forms, drive, &auth, &title).await
}
