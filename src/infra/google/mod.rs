// =============================================================================
// GOOGLE API MODULE
// =============================================================================
//
// HTTP implementations of the core forms traits.
// - `service_account_auth.rs` turns a service-account key into bearer tokens.
// - `forms_client.rs` talks to the Forms v1 API (forms, batchUpdate, responses).
// - `drive_client.rs` manages sharing permissions through Drive v3.

pub mod drive_client;
pub mod forms_client;
pub mod service_account_auth;

pub use drive_client::GoogleDriveClient;
pub use forms_client::GoogleFormsClient;
pub use service_account_auth::ServiceAccountAuth;
