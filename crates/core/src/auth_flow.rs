//! Interactive authorization flow
//!
//! Collects the backend host, hands the user an authorization URL and
//! exchanges the pasted redirect for the initial credential set:
//!
//! ```text
//! AwaitingHost --host ok--> AwaitingRedirect --redirect ok--> Authorized
//!      ^  |                       ^  |
//!      +--+ cannot_connect        +--+ invalid_auth_redirect
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crewconnect_domain::constants::{
    FORM_ERROR_BASE, PLACEHOLDER_AUTH_URL, STEP_AUTHORIZE, STEP_USER,
};
use crewconnect_domain::{CredentialRecord, CrewConnectError, EntryData, Result};
use tracing::{info, instrument, warn};

use crate::client::ports::{ClientAuth, ClientConnector, CrewConnectClient};

/// Where the flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    AwaitingHost,
    AwaitingRedirect,
    Authorized,
}

/// Form to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowForm {
    pub step_id: &'static str,
    /// Field name → error code.
    pub errors: BTreeMap<String, String>,
    pub description_placeholders: BTreeMap<String, String>,
}

impl FlowForm {
    fn new(step_id: &'static str) -> Self {
        Self { step_id, errors: BTreeMap::new(), description_placeholders: BTreeMap::new() }
    }

    fn with_error(mut self, code: &str) -> Self {
        self.errors.insert(FORM_ERROR_BASE.to_string(), code.to_string());
        self
    }

    fn with_auth_url(mut self, url: String) -> Self {
        self.description_placeholders.insert(PLACEHOLDER_AUTH_URL.to_string(), url);
        self
    }

    /// Error code reported for the whole form
    pub fn base_error(&self) -> Option<&str> {
        self.errors.get(FORM_ERROR_BASE).map(String::as_str)
    }

    /// Authorization URL shown on the `authorize` step
    pub fn auth_url(&self) -> Option<&str> {
        self.description_placeholders.get(PLACEHOLDER_AUTH_URL).map(String::as_str)
    }
}

/// Outcome of one flow step
#[derive(Debug, Clone, PartialEq)]
pub enum FlowResult {
    ShowForm(FlowForm),
    /// Terminal: persist a config entry with this title and data.
    CreateEntry { title: String, data: EntryData },
}

/// Multi-step authorization of a new account
pub struct AuthorizationFlow {
    connector: Arc<dyn ClientConnector>,
    step: FlowStep,
    client: Option<Arc<dyn CrewConnectClient>>,
}

impl AuthorizationFlow {
    /// Flow that connects clients through `connector`
    pub fn new(connector: Arc<dyn ClientConnector>) -> Self {
        Self { connector, step: FlowStep::AwaitingHost, client: None }
    }

    /// Step the flow is waiting on
    pub const fn step(&self) -> FlowStep {
        self.step
    }

    /// Form asking for the backend host
    pub fn start(&self) -> FlowResult {
        FlowResult::ShowForm(FlowForm::new(STEP_USER))
    }

    /// Connect to `host` in manual-auth mode.
    ///
    /// A host that cannot be reached re-shows the host form with
    /// `cannot_connect`.
    ///
    /// # Errors
    /// Returns `Validation` outside `AwaitingHost`; other client errors
    /// propagate.
    #[instrument(skip(self))]
    pub async fn submit_host(&mut self, host: &str) -> Result<FlowResult> {
        self.expect_step(FlowStep::AwaitingHost)?;

        let client = match self.connector.connect(host.trim(), ClientAuth::Manual).await {
            Ok(client) => client,
            Err(err @ CrewConnectError::Connection(_)) => {
                warn!(error = %err, "Cannot connect to host");
                return Ok(FlowResult::ShowForm(FlowForm::new(STEP_USER).with_error(
                    err.form_error_code().unwrap_or("cannot_connect"),
                )));
            }
            Err(err) => return Err(err),
        };

        let auth_url = client.generate_auth_url().await?;
        self.client = Some(client);
        self.step = FlowStep::AwaitingRedirect;

        Ok(FlowResult::ShowForm(FlowForm::new(STEP_AUTHORIZE).with_auth_url(auth_url)))
    }

    /// Exchange the pasted redirect for tokens.
    ///
    /// An invalid or expired redirect re-shows the authorize form with
    /// `invalid_auth_redirect` and a freshly generated URL.
    ///
    /// # Errors
    /// Returns `Validation` outside `AwaitingRedirect`; other client errors
    /// propagate.
    #[instrument(skip(self, redirect))]
    pub async fn submit_redirect(&mut self, redirect: &str) -> Result<FlowResult> {
        self.expect_step(FlowStep::AwaitingRedirect)?;
        let client = self
            .client
            .clone()
            .ok_or_else(|| CrewConnectError::Internal("authorize step without a client".into()))?;

        let session = match client.authenticate_from_redirect(redirect.trim()).await {
            Ok(session) => session,
            Err(err @ CrewConnectError::InvalidRedirect(_)) => {
                warn!(error = %err, "Authorization redirect rejected");
                let auth_url = client.generate_auth_url().await?;
                return Ok(FlowResult::ShowForm(
                    FlowForm::new(STEP_AUTHORIZE)
                        .with_error(err.form_error_code().unwrap_or("invalid_auth_redirect"))
                        .with_auth_url(auth_url),
                ));
            }
            Err(err) => return Err(err),
        };

        let record = CredentialRecord {
            host: client.host().to_string(),
            apm_token: session.apm_token,
            okta_token: session.okta_token,
        };
        self.step = FlowStep::Authorized;
        self.client = None;
        info!(user_id = %session.user_id, host = %record.host, "Account authorized");

        Ok(FlowResult::CreateEntry { title: session.user_id, data: record.into_entry_data() })
    }

    fn expect_step(&self, expected: FlowStep) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CrewConnectError::Validation(format!(
                "flow is in {:?}, expected {:?}",
                self.step, expected
            )))
        }
    }
}
