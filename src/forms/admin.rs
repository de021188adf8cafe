use secrecy::{ExposeSecret, SecretString};

use super::{required, FormStatus, SubmitOutcome};
use crate::api::ContentClient;
use crate::telemetry;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminLoginErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct AdminLoginForm {
    pub email: String,
    pub password: SecretString,
    pub errors: AdminLoginErrors,
    pub status: FormStatus,
}

impl AdminLoginForm {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
            errors: AdminLoginErrors::default(),
            status: FormStatus::default(),
        }
    }

    pub fn validate(&mut self) -> bool {
        self.errors = AdminLoginErrors {
            email: required(&self.email, "email is required"),
            password: required(self.password.expose_secret(), "Password is required"),
        };
        self.errors == AdminLoginErrors::default()
    }

    /// Returns the issued token on success. Only a successful login clears
    /// the password.
    pub async fn submit(&mut self, client: &ContentClient) -> Option<SecretString> {
        if self.status.is_loading {
            telemetry::record_submission("admin_login", SubmitOutcome::Busy.as_str());
            return None;
        }
        self.status.clear_messages();
        if !self.validate() {
            telemetry::record_submission("admin_login", SubmitOutcome::Invalid.as_str());
            return None;
        }
        let result = self
            .status
            .while_loading(client.admin_login(self.email.trim(), &self.password))
            .await;
        match result {
            Ok(token) => {
                self.password = empty_secret();
                telemetry::record_submission("admin_login", SubmitOutcome::Succeeded.as_str());
                tracing::info!(email = %self.email.trim(), "admin logged in");
                Some(token)
            }
            Err(err) => {
                telemetry::record_submission("admin_login", SubmitOutcome::Failed.as_str());
                self.status.fail(err.user_message(LOGIN_FAILED));
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRegisterErrors {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct AdminRegisterForm {
    pub username: String,
    pub password: SecretString,
    pub errors: AdminRegisterErrors,
    pub status: FormStatus,
}

impl AdminRegisterForm {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            errors: AdminRegisterErrors::default(),
            status: FormStatus::default(),
        }
    }

    pub fn validate(&mut self) -> bool {
        let password = self.password.expose_secret();
        self.errors = AdminRegisterErrors {
            username: required(&self.username, "Username is required"),
            password: (password.chars().count() < MIN_PASSWORD_CHARS)
                .then(|| "Password must be at least 6 characters".to_owned()),
        };
        self.errors == AdminRegisterErrors::default()
    }

    pub async fn submit(&mut self, client: &ContentClient) -> SubmitOutcome {
        let outcome = self.run_submit(client).await;
        telemetry::record_submission("admin_register", outcome.as_str());
        outcome
    }

    async fn run_submit(&mut self, client: &ContentClient) -> SubmitOutcome {
        if self.status.is_loading {
            return SubmitOutcome::Busy;
        }
        self.status.clear_messages();
        if !self.validate() {
            return SubmitOutcome::Invalid;
        }
        let result = self
            .status
            .while_loading(client.admin_register(self.username.trim(), &self.password))
            .await
            .map(|ack| ack.message_or("Admin registered successfully!"));
        if self.status.settle(result, REGISTER_FAILED) {
            self.username.clear();
            self.password = empty_secret();
            SubmitOutcome::Succeeded
        } else {
            SubmitOutcome::Failed
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}
