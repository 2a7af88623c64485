use tracing::{debug, info, warn};

use crate::application::reset_token_service::PasswordResetTokenService;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{RequestPasswordResetRequest, ResetPasswordRequest};
use crate::infrastructure::mailer::{MailMessage, MailOutbox};
use crate::infrastructure::password::hash_password;

pub(crate) struct PasswordResetService<R: UserRepository> {
    repo: R,
    tokens: PasswordResetTokenService<R>,
    outbox: MailOutbox,
    reset_url_base: String,
}

impl<R: UserRepository> PasswordResetService<R> {
    pub(crate) fn new(
        repo: R,
        tokens: PasswordResetTokenService<R>,
        outbox: MailOutbox,
        reset_url_base: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            tokens,
            outbox,
            reset_url_base: reset_url_base.into(),
        }
    }

    /// Queues a reset link when the address belongs to an account. Unknown
    /// addresses succeed silently, and delivery happens off the request path,
    /// so neither the result nor the latency reveals registered emails.
    pub(crate) async fn request_reset(
        &self,
        req: RequestPasswordResetRequest,
    ) -> Result<(), DomainError> {
        let req = req.validate()?;

        let Some(creds) = self.repo.find_by_email(&req.email).await? else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = self.tokens.issue(creds.user.id)?;
        let message = self.reset_message(&creds.user.email, &token);
        match self.outbox.enqueue(message) {
            Ok(()) => info!(user_id = creds.user.id, "password reset mail queued"),
            Err(err) => warn!(user_id = creds.user.id, error = %err, "password reset mail dropped"),
        }
        Ok(())
    }

    pub(crate) async fn reset_password(&self, req: ResetPasswordRequest) -> Result<(), DomainError> {
        let req = req.validate()?;

        let user = self
            .tokens
            .verify(&req.token)
            .await?
            .ok_or(DomainError::InvalidResetToken)?;

        let password_hash = hash_password(&req.password)?;
        let updated = self.repo.update_password(user.id, &password_hash).await?;
        if !updated {
            // deleted between verification and update
            return Err(DomainError::InvalidResetToken);
        }

        info!(user_id = user.id, "password reset completed");
        Ok(())
    }

    fn reset_message(&self, to: &str, token: &str) -> MailMessage {
        let separator = if self.reset_url_base.contains('?') {
            '&'
        } else {
            '?'
        };
        let link = format!("{}{separator}token={token}", self.reset_url_base);
        let minutes = self.tokens.ttl().num_minutes();

        MailMessage {
            to: to.to_string(),
            subject: "Password Reset Request".to_string(),
            body: format!(
                "To reset your password, visit the following link:\n{link}\n\n\
                 The link expires in {minutes} minutes. If you did not make this request, \
                 simply ignore this email and no changes will be made."
            ),
        }
    }
}
