use crate::{welcome_message, ExploreResponse, FileStage, GraphClient, GraphError};
use quill_core::{Clock, OperationKind, RequestOutcome, Session, UserProfile};
use quill_security::{check_gate, GateDecision, LoginRedirect, SessionContext, SessionProvider};
use reqwest::StatusCode;
use std::future::Future;
use std::sync::Arc;
use url::Url;

/// Result of a gated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<T> {
    /// The request was issued and settled.
    Completed(T),
    /// The session was stale; nothing was sent and sign-in was started instead.
    Reauthenticate(LoginRedirect),
}

impl<T> Dispatch<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Reauthenticate(_) => None,
        }
    }
}

/// Issues one Graph request per call, each behind the session gate.
///
/// Nothing here retries, cancels, or deduplicates: two calls in flight for the
/// same operation are two requests, and each settles its own outcome.
pub struct Dispatcher {
    graph: GraphClient,
    provider: Arc<dyn SessionProvider>,
    clock: Arc<dyn Clock>,
    upload_folder: String,
}

impl Dispatcher {
    pub fn new(
        graph: GraphClient,
        provider: Arc<dyn SessionProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            graph,
            provider,
            clock,
            upload_folder: "Documents".to_string(),
        }
    }

    pub fn with_upload_folder(mut self, folder: impl Into<String>) -> Self {
        self.upload_folder = folder.into();
        self
    }

    pub async fn login(&self) -> Result<LoginRedirect, GraphError> {
        Ok(self.provider.login().await?)
    }

    /// Signs out with the provider, then drops all local session state.
    pub async fn logout(&self, ctx: &mut SessionContext) -> Result<(), GraphError> {
        self.provider.logout().await?;
        ctx.teardown()?;
        Ok(())
    }

    /// Runs `request` with the current session if it is fresh, otherwise
    /// starts sign-in without touching the network.
    async fn gated<'c, T, F, Fut>(
        &self,
        ctx: &'c SessionContext,
        operation: OperationKind,
        request: F,
    ) -> Result<Dispatch<T>, GraphError>
    where
        F: FnOnce(&'c Session) -> Fut,
        Fut: Future<Output = T>,
    {
        match check_gate(ctx, self.clock.now()) {
            GateDecision::Proceed(session) => Ok(Dispatch::Completed(request(session).await)),
            GateDecision::Reauthenticate => {
                tracing::info!(%operation, "session expired; redirecting to sign-in");
                Ok(Dispatch::Reauthenticate(self.provider.login().await?))
            }
        }
    }

    /// Loads the user's profile once per session.
    ///
    /// A cached profile is returned as is. With no cached profile and a fresh
    /// session, `/me` is fetched and cached. A stale session yields `None`.
    pub async fn initialize_profile(
        &self,
        ctx: &mut SessionContext,
    ) -> Result<Option<UserProfile>, GraphError> {
        let session = match check_gate(ctx, self.clock.now()) {
            GateDecision::Proceed(session) => session.clone(),
            GateDecision::Reauthenticate => return Ok(None),
        };
        if let Some(profile) = ctx.profile() {
            return Ok(Some(profile.clone()));
        }

        let profile = UserProfile::from(self.graph.me(&session).await?);
        ctx.remember_profile(profile.clone())?;
        tracing::info!(email = %profile.email, "profile cached");
        Ok(Some(profile))
    }

    /// Sends the welcome message to the signed-in user.
    ///
    /// Completes with the address the message was sent to, whatever the
    /// status; `outcome` says whether Graph accepted it. `None` means there was
    /// no cached profile to address.
    pub async fn send_mail(
        &self,
        ctx: &SessionContext,
        outcome: &mut RequestOutcome,
    ) -> Result<Dispatch<Option<String>>, GraphError> {
        let profile = ctx.profile().cloned();
        self.gated(ctx, OperationKind::SendMail, |session| async move {
            outcome.reset();
            let Some(profile) = profile else {
                tracing::warn!("send_mail without a cached profile; nothing to address");
                outcome.settle(false);
                return None;
            };

            let request = welcome_message(&profile);
            let email_address_sent = profile.email;
            match self.graph.send_mail(session, &request).await {
                Ok(status) => {
                    let accepted = status == StatusCode::ACCEPTED;
                    if accepted {
                        tracing::info!(to = %email_address_sent, "mail accepted");
                    } else {
                        tracing::warn!(%status, "mail request was not accepted");
                    }
                    outcome.settle(accepted);
                }
                Err(err) => {
                    tracing::warn!("mail request failed: {err}");
                    outcome.settle(false);
                }
            }
            Some(email_address_sent)
        })
        .await
    }

    /// Uploads the staged file (or the default document) to the drive folder.
    ///
    /// Completes with the item's `webUrl` when the upload succeeded and one was returned.
    pub async fn upload_file(
        &self,
        ctx: &SessionContext,
        stage: &FileStage,
        outcome: &mut RequestOutcome,
    ) -> Result<Dispatch<Option<Url>>, GraphError> {
        self.gated(ctx, OperationKind::UploadFile, |session| async move {
            outcome.reset();
            let file = match stage.resolve() {
                Ok(file) => file,
                Err(err) => {
                    tracing::warn!("could not prepare upload: {err}");
                    outcome.settle(false);
                    return None;
                }
            };

            match self
                .graph
                .upload_file(session, &self.upload_folder, &file)
                .await
            {
                Ok(item) => {
                    tracing::info!(
                        name = %file.name,
                        web_url = item.web_url.as_ref().map(Url::as_str).unwrap_or_default(),
                        "upload finished"
                    );
                    outcome.settle(true);
                    item.web_url
                }
                Err(err) => {
                    tracing::warn!(name = %file.name, "upload failed: {err}");
                    outcome.settle(false);
                    None
                }
            }
        })
        .await
    }

    /// POSTs a caller-supplied body to a caller-supplied Graph URL.
    ///
    /// Only 202 Accepted settles the outcome as a success.
    pub async fn explore(
        &self,
        ctx: &SessionContext,
        target: &str,
        body: &str,
        outcome: &mut RequestOutcome,
    ) -> Result<Dispatch<Option<ExploreResponse>>, GraphError> {
        self.gated(ctx, OperationKind::ExploreGraph, |session| async move {
            outcome.reset();
            match self.graph.explore(session, target, body).await {
                Ok(response) => {
                    let succeeded = response.status == StatusCode::ACCEPTED;
                    if !succeeded {
                        tracing::warn!(
                            status = %response.status,
                            graph_url = target,
                            "explore request rejected"
                        );
                    }
                    outcome.settle(succeeded);
                    Some(response)
                }
                Err(err) => {
                    tracing::warn!(graph_url = target, "explore request failed: {err}");
                    outcome.settle(false);
                    None
                }
            }
        })
        .await
    }
}
