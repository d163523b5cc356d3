use crate::browser::BrowserDialog;
use crate::cli::DocAction;
use crate::state::{dialog_options, AppState};
use anyhow::Context;
use quill_config::DialogConfig;
use quill_core::OperationKind;
use quill_document::{
    display_selected_text, handle_dialog_event, highlight_longest_word, load_sample_data,
    open_dialog, report_error, DialogEvent, DialogHost, MemoryDocument, Notification,
};
use quill_graph::{to_base64, Dispatch, StagedFile};
use quill_security::LoginRedirect;
use std::path::Path;
use url::Url;

pub async fn login(state: &AppState) -> anyhow::Result<()> {
    let redirect = state.dispatcher.login().await.context("start sign-in")?;
    show_sign_in(state, &redirect).await;
    Ok(())
}

pub async fn complete_login(state: &mut AppState, callback_url: &str) -> anyhow::Result<()> {
    state
        .provider
        .complete_login(&mut state.session, callback_url)
        .await
        .context("complete sign-in")?;
    whoami(state).await
}

pub async fn logout(state: &mut AppState) -> anyhow::Result<()> {
    state
        .dispatcher
        .logout(&mut state.session)
        .await
        .context("sign out")?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(state: &mut AppState) -> anyhow::Result<()> {
    let profile = state
        .dispatcher
        .initialize_profile(&mut state.session)
        .await
        .context("load profile")?;
    match profile {
        Some(profile) => println!("{} <{}>", profile.display_name, profile.email),
        None => println!("Not signed in or the session has expired. Run `quill login`."),
    }
    Ok(())
}

pub async fn send_mail(state: &mut AppState) -> anyhow::Result<()> {
    state
        .dispatcher
        .initialize_profile(&mut state.session)
        .await
        .context("load profile")?;
    let dispatch = state
        .dispatcher
        .send_mail(&state.session, &mut state.outcomes.send_mail)
        .await
        .context("send mail")?;

    match dispatch {
        Dispatch::Completed(Some(address)) if state.outcomes.send_mail.succeeded => {
            println!("Welcome message sent to {address}.")
        }
        Dispatch::Completed(Some(address)) => {
            println!("Graph did not accept the welcome message for {address}.")
        }
        Dispatch::Completed(None) => println!("No signed-in profile to address the message to."),
        Dispatch::Reauthenticate(redirect) => show_sign_in(state, &redirect).await,
    }
    print_outcome(state, OperationKind::SendMail);
    Ok(())
}

pub async fn upload(state: &mut AppState, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        state
            .stage
            .stage_path(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
    }
    if tracing::enabled!(tracing::Level::DEBUG) {
        if let Ok(file) = state.stage.resolve() {
            tracing::debug!("upload payload {}", payload_summary(&file));
        }
    }
    let dispatch = state
        .dispatcher
        .upload_file(&state.session, &state.stage, &mut state.outcomes.upload_file)
        .await
        .context("upload file")?;

    match dispatch {
        Dispatch::Completed(Some(web_url)) => {
            println!("Uploaded. Opening {web_url}");
            if let Some(notification) =
                open_dialog(&state.dialog, &web_url, &state.dialog_options()).await
            {
                println!("{notification}");
            }
        }
        Dispatch::Completed(None) => {}
        Dispatch::Reauthenticate(redirect) => show_sign_in(state, &redirect).await,
    }
    print_outcome(state, OperationKind::UploadFile);
    Ok(())
}

pub async fn explore(state: &mut AppState, target: &str, body: Option<&str>) -> anyhow::Result<()> {
    let dispatch = state
        .dispatcher
        .explore(
            &state.session,
            target,
            body.unwrap_or_default(),
            &mut state.outcomes.explore_graph,
        )
        .await
        .context("explore Graph")?;

    match dispatch {
        Dispatch::Completed(Some(response)) => {
            println!("HTTP {}", response.status);
            let pretty = serde_json::to_string_pretty(&response.body)
                .context("format response body")?;
            println!("{pretty}");
        }
        Dispatch::Completed(None) => {}
        Dispatch::Reauthenticate(redirect) => show_sign_in(state, &redirect).await,
    }
    print_outcome(state, OperationKind::ExploreGraph);
    Ok(())
}

pub async fn doc(action: DocAction, file: &Path, select: Option<&str>) -> anyhow::Result<()> {
    let body = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("read {}", file.display()))?;
    let document = MemoryDocument::new(body);
    if let Some(text) = select {
        if let Err(err) = document.select_text(text) {
            println!("{}", report_error(&err));
            return Ok(());
        }
    }

    match action {
        DocAction::Sample => match load_sample_data(&document).await {
            Ok(()) => {
                tokio::fs::write(file, document.body())
                    .await
                    .with_context(|| format!("write {}", file.display()))?;
                println!("{}", document.body());
            }
            Err(err) => println!("{}", report_error(&err)),
        },
        DocAction::Highlight => match highlight_longest_word(&document).await {
            Ok(Some(_)) => println!("{}", document.render_marked()),
            Ok(None) => println!("The selection has no words to highlight."),
            Err(err) => println!("{}", report_error(&err)),
        },
        DocAction::Selection => println!("{}", display_selected_text(&document).await),
    }
    Ok(())
}

pub async fn dialog(
    config: &DialogConfig,
    host: &BrowserDialog,
    code: Option<i32>,
    message: Option<String>,
) -> anyhow::Result<()> {
    let event = match (code, message) {
        (Some(code), _) => DialogEvent::Lifecycle(code),
        (None, Some(message)) => DialogEvent::Message(message),
        (None, None) => {
            if let Some(notification) = open_sign_in_dialog(host, config).await {
                println!("{notification}");
            }
            return Ok(());
        }
    };

    let reaction = handle_dialog_event(&event);
    if let Some(notification) = reaction.notification {
        println!("{notification}");
    }
    if reaction.navigate_home {
        println!("Returning to the home view.");
    }
    Ok(())
}

pub async fn open_sign_in_dialog(
    host: &dyn DialogHost,
    config: &DialogConfig,
) -> Option<Notification> {
    open_dialog(host, &config.sign_in_url, &dialog_options(config)).await
}

async fn show_sign_in(state: &AppState, redirect: &LoginRedirect) {
    println!("Sign in at:\n  {}", redirect.authorization_url);
    println!("Then run `quill complete-login <redirect-url>` with the address the browser lands on.");

    let Ok(url) = Url::parse(&redirect.authorization_url) else {
        return;
    };
    if let Some(notification) = open_dialog(&state.dialog, &url, &state.dialog_options()).await {
        println!("{notification}");
    }
}

fn payload_summary(file: &StagedFile) -> String {
    let encoded = to_base64(&file.content);
    let head: String = encoded.chars().take(16).collect();
    format!(
        "{}: {} bytes, {} base64 chars ({head}...)",
        file.name,
        file.content.len(),
        encoded.len()
    )
}

fn print_outcome(state: &AppState, kind: OperationKind) {
    let outcome = state.outcomes.get(kind);
    tracing::debug!(
        operation = %kind,
        finished = outcome.finished,
        succeeded = outcome.succeeded,
        "request outcome"
    );
    if outcome.finished {
        let status = if outcome.succeeded { "succeeded" } else { "failed" };
        println!("{kind}: {status}");
    }
}
