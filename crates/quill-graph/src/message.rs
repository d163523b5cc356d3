use quill_core::UserProfile;
use serde::Serialize;

pub const WELCOME_SUBJECT: &str =
    "Welcome to Microsoft Graph development with Rust and the Quill sample";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    pub message: MailMessage,
    pub save_to_sent_items: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub subject: String,
    pub body: ItemBody,
    pub to_recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: BodyType,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Text,
    Html,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The fixed welcome message, addressed to the signed-in user.
pub fn welcome_message(profile: &UserProfile) -> SendMailRequest {
    SendMailRequest {
        message: MailMessage {
            subject: WELCOME_SUBJECT.to_string(),
            body: ItemBody {
                content_type: BodyType::Html,
                content: welcome_html(&profile.display_name),
            },
            to_recipients: vec![Recipient {
                email_address: EmailAddress {
                    address: profile.email.clone(),
                    name: None,
                },
            }],
        },
        save_to_sent_items: true,
    }
}

fn welcome_html(display_name: &str) -> String {
    format!(
        "<html><head><meta http-equiv='Content-Type' content='text/html; charset=utf-8'>\
         <title></title></head><body style='font-family:calibri'>\
         <p>Congratulations {name},</p>\
         <p>This is a message from the Quill sample. You are well on your way to \
         incorporating Microsoft Graph endpoints in your apps.</p>\
         <h3>What&#8217;s next?</h3><ul>\
         <li>Check out <a href='https://developer.microsoft.com/graph' target='_blank'>\
         the Microsoft Graph documentation</a> for the full API surface.</li>\
         <li>Use the <a href='https://developer.microsoft.com/graph/graph-explorer' \
         target='_blank'>Graph Explorer</a> to try other requests.</li></ul>\
         <p>Thanks and happy coding!</p></body></html>",
        name = ammonia::clean_text(display_name)
    )
}
