use async_trait::async_trait;
use quill_document::{DialogHost, DialogOptions, DocumentError};
use url::Url;

/// Shows dialogs as system browser windows. Geometry is advisory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDialog {
    pub print_only: bool,
}

#[async_trait]
impl DialogHost for BrowserDialog {
    async fn display_dialog(
        &self,
        url: &Url,
        options: &DialogOptions,
    ) -> Result<(), DocumentError> {
        if url.scheme() != "https" && !is_loopback(url) {
            return Err(DocumentError::Dialog(
                quill_document::DialogLifecycle::HttpsRequired
                    .message()
                    .to_string(),
            ));
        }

        tracing::debug!(
            url = %url,
            height = options.height_percent,
            width = options.width_percent,
            "opening dialog in browser"
        );
        if self.print_only {
            println!("{url}");
            return Ok(());
        }

        let target = url.to_string();
        tokio::task::spawn_blocking(move || open::that(target))
            .await
            .map_err(|err| DocumentError::Dialog(err.to_string()))?
            .map_err(|err| DocumentError::Dialog(err.to_string()))
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_plain_http_outside_loopback() {
        let dialog = BrowserDialog { print_only: true };
        let url = Url::parse("http://contoso.com/page").expect("url");
        let err = dialog
            .display_dialog(&url, &DialogOptions::default())
            .await
            .expect_err("http refused");
        assert!(err.to_string().contains("HTTPS Required"));
    }

    #[tokio::test]
    async fn print_only_accepts_https() {
        let dialog = BrowserDialog { print_only: true };
        let url = Url::parse("https://contoso.sharepoint.com/doc").expect("url");
        assert!(dialog
            .display_dialog(&url, &DialogOptions::default())
            .await
            .is_ok());
    }
}
