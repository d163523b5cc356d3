use quill_core::OAuthProfile;
use serde::{Deserialize, Serialize};
use url::Url;

const GRAPH_BASE_URL: &str = "https://graph.microsoft.com";
const AUTHORITY_AUTHORIZE_URL: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
const AUTHORITY_TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const REDIRECT_URL: &str = "http://localhost:5000/callback";
const SIGN_IN_PAGE_URL: &str = "https://localhost:5000/SignIn.html";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    pub profile_name: String,
    pub graph: GraphConfig,
    pub oauth: OAuthProfile,
    #[serde(default)]
    pub dialog: DialogConfig,
    #[serde(default)]
    pub keychain: KeychainConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Scheme and host only; request paths carry the `/v1.0` prefix.
    pub base_url: Url,
    pub upload_folder: String,
    pub default_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogConfig {
    pub sign_in_url: Url,
    pub height_percent: u8,
    pub width_percent: u8,
    pub display_in_iframe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeychainConfig {
    pub service_name: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: parse_static(GRAPH_BASE_URL),
            upload_folder: "Documents".to_string(),
            default_file_name: "test.docx".to_string(),
        }
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            sign_in_url: parse_static(SIGN_IN_PAGE_URL),
            height_percent: 60,
            width_percent: 50,
            display_in_iframe: false,
        }
    }
}

impl Default for KeychainConfig {
    fn default() -> Self {
        Self {
            service_name: "io.quill.desktop".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            profile_name: "default".to_string(),
            graph: GraphConfig::default(),
            oauth: OAuthProfile {
                client_id: String::new(),
                auth_url: parse_static(AUTHORITY_AUTHORIZE_URL),
                token_url: parse_static(AUTHORITY_TOKEN_URL),
                redirect_url: parse_static(REDIRECT_URL),
                scopes: vec![
                    "User.Read".to_string(),
                    "Mail.Send".to_string(),
                    "Files.ReadWrite".to_string(),
                ],
            },
            dialog: DialogConfig::default(),
            keychain: KeychainConfig::default(),
        }
    }
}

fn parse_static(raw: &'static str) -> Url {
    Url::parse(raw).unwrap_or_else(|err| panic!("built-in url {raw} is invalid: {err}"))
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn defaults_survive_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).expect("serialize config");
        let parsed: AppConfig = toml::from_str(&text).expect("parse config");
        assert_eq!(parsed.graph.upload_folder, "Documents");
        assert_eq!(parsed.graph.default_file_name, "test.docx");
        assert_eq!(parsed.dialog.height_percent, 60);
        assert_eq!(parsed.dialog.width_percent, 50);
        assert!(parsed.oauth.scopes.iter().any(|scope| scope == "Mail.Send"));
    }

    #[test]
    fn missing_optional_sections_fall_back_to_defaults() {
        let mut text = toml::to_string_pretty(&AppConfig::default()).expect("serialize config");
        let dialog_at = text.find("[dialog]").expect("dialog section");
        text.truncate(dialog_at);
        let parsed: AppConfig = toml::from_str(&text).expect("parse trimmed config");
        assert_eq!(parsed.keychain.service_name, "io.quill.desktop");
        assert!(!parsed.dialog.display_in_iframe);
    }
}
