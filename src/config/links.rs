use serde::Deserialize;
use url::Url;

fn default_explorer_api_url() -> Url {
    Url::parse("https://www.storyscan.io/api").expect("static explorer api url")
}

fn default_explorer_ui_url() -> Url {
    Url::parse("https://www.storyscan.io").expect("static explorer ui url")
}

fn default_explorer_label() -> String {
    "StoryScan".to_string()
}

fn default_secondary_explorer_url() -> Url {
    Url::parse("https://explorer.story.foundation").expect("static explorer url")
}

fn default_secondary_explorer_label() -> String {
    "Story Explorer".to_string()
}

fn default_trade_url() -> Url {
    Url::parse("https://t.me/blazing_trading_bot?start=ref_thin-existence-3844")
        .expect("static trade url")
}

fn default_trade_label() -> String {
    "Trade (Blazing)".to_string()
}

/// Block-explorer endpoints used for source verification and metadata.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExplorerConfig {
    /// Etherscan-compatible API endpoint (`?module=contract&action=getsourcecode`).
    #[serde(default = "default_explorer_api_url")]
    pub api_url: Url,

    /// Blockscout-style UI base; hosts `/api/v2/smart-contracts/{address}` and
    /// the address pages linked from alerts.
    #[serde(default = "default_explorer_ui_url")]
    pub ui_url: Url,

    /// Button label for links into this explorer.
    #[serde(default = "default_explorer_label")]
    pub label: String,

    /// Optional API key sent as the `apikey` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: default_explorer_api_url(),
            ui_url: default_explorer_ui_url(),
            label: default_explorer_label(),
            api_key: None,
        }
    }
}

/// Additional links rendered as alert buttons.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AlertLinksConfig {
    /// Second explorer, linked as `{url}/address/{address}`.
    #[serde(default = "default_secondary_explorer_url")]
    pub secondary_explorer_url: Url,

    /// Button label for the second explorer.
    #[serde(default = "default_secondary_explorer_label")]
    pub secondary_explorer_label: String,

    /// Deep link of the trade button.
    #[serde(default = "default_trade_url")]
    pub trade_url: Url,

    /// Label of the trade button.
    #[serde(default = "default_trade_label")]
    pub trade_label: String,
}

impl Default for AlertLinksConfig {
    fn default() -> Self {
        Self {
            secondary_explorer_url: default_secondary_explorer_url(),
            secondary_explorer_label: default_secondary_explorer_label(),
            trade_url: default_trade_url(),
            trade_label: default_trade_label(),
        }
    }
}
