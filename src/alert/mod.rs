//! Rendering of deployment alerts.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{
    config::{AlertLinksConfig, ExplorerConfig},
    models::{AlertButton, AlertPayload, ContractCandidate, MetadataRecord, VerificationRecord},
};

const UNKNOWN_NAME: &str = "Unknown";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Turns a verified candidate into a Telegram Markdown message.
///
/// Formatting is pure: identical inputs give byte-identical payloads.
#[derive(Debug, Clone)]
pub struct AlertFormatter {
    network_name: String,
    explorer_url: String,
    explorer_label: String,
    secondary_explorer_url: String,
    secondary_explorer_label: String,
    trade_url: String,
    trade_label: String,
}

impl AlertFormatter {
    /// Creates a formatter linking into the given explorers.
    pub fn new(network_name: &str, explorer: &ExplorerConfig, links: &AlertLinksConfig) -> Self {
        let base = |url: &url::Url| url.as_str().trim_end_matches('/').to_string();
        Self {
            network_name: network_name.to_string(),
            explorer_url: base(&explorer.ui_url),
            explorer_label: explorer.label.clone(),
            secondary_explorer_url: base(&links.secondary_explorer_url),
            secondary_explorer_label: links.secondary_explorer_label.clone(),
            trade_url: links.trade_url.to_string(),
            trade_label: links.trade_label.clone(),
        }
    }

    /// Formats an alert with the block time shown in the local time zone.
    pub fn format(
        &self,
        candidate: &ContractCandidate,
        verification: &VerificationRecord,
        metadata: &MetadataRecord,
    ) -> AlertPayload {
        self.format_in(candidate, verification, metadata, &Local)
    }

    /// Formats an alert with the block time shown in `tz`.
    pub fn format_in<Tz>(
        &self,
        candidate: &ContractCandidate,
        verification: &VerificationRecord,
        metadata: &MetadataRecord,
        tz: &Tz,
    ) -> AlertPayload
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let address = candidate.address.to_string();
        let contracts_link = format!("{}/address/{address}/contracts", self.explorer_url);
        let name = verification
            .contract_name
            .as_deref()
            .map(inline_code)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let mut lines = vec![
            format!("🚀 *New {} Contract Deployed!*", self.network_name),
            format!("*Name:* `{name}`"),
            format!("*Address:* [{address}]({contracts_link})"),
            format!("*Deployer:* `{}`", candidate.deployer),
            format!("*Block:* `{}`", candidate.block_number),
            format!("*Time:* `{}`", render_time(candidate.block_timestamp, tz)),
        ];

        if let Some(compiler) = verification.compiler_version.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!("*Compiler:* `{}`", inline_code(compiler)));
        }

        if !metadata.is_empty() {
            let socials = metadata
                .social_links
                .iter()
                .map(|(kind, url)| format!("[{}]({url})", kind.label()))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(format!("*Socials:* {socials}"));
        }

        AlertPayload {
            text: lines.join("\n"),
            buttons: vec![
                vec![AlertButton::new(&self.trade_label, &self.trade_url)],
                vec![
                    AlertButton::new(&self.explorer_label, contracts_link),
                    AlertButton::new(
                        &self.secondary_explorer_label,
                        format!("{}/address/{address}", self.secondary_explorer_url),
                    ),
                ],
            ],
        }
    }

    /// The message sent once the monitor is up.
    pub fn startup_message(&self) -> AlertPayload {
        AlertPayload::text(format!("🚀 {} contract monitor started!", self.network_name))
    }
}

/// Backticks would close the surrounding code span.
fn inline_code(value: &str) -> String {
    value.replace('`', "'")
}

fn render_time<Tz>(timestamp: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(tz).format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
