use crate::config::AlertConfig;
use crate::metrics_defs::OPERATOR_ALERT;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::counter;

/// Outcome of one operator alert attempt. Alert delivery never throws: an
/// unconfigured or failing channel degrades to `success: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub message: String,
}

/// Labels the billing period for the operator message. Anything other than
/// the annual marker is treated as monthly.
pub fn period_label(billing_period: Option<&str>) -> &'static str {
    match billing_period {
        Some("annual") => "Annual",
        _ => "Monthly",
    }
}

/// Redacted subscription reference for manually confirmed payments.
pub fn manual_subscription_ref(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(8).collect();
    format!("MANUAL-{prefix}")
}

pub struct PaymentAlert<'a> {
    pub plan_type: &'a str,
    pub billing_period: Option<&'a str>,
    pub amount: f64,
    pub customer_email: &'a str,
    pub subscription_ref: &'a str,
}

/// Markdown message for the operator channel.
pub fn format_payment_alert(alert: &PaymentAlert<'_>) -> String {
    format!(
        "\u{1f4b0} *NEW PIX PAYMENT*\n\n\
         \u{1f4cb} *Plan:* {plan} ({period})\n\
         \u{1f4b5} *Amount:* R$ {amount:.2}\n\
         \u{1f4e7} *Customer:* {email}\n\
         \u{1f517} *Subscription:* `{subscription}`\n\n\
         _Confirm receipt and activate the subscription with the billing provider._",
        plan = alert.plan_type,
        period = period_label(alert.billing_period),
        amount = alert.amount,
        email = alert.customer_email,
        subscription = alert.subscription_ref,
    )
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Operator alert channel backed by an instant-messaging bot.
pub struct OperatorAlerts {
    client: reqwest::Client,
    api_base: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl OperatorAlerts {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.as_str().trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    /// Sends one message through the bot API. Exactly one outbound call; no
    /// retry. Failures come back as a failed `DeliveryResult`, not an error.
    pub async fn send(&self, text: &str) -> DeliveryResult {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            tracing::warn!("operator alert channel not configured, dropping message");
            return DeliveryResult {
                success: false,
                message: "alerts not configured".to_string(),
            };
        };

        counter!(OPERATOR_ALERT).increment(1);

        let url = format!("{}/bot{token}/sendMessage", self.api_base);
        let request = self.client.post(&url).json(&json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        }));

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("operator alert transport error: {err}");
                return DeliveryResult {
                    success: false,
                    message: err.to_string(),
                };
            }
        };

        match response.json::<BotApiResponse>().await {
            Ok(body) if body.ok => {
                tracing::info!("operator alert delivered");
                DeliveryResult {
                    success: true,
                    message: "Notification sent".to_string(),
                }
            }
            Ok(body) => {
                let description = body
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string());
                tracing::error!("operator alert rejected: {description}");
                DeliveryResult {
                    success: false,
                    message: description,
                }
            }
            Err(err) => {
                tracing::error!("operator alert returned malformed body: {err}");
                DeliveryResult {
                    success: false,
                    message: err.to_string(),
                }
            }
        }
    }
}
