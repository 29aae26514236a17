use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::{ApiResponse, Error, ParseMode};

/// Maximum length of one text message, in UTF-16 code units.
const MESSAGE_LIMIT: usize = 4096;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

/// Outbound half of the Bot API: just the two methods replies need.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url.trim_end_matches('/'), self.token, method)
    }

    /// Sends `text`, split over several messages when it exceeds the Bot API message limit.
    pub async fn send_message(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>) -> Result<(), Error> {
        for chunk in split_message(text, MESSAGE_LIMIT) {
            let response = self
                .http
                .post(self.method_url("sendMessage"))
                .json(&SendMessage {
                    chat_id,
                    text: chunk,
                    parse_mode,
                })
                .send()
                .await?;
            check_response(response).await?;
        }
        Ok(())
    }

    pub async fn send_document(&self, chat_id: i64, filename: &str, content: Vec<u8>) -> Result<(), Error> {
        let document = Part::bytes(content)
            .file_name(filename.to_owned())
            .mime_str("text/plain")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", document);

        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        check_response(response).await
    }
}

async fn check_response(response: reqwest::Response) -> Result<(), Error> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<ApiResponse>(&body) {
        Ok(api) if api.ok && status.is_success() => Ok(()),
        Ok(api) => Err(Error::Api {
            code: api.error_code.unwrap_or_else(|| status.as_u16().into()),
            description: api.description.unwrap_or_else(|| "unknown error".into()),
        }),
        Err(_) => Err(Error::Api {
            code: status.as_u16().into(),
            description: body,
        }),
    }
}

/// Splits on line boundaries where possible, otherwise at the limit.
pub(crate) fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.encode_utf16().count() > limit {
        let cut = prefix_len(rest, limit);
        let at = match rest[..cut].rfind('\n') {
            Some(newline) if newline > 0 => newline + 1,
            _ => cut,
        };
        let (head, tail) = rest.split_at(at);
        let head = head.trim_end_matches('\n');
        if !head.is_empty() {
            chunks.push(head);
        }
        rest = tail;
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest);
    }
    chunks
}

/// Byte length of the longest prefix that fits in `limit` UTF-16 units; at least one char.
fn prefix_len(text: &str, limit: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > limit {
            return if i == 0 { c.len_utf8() } else { i };
        }
    }
    text.len()
}
