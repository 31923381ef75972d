//! Minimal RFC 822 encoding for outgoing mail.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;

use super::OutgoingMail;

const BOUNDARY_PREFIX: &str = "workdesk-boundary";
/// Base64 line length for attachment bodies
const LINE_WIDTH: usize = 76;

/// Render `mail` as a text/plain message, or multipart/mixed when it has attachments.
pub fn encode(mail: &OutgoingMail) -> String {
    let mut out = String::new();
    out.push_str(&format!("To: {}\r\n", mail.recipients.join(", ")));
    out.push_str(&format!("Subject: {}\r\n", header_value(&mail.subject)));
    out.push_str("MIME-Version: 1.0\r\n");

    if mail.attachments.is_empty() {
        out.push_str("Content-Type: text/plain; charset=\"utf-8\"\r\n");
        out.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
        out.push_str(&mail.body);
        return out;
    }

    let boundary = format!("{}-{}", BOUNDARY_PREFIX, mail.attachments.len());
    out.push_str(&format!("Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n", boundary));

    out.push_str(&format!("--{}\r\n", boundary));
    out.push_str("Content-Type: text/plain; charset=\"utf-8\"\r\n");
    out.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
    out.push_str(&mail.body);
    out.push_str("\r\n");

    for attachment in &mail.attachments {
        out.push_str(&format!("--{}\r\n", boundary));
        out.push_str("Content-Type: application/octet-stream\r\n");
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
            attachment.filename.replace('"', "")
        ));
        let encoded = STANDARD.encode(&attachment.data);
        for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
            // base64 output is ASCII
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push_str("\r\n");
        }
    }
    out.push_str(&format!("--{}--\r\n", boundary));
    out
}

/// The URL-safe base64 `raw` field expected by the Gmail send API
pub fn to_gmail_raw(mail: &OutgoingMail) -> String {
    URL_SAFE.encode(encode(mail).as_bytes())
}

/// Headers must stay on one line
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
