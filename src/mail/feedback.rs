use serde::Serialize;
use serde_json::Value;

/// A validated testimonial form
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// An email ready for the provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl FeedbackForm {
    /// Parse a request body leniently
    ///
    /// Anything that is not a JSON object counts as an empty form. Returns
    /// `None` when a field is missing, not a string, or blank.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        // A JSON string holding the object is accepted too
        let value = match value {
            Value::String(inner) => serde_json::from_str(&inner).unwrap_or(Value::Null),
            other => other,
        };

        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        Some(Self {
            name: field("name")?,
            email: field("email")?,
            message: field("message")?,
        })
    }

    pub fn to_email(&self, from: &str, to: &str) -> OutgoingEmail {
        let html = format!(
            "<h2>Nuevo testimonio de EngliBot A2</h2>\n\
             <p><strong>Nombre:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Mensaje:</strong></p>\n\
             <p>{}</p>",
            escape_html(&self.name),
            escape_html(&self.email),
            escape_html(&self.message).replace('\n', "<br/>"),
        );

        OutgoingEmail {
            from: from.to_string(),
            to: vec![to.to_string()],
            reply_to: vec![self.email.clone()],
            subject: format!("Nuevo testimonio - {}", self.name),
            html,
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
