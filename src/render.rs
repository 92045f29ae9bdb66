use crate::submission::{Outcome, RequestContext, API_KEY, API_SECRET};
use crate::types::ApiErrorBody;

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Gateway error text: the top-level message if present, otherwise one line
/// per invalid field.
pub fn format_api_error(body: &ApiErrorBody) -> String {
    if let Some(message) = &body.message {
        return escape_html(message);
    }

    body.fields
        .iter()
        .flat_map(|fields| fields.0.iter())
        .flat_map(|(field, reasons)| {
            reasons.iter().map(move |reason| {
                format!(
                    "Field \"{}\" – {}",
                    escape_html(field),
                    escape_html(&reason.invalid)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// List items (as HTML) for a failed outcome.
pub fn error_items(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::ValidationFailed(errors) => {
            errors.iter().map(|e| escape_html(&e.to_string())).collect()
        }
        Outcome::SendFailed(body) => vec![format!(
            "Could not send SMS. Response from API:<br>{}",
            format_api_error(body)
        )],
        Outcome::NotSubmitted | Outcome::SendSucceeded => Vec::new(),
    }
}

fn banner(outcome: &Outcome) -> String {
    match outcome {
        Outcome::NotSubmitted => String::new(),
        Outcome::SendSucceeded => {
            r#"<div class="alert alert-success" role="alert">SMS was sent!</div>"#.to_string()
        }
        failed => {
            let items: String = error_items(failed)
                .iter()
                .map(|item| format!("<li>{item}</li>"))
                .collect();
            format!(
                r#"<div class="alert alert-danger" role="alert">
                SMS was not sent!
                <br>Please check the errors below:<br>
                <ul>{items}</ul>
            </div>"#
            )
        }
    }
}

/// Renders the whole page: banner, then the form pre-filled from `ctx`.
pub fn page(ctx: &RequestContext, outcome: &Outcome) -> String {
    let receivers = escape_html(&ctx.form.receivers);
    let sender = escape_html(&ctx.form.sender);
    let message = escape_html(&ctx.form.message);
    let api_key = escape_html(&ctx.credential_value(API_KEY, true));
    let api_secret = escape_html(&ctx.credential_value(API_SECRET, true));
    let banner = banner(outcome);

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Welcome to the SMS Dungeon</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {{ font-family: sans-serif; margin: 0; padding: 70px 20px 20px; }}
        .navbar {{ position: fixed; top: 0; left: 0; right: 0; background: #222; color: #fff; padding: 15px 20px; }}
        .container {{ max-width: 720px; margin: 0 auto; }}
        .form-group {{ margin-bottom: 15px; }}
        .form-control {{ display: block; width: 100%; padding: 6px; box-sizing: border-box; }}
        .alert {{ padding: 15px; margin-bottom: 20px; border-radius: 4px; }}
        .alert-success {{ background: #dff0d8; color: #3c763d; }}
        .alert-danger {{ background: #f2dede; color: #a94442; }}
    </style>
</head>
<body>
    <nav class="navbar" role="navigation"><span class="navbar-brand">SMS Dungeon</span></nav>
    <div class="container">
        {banner}
        <form method="post" action="/">
            <div class="form-group">
                <label for="receivers">Receiver(s)</label>
                <input type="text" class="form-control" id="receivers" name="receivers" placeholder="4781549300" value="{receivers}">
                Country code followed by phone number. For multiple receivers use comma-separation.
            </div>
            <div class="form-group">
                <label for="from">Sender</label>
                <input type="text" class="form-control" id="from" name="from" placeholder="Troll" value="{sender}">
                Maximum 11 chars, no spaces etc.
            </div>
            <div class="form-group">
                <label for="message">Message</label>
                <textarea class="form-control" id="message" name="message" placeholder="Message" rows="3">{message}</textarea>
            </div>
            <hr>
            <div class="form-group">
                <label for="api_key">API key</label>
                <input type="text" class="form-control" id="api_key" name="api_key" value="{api_key}">
                For custom key usage. Gets stored in a cookie.
            </div>
            <div class="form-group">
                <label for="api_secret">API secret</label>
                <input type="text" class="form-control" id="api_secret" name="api_secret" value="{api_secret}">
                For custom secret usage. Gets stored in a cookie.
            </div>
            <div class="form-check">
                <input class="form-check-input" type="checkbox" value="1" name="api_clear_cookie" id="api_clear_cookie">
                <label class="form-check-label" for="api_clear_cookie">Check to reset API credentials</label>
            </div>
            <hr>
            <button type="submit">Troll away!</button>
        </form>
        <footer><p>&copy; SMS Dungeon</p></footer>
    </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::CookieJar;
    use crate::submission::{validate, ValidationErrors};
    use crate::types::{FieldErrors, InvalidReason, SubmitForm};

    fn validation_errors(form: &SubmitForm) -> ValidationErrors {
        validate(form).unwrap_err()
    }

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
    }

    #[test]
    fn top_level_api_message_wins() {
        let body = ApiErrorBody::from_message("Invalid sender");
        assert_eq!(
            error_items(&Outcome::SendFailed(body)),
            vec!["Could not send SMS. Response from API:<br>Invalid sender".to_string()]
        );
    }

    #[test]
    fn field_level_api_errors_are_listed_per_reason_in_response_order() {
        let reason = |invalid: &str| InvalidReason {
            invalid: invalid.into(),
        };
        let body = ApiErrorBody {
            message: None,
            fields: Some(FieldErrors(vec![
                ("sender".to_string(), vec![reason("<empty>")]),
                (
                    "recipients".to_string(),
                    vec![reason("bad format"), reason("too long")],
                ),
            ])),
        };

        assert_eq!(
            format_api_error(&body),
            "Field \"sender\" – &lt;empty&gt;<br>\
             Field \"recipients\" – bad format<br>\
             Field \"recipients\" – too long"
        );
    }

    #[test]
    fn validation_errors_become_one_item_each() {
        let errors = validation_errors(&SubmitForm::default());
        let items = error_items(&Outcome::ValidationFailed(errors));

        assert_eq!(
            items,
            vec![
                "Receivers-field missing value",
                "From-field missing value",
                "Message-field missing value",
            ]
        );
    }

    #[test]
    fn idle_page_has_no_banner() {
        let ctx = RequestContext::new(false, SubmitForm::default(), CookieJar::default());
        let html = page(&ctx, &Outcome::NotSubmitted);

        assert!(html.contains("<title>Welcome to the SMS Dungeon</title>"));
        assert!(!html.contains(r#"role="alert""#));
        assert!(html.contains(r#"name="api_clear_cookie""#));
    }

    #[test]
    fn success_page_echoes_escaped_values() {
        let form = SubmitForm {
            receivers: "47123".into(),
            sender: "Troll".into(),
            message: "</textarea><script>".into(),
            ..SubmitForm::default()
        };
        let ctx = RequestContext::new(true, form, CookieJar::default());
        let html = page(&ctx, &Outcome::SendSucceeded);

        assert!(html.contains("SMS was sent!"));
        assert!(html.contains(r#"value="47123""#));
        assert!(html.contains(r#"value="Troll""#));
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;</textarea>"));
    }

    #[test]
    fn failure_page_lists_errors() {
        let form = SubmitForm {
            receivers: "12a".into(),
            ..SubmitForm::default()
        };
        let errors = validation_errors(&form);
        let ctx = RequestContext::new(true, form, CookieJar::default());
        let html = page(&ctx, &Outcome::ValidationFailed(errors));

        assert!(html.contains("SMS was not sent!"));
        assert!(html.contains(
            "<li>Receivers-field contains non-digit characters (only commas and digits allowed)</li>"
        ));
        assert!(html.contains(r#"value="12a""#));
    }
}
