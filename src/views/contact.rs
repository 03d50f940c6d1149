use maud::{html, Markup};

use super::layout;
use crate::flash::Notice;
use crate::forms::{ContactForm, FieldErrors};

fn field_error(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(field) {
            span.field-error id={ (field) "-error" } { (message) }
        }
    }
}

pub fn contact(
    site_name: &str,
    notice: Option<&Notice>,
    form: &ContactForm,
    errors: &FieldErrors,
) -> Markup {
    let content = html! {
        h1 { "Contact Us" }
        p { "We would love to hear from you. Send us a message and we will reply soon." }
        @if !errors.is_empty() {
            p.notice.notice-error { "Please correct the errors below." }
        }
        form.contact-form method="post" action="/contact/" novalidate {
            p {
                label for="name" { "Name" }
                input id="name" type="text" name="name" maxlength="100" value=(form.name);
                (field_error(errors, "name"))
            }
            p {
                label for="email" { "Email" }
                input id="email" type="email" name="email" value=(form.email);
                (field_error(errors, "email"))
            }
            p {
                label for="subject" { "Subject" }
                input id="subject" type="text" name="subject" maxlength="200" value=(form.subject);
                (field_error(errors, "subject"))
            }
            p {
                label for="message" { "Message" }
                textarea id="message" name="message" rows="6" { (form.message) }
                (field_error(errors, "message"))
            }
            button type="submit" { "Send message" }
        }
    };
    layout(site_name, "Contact", notice, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_next_to_fields_and_values_are_kept() {
        let form = ContactForm {
            name: "Ada".to_string(),
            ..ContactForm::default()
        };
        let errors = form.validate().unwrap_err();
        let doc = contact("S", None, &form, &errors).into_string();
        assert!(doc.contains(r#"id="email-error""#));
        assert!(doc.contains(r#"value="Ada""#));
        assert!(!doc.contains(r#"id="name-error""#));
    }
}
