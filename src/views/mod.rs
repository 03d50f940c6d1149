//! HTML rendering.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating. Every
//! public page is wrapped by [`layout`], which supplies navigation, the pending
//! flash notice and the newsletter form in the footer.

pub mod blog;
pub mod contact;
pub mod pages;
pub mod site;

use chrono::{DateTime, Utc};
use maud::{html, Markup, DOCTYPE};

use crate::flash::Notice;

const CSS: &str = r#"
body{font-family:Georgia,serif;margin:0;color:#222;line-height:1.6}
.site-header,.site-footer{background:#2d2a4a;color:#fff;padding:1rem 2rem}
.site-header a,.site-footer a{color:#fff;margin-right:1rem;text-decoration:none}
main{max-width:960px;margin:0 auto;padding:2rem}
.notice{padding:.75rem 1rem;margin-bottom:1rem;border-radius:4px}
.notice-success{background:#e3f4e1}.notice-info{background:#e1ecf4}
.notice-warning{background:#fcf3d9}.notice-error{background:#f8dcdc}
.field-error{color:#a12020;font-size:.9rem}
.carousel,.cards{display:grid;gap:1rem;grid-template-columns:repeat(auto-fill,minmax(260px,1fr))}
img{max-width:100%}
"#;

/// Site navigation: (label, href).
const NAV: &[(&str, &str)] = &[
    ("Home", "/"),
    ("About Us", "/about-us/"),
    ("Mission", "/mission/"),
    ("Blog", "/blog/"),
    ("Contact", "/contact/"),
];

/// Public URL of an uploaded file stored relative to the media root.
pub fn media_url(path: &str) -> String {
    format!("/media/{}", path.trim_start_matches('/'))
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

fn render_notice(notice: &Notice) -> Markup {
    html! {
        div class={ "notice notice-" (notice.level.as_str()) } role="status" {
            (notice.message)
        }
    }
}

fn newsletter_form() -> Markup {
    html! {
        form.newsletter method="post" action="/subscribe/" {
            label for="newsletter-email" { "Subscribe to our newsletter" }
            " "
            input id="newsletter-email" type="email" name="email" placeholder="you@example.com" required;
            " "
            button type="submit" { "Subscribe" }
        }
    }
}

/// Full document around `content`.
pub fn layout(site_name: &str, title: &str, notice: Option<&Notice>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | " (site_name) }
                style { (maud::PreEscaped(CSS)) }
            }
            body {
                header.site-header {
                    strong { a href="/" { (site_name) } }
                    nav.site-nav {
                        @for (label, href) in NAV {
                            a href=(href) { (label) }
                        }
                    }
                }
                main {
                    @if let Some(notice) = notice {
                        (render_notice(notice))
                    }
                    (content)
                }
                footer.site-footer {
                    (newsletter_form())
                    p { "© " (Utc::now().format("%Y").to_string()) " " (site_name) }
                }
            }
        }
    }
}

/// Minimal document for error pages, which render without site context.
fn bare_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (title) }
                style { (maud::PreEscaped(CSS)) }
            }
            body {
                main { (content) }
            }
        }
    }
}

pub fn not_found() -> Markup {
    bare_document(
        "Page not found",
        html! {
            h1 { "Page not found" }
            p { "The page you were looking for does not exist." }
            p { a href="/" { "Return home" } }
        },
    )
}

pub fn server_error() -> Markup {
    bare_document(
        "Something went wrong",
        html! {
            h1 { "Something went wrong" }
            p { "We could not load this page. Please try again shortly." }
        },
    )
}
