//! Flat page templates.
//!
//! The template is chosen from the page's `PageType` through a fixed table; the
//! slug in the URL only selects the row, never the template.

use maud::{html, Markup, PreEscaped};

use super::{layout, media_url};
use crate::db::models::{Page, PageType};
use crate::flash::Notice;

pub type PageTemplate = fn(&Page) -> Markup;

pub fn template_for(page_type: PageType) -> PageTemplate {
    match page_type {
        PageType::Base => base_page,
        PageType::Contact => contact_page,
        PageType::Mission => mission_page,
        PageType::Home => home_page,
        PageType::AboutUs => about_page,
    }
}

pub fn render(site_name: &str, notice: Option<&Notice>, page: &Page) -> Markup {
    let body = template_for(page.page_type)(page);
    layout(site_name, &page.title, notice, body)
}

fn hero(page: &Page) -> Markup {
    html! {
        @if let Some(image) = &page.image {
            img.page-hero src=(media_url(image)) alt=(page.title);
        }
    }
}

fn base_page(page: &Page) -> Markup {
    html! {
        article.page.page-base {
            h1 { (page.title) }
            (hero(page))
            div.content { (PreEscaped(&page.content)) }
        }
    }
}

fn contact_page(page: &Page) -> Markup {
    html! {
        article.page.page-contact {
            h1 { (page.title) }
            div.content { (PreEscaped(&page.content)) }
            p { a href="/contact/" { "Send us a message" } }
        }
    }
}

fn mission_page(page: &Page) -> Markup {
    html! {
        article.page.page-mission {
            (hero(page))
            h1 { (page.title) }
            blockquote.content { (PreEscaped(&page.content)) }
        }
    }
}

fn home_page(page: &Page) -> Markup {
    html! {
        section.page.page-home {
            (hero(page))
            h1 { (page.title) }
            div.content { (PreEscaped(&page.content)) }
            p { a href="/blog/" { "Read the latest from our blog" } }
        }
    }
}

fn about_page(page: &Page) -> Markup {
    html! {
        article.page.page-about {
            h1 { (page.title) }
            (hero(page))
            div.content { (PreEscaped(&page.content)) }
            p { a href="/mission/" { "Our mission" } }
        }
    }
}
