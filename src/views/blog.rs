use maud::{html, Markup, PreEscaped};

use super::{format_date, layout, media_url};
use crate::db::models::BlogPost;
use crate::flash::Notice;

pub(super) fn excerpt(html_content: &str, max_chars: usize) -> String {
    let text = ammonia::Builder::empty().clean(html_content).to_string();
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

pub fn index(
    site_name: &str,
    notice: Option<&Notice>,
    featured: Option<&BlogPost>,
    recent: &[BlogPost],
) -> Markup {
    let content = html! {
        h1 { "Blog" }
        @match featured {
            Some(post) => {
                article.featured-post {
                    img src=(media_url(&post.image)) alt=(post.title);
                    h2 { a href={ "/blog/" (post.id) "/" } { (post.title) } }
                    p.meta { (format_date(&post.published_at)) }
                    p { (excerpt(&post.content, 280)) }
                }
            }
            None => {
                p.empty-state { "No posts have been published yet. Please check back soon." }
            }
        }
        @if !recent.is_empty() {
            section.recent-posts {
                h2 { "Recent posts" }
                ul {
                    @for post in recent {
                        li.recent-post {
                            a href={ "/blog/" (post.id) "/" } { (post.title) }
                            " "
                            span.meta { (format_date(&post.published_at)) }
                        }
                    }
                }
            }
        }
    };
    layout(site_name, "Blog", notice, content)
}

pub fn detail(site_name: &str, notice: Option<&Notice>, post: &BlogPost) -> Markup {
    let content = html! {
        article.blog-post {
            h1 { (post.title) }
            p.meta { (format_date(&post.published_at)) }
            img src=(media_url(&post.image)) alt=(post.title);
            // Sanitized with ammonia when the post was created.
            div.content { (PreEscaped(&post.content)) }
        }
        p { a href="/blog/" { "← Back to the blog" } }
    };
    layout(site_name, &post.title, notice, content)
}
