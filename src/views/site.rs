use maud::{html, Markup};

use super::{blog::excerpt, format_date, layout, media_url};
use crate::db::models::{
    CarouselSlide, ChurchNews, GeographicLocation, SocialMediaLink, TeamMember, Testimonial,
    Video,
};
use crate::flash::Notice;

pub struct HomeContext<'a> {
    pub testimonials: &'a [Testimonial],
    pub videos: &'a [Video],
    pub slides: &'a [CarouselSlide],
    pub news: &'a [ChurchNews],
}

pub struct AboutContext<'a> {
    pub team: &'a [TeamMember],
    pub locations: &'a [GeographicLocation],
    pub social_links: &'a [SocialMediaLink],
}

fn map_link(location: &GeographicLocation) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=16/{lat}/{lon}",
        lat = location.latitude,
        lon = location.longitude
    )
}

pub fn home(site_name: &str, notice: Option<&Notice>, ctx: &HomeContext<'_>) -> Markup {
    let content = html! {
        section.carousel aria-label="Highlights" {
            @for slide in ctx.slides {
                figure.slide.active[slide.is_active] data-order=(slide.display_order) {
                    img src=(media_url(&slide.image)) alt=(slide.title);
                    figcaption {
                        h2 { (slide.title) }
                        @if !slide.content.is_empty() {
                            p { (slide.content) }
                        }
                    }
                }
            }
        }
        section.videos {
            h2 { "Sermons & Videos" }
            div.cards {
                @for video in ctx.videos {
                    article.video {
                        a href=(video.video_url) {
                            img src=(media_url(&video.thumbnail)) alt=(video.title) loading="lazy";
                        }
                        h3 { (video.title) }
                        p { (video.description) }
                    }
                }
            }
        }
        @if !ctx.news.is_empty() {
            section.news {
                h2 { "Church News" }
                div.cards {
                    @for item in ctx.news {
                        article.news-item {
                            @if let Some(image) = &item.image {
                                img src=(media_url(image)) alt=(item.title) loading="lazy";
                            }
                            h3 { (item.title) }
                            p.meta { (format_date(&item.published_at)) " · " (item.author) }
                            p { (excerpt(&item.content, 200)) }
                        }
                    }
                }
            }
        }
        section.testimonials {
            h2 { "Testimonies" }
            @for t in ctx.testimonials {
                blockquote.testimonial {
                    p { (t.content) }
                    footer {
                        (t.name)
                        @if let Some(position) = &t.position { ", " (position) }
                        @if let Some(company) = &t.company { ", " (company) }
                        " · " (t.date.format("%B %Y").to_string())
                    }
                }
            }
        }
    };
    layout(site_name, "Home", notice, content)
}

pub fn about(site_name: &str, notice: Option<&Notice>, ctx: &AboutContext<'_>) -> Markup {
    let content = html! {
        h1 { "About Us" }
        p {
            (site_name) " is a family of believers gathered to worship, grow in faith "
            "and serve our neighbours. Everyone is welcome."
        }
        p { "Join us on Sundays for worship, and midweek for Bible study and prayer." }
        @if !ctx.team.is_empty() {
            section.team {
                h2 { "Our Team" }
                div.cards {
                    @for member in ctx.team {
                        article.team-member {
                            img src=(media_url(&member.photo)) alt=(member.name) loading="lazy";
                            h3 { (member.name) }
                            p.position { (member.position.as_str()) }
                            p { (member.bio) }
                            @if let Some(email) = &member.email {
                                p { a href={ "mailto:" (email) } { (email) } }
                            }
                            @if let Some(phone) = &member.phone_number {
                                p { a href={ "tel:" (phone) } { (phone) } }
                            }
                        }
                    }
                }
            }
        }
        @if !ctx.locations.is_empty() {
            section.locations {
                h2 { "Find Us" }
                @for location in ctx.locations {
                    address.location {
                        (location.address)
                        @if let Some(description) = &location.description {
                            br; (description)
                        }
                        br;
                        a href=(map_link(location)) rel="noopener" { "View on map" }
                    }
                }
            }
        }
        @if !ctx.social_links.is_empty() {
            section.social {
                h2 { "Follow Us" }
                ul.social-links {
                    @for link in ctx.social_links {
                        li {
                            a href=(link.url) rel="noopener" {
                                i class={ (link.icon_class) " " (link.icon_class) "-" (link.platform.as_str()) } {}
                                " " (link.platform.label())
                            }
                        }
                    }
                }
            }
        }
    };
    layout(site_name, "About Us", notice, content)
}

pub fn mission(site_name: &str, notice: Option<&Notice>) -> Markup {
    let content = html! {
        h1 { "Our Mission" }
        p { "To love God, love people and make disciples in our city and beyond." }
        ul {
            li { "Worship: gathering every week to honour God together." }
            li { "Fellowship: caring for one another as one family." }
            li { "Outreach: serving the community in word and deed." }
        }
    };
    layout(site_name, "Mission", notice, content)
}
