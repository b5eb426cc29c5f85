//! Built-in spacetraveling templates using the Tera template engine
//!
//! Templates and static assets are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{SiteConfig, StringsConfig};
use crate::content::{richtext, Post};
use crate::helpers::{format_publication_date, Locale};

/// Static files written next to the generated pages
pub const ASSETS: &[(&str, &str)] = &[
    ("styles.css", include_str!("assets/styles.css")),
    ("logo.svg", include_str!("assets/logo.svg")),
    ("load-more.js", include_str!("assets/load-more.js")),
];

/// Template renderer with the embedded spacetraveling theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // CMS text is escaped; rendered rich text is marked `safe` in templates
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("fallback.html", include_str!("spacetraveling/fallback.html")),
            ("not_found.html", include_str!("spacetraveling/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
            (
                "partials/icon_calendar.html",
                include_str!("spacetraveling/partials/icon_calendar.html"),
            ),
            (
                "partials/icon_user.html",
                include_str!("spacetraveling/partials/icon_user.html"),
            ),
            (
                "partials/icon_clock.html",
                include_str!("spacetraveling/partials/icon_clock.html"),
            ),
        ])?;

        let locale = Locale::from_tag(&config.language);
        let tz = config.tz();
        tera.register_filter(
            "publication_date",
            move |value: &tera::Value,
                  _args: &HashMap<String, tera::Value>|
                  -> tera::Result<tera::Value> {
                Ok(tera::Value::String(format_publication_date(
                    value.as_str(),
                    locale,
                    &tz,
                )))
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub language: String,
    /// Resolved IANA timezone name
    pub timezone: String,
    pub logo: String,
    pub strings: StringsConfig,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            timezone: config.tz().name().to_string(),
            logo: config.logo.clone(),
            strings: config.strings.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub banner_url: String,
    pub author: String,
    pub first_publication_date: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}

impl From<&Post> for PostPageData {
    fn from(post: &Post) -> Self {
        Self {
            uid: post.uid.clone(),
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone().filter(|s| !s.is_empty()),
            banner_url: post.data.banner.url.clone(),
            author: post.data.author.clone(),
            first_publication_date: post.first_publication_date.clone(),
            reading_time: post.reading_time(),
            sections: post
                .data
                .content
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    html: richtext::as_html(&section.body),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&SiteConfig::default()));
        context.insert("refresh", &1);
        let html = renderer.render("fallback.html", &context).unwrap();
        assert!(html.contains("Carregando..."));
        assert!(html.contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn test_publication_date_filter() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&SiteConfig::default()));
        context.insert(
            "post",
            &PostPageData {
                uid: Some("hooks".to_string()),
                title: "Hooks & you".to_string(),
                subtitle: None,
                banner_url: String::new(),
                author: "Ana".to_string(),
                first_publication_date: Some("2021-03-25T19:25:28+0000".to_string()),
                reading_time: 4,
                sections: vec![SectionData {
                    heading: "Intro".to_string(),
                    html: "<p><strong>Hi</strong></p>".to_string(),
                }],
            },
        );
        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains("4 min"));
        assert!(html.contains("Hooks &amp; you"));
        assert!(html.contains("<p><strong>Hi</strong></p>"));
        assert!(!html.contains("class=\"banner\""));
    }

    #[test]
    fn test_config_data_resolves_timezone() {
        let mut config = SiteConfig::default();
        assert_eq!(ConfigData::from(&config).timezone, "UTC");
        config.timezone = "America/Sao_Paulo".to_string();
        assert_eq!(ConfigData::from(&config).timezone, "America/Sao_Paulo");
    }

    #[test]
    fn test_assets_embedded() {
        let names: Vec<_> = ASSETS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["styles.css", "logo.svg", "load-more.js"]);
        assert!(ASSETS.iter().all(|(_, body)| !body.is_empty()));
    }
}
