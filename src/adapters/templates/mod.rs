//! Handlebars message templates. Implements TemplatePort.
//!
//! Built-in templates are compiled in from `templates/`; a directory given in
//! the config can override any of them with a file of the same name. Output is
//! Zulip Markdown, so HTML escaping is disabled.

use crate::domain::DomainError;
use crate::ports::TemplatePort;
use crate::shared::department::ChannelEmoji;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason,
};
use std::path::Path;
use tracing::info;

pub const WELCOME: &str = "welcome";
pub const DAILY_EVENTS: &str = "daily";
pub const WEEKLY_EVENTS: &str = "weekly";
pub const PAPER_DIGEST: &str = "digest";
/// Partial used by both event templates.
const EVENT_PARTIAL: &str = "event";

const TEMPLATE_EXTENSION: &str = "md.hbs";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (WELCOME, include_str!("../../../templates/welcome.md.hbs")),
    (DAILY_EVENTS, include_str!("../../../templates/daily.md.hbs")),
    (WEEKLY_EVENTS, include_str!("../../../templates/weekly.md.hbs")),
    (PAPER_DIGEST, include_str!("../../../templates/digest.md.hbs")),
];

const BUILTIN_PARTIALS: &[(&str, &str)] =
    &[(EVENT_PARTIAL, include_str!("../../../templates/event.md.hbs"))];

/// `{{format_channel name}}` -> `:emoji: #**name**` (emoji only when configured).
struct FormatChannel {
    emojis: Vec<ChannelEmoji>,
}

impl FormatChannel {
    fn format(&self, channel: &str) -> String {
        match self.emojis.iter().find(|e| e.channel == channel) {
            Some(e) => format!(":{}: #**{}**", e.emoji, channel),
            None => format!("#**{channel}**"),
        }
    }
}

impl HelperDef for FormatChannel {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let channel = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("format_channel", 0))?;
        out.write(&self.format(channel))?;
        Ok(())
    }
}

pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Register the built-in templates, then any overrides found in `override_dir`.
    pub fn new(
        emojis: Vec<ChannelEmoji>,
        override_dir: Option<&Path>,
    ) -> Result<Self, DomainError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("format_channel", Box::new(FormatChannel { emojis }));

        for (name, builtin) in BUILTIN_PARTIALS {
            let source = load_override(override_dir, name)?;
            handlebars
                .register_partial(name, source.as_deref().unwrap_or(builtin))
                .map_err(|e| DomainError::Template(format!("{name}: {e}")))?;
        }
        for (name, builtin) in BUILTIN_TEMPLATES {
            let source = load_override(override_dir, name)?;
            handlebars
                .register_template_string(name, source.as_deref().unwrap_or(builtin))
                .map_err(|e| DomainError::Template(format!("{name}: {e}")))?;
        }

        Ok(Self { handlebars })
    }
}

/// Contents of `<dir>/<name>.md.hbs`, if the directory is set and the file exists.
fn load_override(dir: Option<&Path>, name: &str) -> Result<Option<String>, DomainError> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    let path = dir.join(format!("{name}.{TEMPLATE_EXTENSION}"));
    if !path.exists() {
        return Ok(None);
    }
    let source = std::fs::read_to_string(&path)
        .map_err(|e| DomainError::Template(format!("cannot read {}: {e}", path.display())))?;
    info!(path = %path.display(), "using template override");
    Ok(Some(source))
}

impl TemplatePort for HandlebarsRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, DomainError> {
        self.handlebars
            .render(template, context)
            .map_err(|e| DomainError::Template(format!("{template}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::department::DepartmentConfig;
    use serde_json::json;

    fn renderer() -> HandlebarsRenderer {
        HandlebarsRenderer::new(DepartmentConfig::northwestern().channel_emojis, None).unwrap()
    }

    #[test]
    fn channel_formatting() {
        let helper = FormatChannel {
            emojis: DepartmentConfig::northwestern().channel_emojis,
        };
        assert_eq!(
            helper.format("course/ECON 410-1"),
            ":eddie: #**course/ECON 410-1**"
        );
        assert_eq!(helper.format("field/macro"), "#**field/macro**");
    }

    #[test]
    fn welcome_for_matched_student() {
        let out = renderer()
            .render(
                WELCOME,
                &json!({
                    "name": "Ana Lee",
                    "course_streams": ["course/ECON 410-1"],
                    "field_streams": ["field/labor"],
                    "auto_streams": ["course/ECON 410-1"],
                    "auto_course_streams": ["course/ECON 410-1"],
                    "auto_field_streams": [],
                    "student": {"name": "Ana Lee", "year": 1, "email": "alee@u.northwestern.edu",
                                "fields": ["Labor"], "is_kellogg": false}
                }),
            )
            .unwrap();
        assert!(out.starts_with("Hi Ana Lee"));
        assert!(out.contains("* :eddie: #**course/ECON 410-1**"));
        assert!(out.contains("* #**field/labor**"));
        assert!(!out.contains("could not find you"));
    }

    #[test]
    fn welcome_for_unmatched_user() {
        let out = renderer()
            .render(
                WELCOME,
                &json!({
                    "name": "Visitor",
                    "course_streams": [],
                    "field_streams": [],
                    "auto_streams": [],
                    "auto_course_streams": [],
                    "auto_field_streams": [],
                    "student": null
                }),
            )
            .unwrap();
        assert!(out.contains("could not find you"));
    }

    #[test]
    fn markdown_is_not_escaped() {
        let out = renderer()
            .render(
                PAPER_DIGEST,
                &json!({"papers": [{
                    "title": "Rates & Risk",
                    "url": "https://www.nber.org/papers/w1",
                    "abstract": "A <b>bold</b> claim",
                    "authors": [{"name": "Jane Doe", "url": "https://www.nber.org/people/jd"},
                                {"name": "John Roe", "url": null}]
                }]}),
            )
            .unwrap();
        assert!(out.contains("**[Rates & Risk](https://www.nber.org/papers/w1)**"));
        assert!(out.contains("[Jane Doe](https://www.nber.org/people/jd), John Roe"));
        assert!(out.contains("A <b>bold</b> claim"));
    }

    #[test]
    fn daily_uses_event_partial() {
        let out = renderer()
            .render(
                DAILY_EVENTS,
                &json!({"events": [{
                    "title": "Macro Lunch", "url": "https://planitpurple.northwestern.edu/event/1",
                    "start": "12:00 PM", "end": "1:30 PM", "is_all_day": false,
                    "is_cancelled": true, "description": null
                }]}),
            )
            .unwrap();
        assert!(out.contains("~~[Macro Lunch](https://planitpurple.northwestern.edu/event/1)~~ (cancelled)"));
        assert!(out.contains("12:00 PM – 1:30 PM"));
    }

    #[test]
    fn override_dir_replaces_builtin() {
        let dir = std::env::temp_dir().join(format!("econ-bots-tpl-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("welcome.md.hbs"), "Hello {{name}}!").unwrap();

        let renderer = HandlebarsRenderer::new(vec![], Some(&dir)).unwrap();
        let out = renderer.render(WELCOME, &json!({"name": "Sam"})).unwrap();
        assert_eq!(out, "Hello Sam!");
        // Templates without an override keep the built-in.
        let out = renderer.render(DAILY_EVENTS, &json!({"events": []})).unwrap();
        assert!(out.contains("Today's events"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unknown_template_is_an_error() {
        let err = renderer().render("nope", &json!({})).unwrap_err();
        assert!(matches!(err, DomainError::Template(_)));
    }
}
