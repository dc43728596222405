//! Template file loader (.txt format)
//!
//! One template per file, one `Key:Value` pair per line. Lines starting with
//! `#` are comments. `\n` inside a description is an escaped newline.

use crate::core::{
    Declarability, ResolutionTiming, TargetingParams, Template, TemplateId, TemplateName,
    TickCondition, TickEffect,
};
use crate::{GameError, Result};
use std::fs;
use std::path::Path;

/// Template loader for .txt files
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load a template from a .txt file
    pub fn load_from_file(path: &Path) -> Result<Template> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a template from its text content
    ///
    /// The returned template has id 0; the catalog assigns the real id.
    pub fn parse(content: &str) -> Result<Template> {
        let mut name = None;
        let mut description = String::new();
        let mut resolution_timing = ResolutionTiming::Before;
        let mut is_free = false;
        let mut declarability = Declarability::Always;
        let mut tick_condition = TickCondition::Default;
        let mut tick_effect = TickEffect::Noop;
        let mut max_tick_count = 0;
        let mut targeting = TargetingParams::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(GameError::InvalidTemplateFormat(format!(
                    "expected 'Key:Value', got '{line}'"
                )));
            };
            let value = value.trim();

            match key.trim() {
                "Name" => name = Some(TemplateName::new(value)),
                "Description" => description = value.replace("\\n", "\n"),
                "Timing" => resolution_timing = value.parse()?,
                "Free" => is_free = parse_bool(value)?,
                "Declarability" => declarability = value.parse()?,
                "TickCondition" => tick_condition = value.parse()?,
                "TickEffect" => tick_effect = value.parse()?,
                "MaxTicks" => max_tick_count = parse_number(key, value)?,
                "TargetType" => targeting.target_type = value.parse()?,
                "TargetMin" => targeting.count_min = parse_number(key, value)?,
                "TargetMax" => targeting.count_max = parse_number(key, value)?,
                "TargetCondition" => targeting.condition = value.parse()?,
                other => {
                    return Err(GameError::InvalidTemplateFormat(format!(
                        "unknown key '{other}'"
                    )))
                }
            }
        }

        let name =
            name.ok_or_else(|| GameError::InvalidTemplateFormat("Missing template name".to_string()))?;

        if targeting.count_min > targeting.count_max {
            return Err(GameError::InvalidTemplateFormat(format!(
                "{name}: TargetMin {} exceeds TargetMax {}",
                targeting.count_min, targeting.count_max
            )));
        }

        Ok(Template {
            id: TemplateId::new(0),
            name,
            description,
            resolution_timing,
            is_free,
            declarability,
            tick_condition,
            tick_effect,
            max_tick_count,
            targeting,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        other => Err(GameError::InvalidTemplateFormat(format!(
            "expected true/false, got '{other}'"
        ))),
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value.parse().map_err(|_| {
        GameError::InvalidTemplateFormat(format!(
            "{key} must be a non-negative integer, got '{value}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TargetCondition, TargetType};

    #[test]
    fn test_parse_quick_shot() {
        let content = r#"
# direct damage
Name:Quick Shot
Description:Action\nTarget an opponent. Deal 1 damage.
Timing:before
Free:false
TickCondition:tick_if_target_still_alive
TickEffect:deal_direct_damage_based_on_template
MaxTicks:1
TargetMin:1
TargetCondition:is_alive
"#;

        let template = TemplateLoader::parse(content).unwrap();
        assert_eq!(template.name.as_str(), "Quick Shot");
        assert_eq!(template.description, "Action\nTarget an opponent. Deal 1 damage.");
        assert_eq!(template.declarability, Declarability::Always);
        assert_eq!(template.tick_effect, TickEffect::DamageTargets);
        assert_eq!(template.max_tick_count, 1);
        assert_eq!(template.targeting.target_type, TargetType::Enemy);
        assert_eq!(template.targeting.count_min, 1);
        assert_eq!(template.targeting.count_max, 1);
        assert_eq!(template.targeting.condition, TargetCondition::IsAlive);
    }

    #[test]
    fn test_unknown_behavior_key_fails_loudly() {
        let content = "Name:Broken\nTickEffect:deal_damage_twice\n";
        let err = TemplateLoader::parse(content).unwrap_err();
        assert!(matches!(err, GameError::UnknownBehavior { kind: "tick effect", .. }));
    }

    #[test]
    fn test_missing_name() {
        let err = TemplateLoader::parse("Timing:after\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidTemplateFormat(_)));
    }

    #[test]
    fn test_bad_lines() {
        assert!(TemplateLoader::parse("Name:X\nMaxTicks:-1\n").is_err());
        assert!(TemplateLoader::parse("Name:X\nFree:maybe\n").is_err());
        assert!(TemplateLoader::parse("Name:X\nColour:red\n").is_err());
        assert!(TemplateLoader::parse("Name:X\njust text\n").is_err());
        assert!(TemplateLoader::parse("Name:X\nTargetMin:2\nTargetMax:1\n").is_err());
    }
}
