//! Lookup tables for technologies, partners and feature icons.
//!
//! Every lookup is total: unknown names get a generic fallback.

use std::collections::HashMap;

use reposite_core::slugify;

/// Display data for one technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechEntry {
    pub icon: String,
    pub description: String,
}

/// Display data for one partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerEntry {
    pub description: String,
    pub url: String,
}

/// Static lookup tables injected into prop preparation.
#[derive(Debug, Clone)]
pub struct Catalog {
    tech: HashMap<String, TechEntry>,
    partners: HashMap<String, PartnerEntry>,
    /// Ordered `(keyword, icon)` pairs; the first match wins.
    feature_icons: Vec<(String, String)>,
    referral: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const TECH: &[(&str, &str, Option<&str>)] = &[
    ("JavaScript", "javascript", Some("Dynamic programming language for web development")),
    ("TypeScript", "typescript", Some("Typed superset of JavaScript")),
    ("React", "react", Some("Library for building user interfaces")),
    ("Node.js", "nodejs", None),
    ("Python", "python", Some("Versatile programming language")),
    ("Rust", "rust", Some("Systems programming language focused on safety")),
    ("Go", "go", None),
    ("Docker", "docker", None),
];

const PARTNERS: &[(&str, &str, &str)] = &[
    ("Vercel", "Deploy your web applications instantly", "https://vercel.com"),
    ("Supabase", "Open source Firebase alternative", "https://supabase.com"),
    ("Railway", "Deploy without DevOps complexity", "https://railway.app"),
    ("Clerk", "Complete authentication solution", "https://clerk.com"),
    ("Sentry", "Application monitoring and error tracking", "https://sentry.io"),
];

const FEATURE_ICONS: &[(&str, &str)] = &[
    ("api", "api"),
    ("database", "database"),
    ("auth", "shield"),
    ("performance", "zap"),
    ("security", "lock"),
];

impl Catalog {
    /// Tables shipped with Reposite.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();

        for (name, icon, description) in TECH {
            catalog.tech.insert(
                (*name).to_string(),
                TechEntry {
                    icon: (*icon).to_string(),
                    description: description
                        .map_or_else(|| format!("{name} technology"), str::to_string),
                },
            );
        }

        for (name, description, url) in PARTNERS {
            catalog.partners.insert(
                (*name).to_string(),
                PartnerEntry {
                    description: (*description).to_string(),
                    url: (*url).to_string(),
                },
            );
        }

        catalog.feature_icons = FEATURE_ICONS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        catalog
    }

    /// Catalog with no entries; every lookup falls back.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tech: HashMap::new(),
            partners: HashMap::new(),
            feature_icons: Vec::new(),
            referral: "reposite".to_string(),
        }
    }

    /// Referral tag appended to partner URLs as `?ref=<tag>`.
    #[must_use]
    pub fn with_referral(mut self, tag: impl Into<String>) -> Self {
        self.referral = tag.into();
        self
    }

    /// Add or replace a technology.
    #[must_use]
    pub fn with_tech(mut self, name: impl Into<String>, entry: TechEntry) -> Self {
        self.tech.insert(name.into(), entry);
        self
    }

    /// Add or replace a partner.
    #[must_use]
    pub fn with_partner(mut self, name: impl Into<String>, entry: PartnerEntry) -> Self {
        self.partners.insert(name.into(), entry);
        self
    }

    pub fn tech_icon(&self, name: &str) -> String {
        self.tech
            .get(name)
            .map_or_else(|| "code".to_string(), |t| t.icon.clone())
    }

    pub fn tech_description(&self, name: &str) -> String {
        self.tech
            .get(name)
            .map_or_else(|| format!("{name} technology"), |t| t.description.clone())
    }

    pub fn partner_description(&self, name: &str) -> String {
        self.partners.get(name).map_or_else(
            || format!("Enhance your project with {name}"),
            |p| p.description.clone(),
        )
    }

    /// Partner URL with the referral tag, or `#` for unknown partners.
    pub fn partner_url(&self, name: &str) -> String {
        self.partners.get(name).map_or_else(
            || "#".to_string(),
            |p| format!("{}?ref={}", p.url, self.referral),
        )
    }

    pub fn partner_logo(&self, name: &str) -> String {
        format!("/assets/partners/{}-logo.svg", slugify(name))
    }

    /// Icon for a feature, by case-insensitive keyword sniffing.
    pub fn feature_icon(&self, feature: &str) -> String {
        let lower = feature.to_lowercase();
        self.feature_icons
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()))
            .map_or_else(|| "star".to_string(), |(_, icon)| icon.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tech_lookup_and_fallback() {
        let catalog = Catalog::default();
        assert_eq!(catalog.tech_icon("Rust"), "rust");
        assert_eq!(
            catalog.tech_description("Rust"),
            "Systems programming language focused on safety"
        );
        assert_eq!(catalog.tech_description("Docker"), "Docker technology");
        assert_eq!(catalog.tech_icon("Elixir"), "code");
        assert_eq!(catalog.tech_description("Elixir"), "Elixir technology");
    }

    #[test]
    fn test_partner_lookup_and_fallback() {
        let catalog = Catalog::default();
        assert_eq!(catalog.partner_url("Vercel"), "https://vercel.com?ref=reposite");
        assert_eq!(catalog.partner_url("Nobody"), "#");
        assert_eq!(
            catalog.partner_description("Nobody"),
            "Enhance your project with Nobody"
        );
        assert_eq!(catalog.partner_logo("Big Co"), "/assets/partners/big-co-logo.svg");
    }

    #[test]
    fn test_feature_icons() {
        let catalog = Catalog::default();
        assert_eq!(catalog.feature_icon("REST API"), "api");
        assert_eq!(catalog.feature_icon("Database sync"), "database");
        assert_eq!(catalog.feature_icon("OAuth login"), "shield");
        assert_eq!(catalog.feature_icon("High performance"), "zap");
        assert_eq!(catalog.feature_icon("Security audits"), "lock");
        assert_eq!(catalog.feature_icon("Dark mode"), "star");
    }

    #[test]
    fn test_injected_entries() {
        let catalog = Catalog::empty()
            .with_referral("acme")
            .with_tech(
                "Zig",
                TechEntry {
                    icon: "zig".to_string(),
                    description: "Robust language".to_string(),
                },
            )
            .with_partner(
                "Fly",
                PartnerEntry {
                    description: "Run apps close to users".to_string(),
                    url: "https://fly.io".to_string(),
                },
            );

        assert_eq!(catalog.tech_icon("Zig"), "zig");
        assert_eq!(catalog.tech_icon("Rust"), "code");
        assert_eq!(catalog.partner_url("Fly"), "https://fly.io?ref=acme");
        assert_eq!(catalog.feature_icon("api"), "star");
    }
}
