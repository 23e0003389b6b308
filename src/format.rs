//! Text rendering of query results for the MCP transport.
//!
//! Every renderer writes into a `String` through `fmt::Write`; writing to a `String` cannot
//! fail, so the public wrappers discard the `fmt::Result`.

use crate::corpus::{ApiEntry, MethodDoc};
use crate::deprecation::DeprecationInfo;
use crate::detection::PackageManager;
use crate::registry::{PackageInfo, VersionInfo};
use crate::types::{PracticeResult, SearchResult};
use std::fmt::{self, Write as _};

fn render(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut output = String::new();
    let _ = f(&mut output);
    output
}

/// Render ranked search results, numbered from 1.
pub fn search_results(query: &str, results: &[SearchResult]) -> String {
    render(|out| write_search_results(out, query, results))
}

fn write_search_results(out: &mut String, query: &str, results: &[SearchResult]) -> fmt::Result {
    if results.is_empty() {
        writeln!(out, "No results found for '{}'.\n", query)?;
        writeln!(out, "Search tips:")?;
        writeln!(out, "• Try fewer or more general terms")?;
        writeln!(out, "• Drop the category filter to search everything")?;
        writeln!(out, "• Use get_api_reference for a known class or module name")?;
        return Ok(());
    }

    writeln!(out, "Found {} result(s) for '{}':\n", results.len(), query)?;
    for (i, result) in results.iter().enumerate() {
        writeln!(out, "## {}. {}", i + 1, result.title)?;
        writeln!(
            out,
            "Category: {} | Score: {:.1} | Match: {}",
            result.category, result.score, result.source
        )?;
        writeln!(out, "URL: {}", result.url)?;
        if let Some(api_link) = &result.api_link {
            writeln!(out, "API: {}", api_link)?;
        }
        if let Some(deprecation) = &result.deprecation {
            writeln!(out, "⚠ {}", deprecation)?;
        }
        writeln!(out, "\n{}\n", result.excerpt)?;
    }
    Ok(())
}

/// Render a full API entry.
pub fn api_entry(entry: &ApiEntry, deprecation: Option<&DeprecationInfo>) -> String {
    render(|out| write_api_entry(out, entry, deprecation))
}

fn write_api_entry(
    out: &mut String,
    entry: &ApiEntry,
    deprecation: Option<&DeprecationInfo>,
) -> fmt::Result {
    writeln!(out, "# {} ({})", entry.name, entry.kind)?;
    if let Some(module) = &entry.module {
        writeln!(out, "Module: {}", module)?;
    }
    if let Some(extends) = &entry.extends {
        writeln!(out, "Extends: {}", extends)?;
    }
    if let Some(file) = &entry.file {
        match entry.line {
            Some(line) => writeln!(out, "Source: {}:{}", file, line)?,
            None => writeln!(out, "Source: {}", file)?,
        }
    }
    writeln!(out, "URL: {}", entry.url())?;
    if let Some(info) = deprecation {
        writeln!(out, "\n⚠ {}", info.summary())?;
    }

    if !entry.description.trim().is_empty() {
        writeln!(out, "\n{}", entry.description.trim())?;
    }

    if !entry.methods.is_empty() {
        writeln!(out, "\n## Methods")?;
        for method in &entry.methods {
            write_method(out, method)?;
        }
    }

    if !entry.properties.is_empty() {
        writeln!(out, "\n## Properties")?;
        for property in &entry.properties {
            write!(out, "- `{}`", property.name)?;
            if let Some(ty) = &property.type_name {
                write!(out, ": {}", ty)?;
            }
            if let Some(description) = &property.description {
                write!(out, " - {}", first_line(description))?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_method(out: &mut String, method: &MethodDoc) -> fmt::Result {
    let params: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
    write!(out, "\n### {}({})", method.name, params.join(", "))?;
    if let Some(ty) = method.returns.as_ref().and_then(|r| r.type_name.as_deref()) {
        write!(out, " → {}", ty)?;
    }
    writeln!(out)?;

    if let Some(description) = &method.description {
        writeln!(out, "{}", description.trim())?;
    }
    for param in &method.params {
        write!(out, "- `{}`", param.name)?;
        if let Some(ty) = &param.type_name {
            write!(out, " ({})", ty)?;
        }
        if let Some(description) = &param.description {
            write!(out, ": {}", first_line(description))?;
        }
        writeln!(out)?;
    }
    if let Some(description) = method.returns.as_ref().and_then(|r| r.description.as_deref()) {
        writeln!(out, "Returns: {}", first_line(description))?;
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or_default()
}

/// Render a failed API lookup with "did you mean" suggestions.
pub fn api_not_found(query: &str, suggestions: &[String]) -> String {
    render(|out| {
        writeln!(out, "No API entry found for '{}'.", query)?;
        if !suggestions.is_empty() {
            writeln!(out, "\nDid you mean one of these?")?;
            for suggestion in suggestions {
                writeln!(out, "• `{}`", suggestion)?;
            }
        }
        Ok(())
    })
}

pub fn practices(topic: &str, results: &[PracticeResult]) -> String {
    render(|out| write_practices(out, topic, results))
}

fn write_practices(out: &mut String, topic: &str, results: &[PracticeResult]) -> fmt::Result {
    if results.is_empty() {
        writeln!(out, "No best practices found for '{}'.", topic)?;
        writeln!(out, "Try a broader topic such as 'components', 'routing' or 'testing'.")?;
        return Ok(());
    }

    writeln!(out, "Best practices for '{}':\n", topic)?;
    for (i, practice) in results.iter().enumerate() {
        writeln!(out, "## {}. {}", i + 1, practice.title)?;
        writeln!(
            out,
            "Section: {} ({}) | Score: {}",
            practice.section, practice.category, practice.score
        )?;
        writeln!(out, "URL: {}\n", practice.url)?;
        writeln!(out, "{}", practice.content)?;

        if !practice.code_examples.is_empty() {
            writeln!(out, "\n### Examples")?;
            for example in &practice.code_examples {
                writeln!(out, "\n{}", example)?;
            }
        }
        if !practice.anti_patterns.is_empty() {
            writeln!(out, "\n### Avoid")?;
            for anti in &practice.anti_patterns {
                writeln!(out, "- {}", anti.replace('\n', " "))?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn package_info(info: &PackageInfo, manager: PackageManager) -> String {
    render(|out| {
        writeln!(out, "# {}", info.name)?;
        if let Some(latest) = &info.latest {
            writeln!(out, "Latest: {}", latest)?;
        }
        if let Some(description) = &info.description {
            writeln!(out, "\n{}\n", description)?;
        }
        if let Some(homepage) = &info.homepage {
            writeln!(out, "Homepage: {}", homepage)?;
        }
        if let Some(repository) = &info.repository {
            writeln!(out, "Repository: {}", repository)?;
        }
        if let Some(license) = &info.license {
            writeln!(out, "License: {}", license)?;
        }

        if !info.recent_versions.is_empty() {
            writeln!(out, "\n## Recent versions")?;
            for version in &info.recent_versions {
                // Dates only; the time of day is noise here
                let date = version.published.split('T').next().unwrap_or(&version.published);
                writeln!(out, "- {} ({})", version.version, date)?;
            }
        }

        writeln!(out, "\n## Install ({})", manager)?;
        writeln!(out, "{}", manager.install_command(&info.name))
    })
}

pub fn version_info(info: &VersionInfo) -> String {
    render(|out| {
        match &info.latest_stable {
            Some(release) => {
                writeln!(out, "Latest stable Ember release: {}", release.tag_name)?;
                if let Some(name) = release.name.as_deref().filter(|n| *n != release.tag_name) {
                    writeln!(out, "Name: {}", name)?;
                }
                if let Some(published) = &release.published_at {
                    writeln!(out, "Published: {}", published)?;
                }
                if !release.html_url.is_empty() {
                    writeln!(out, "URL: {}", release.html_url)?;
                }
            }
            None => writeln!(out, "No stable Ember release found.")?,
        }

        if !info.recent.is_empty() {
            writeln!(out, "\nRecent releases: {}", info.recent.join(", "))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Category, ParamDoc, ReturnDoc};
    use crate::registry::PackageVersion;
    use crate::types::MatchSource;
    use assert2::check;

    fn result(title: &str, source: MatchSource) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            category: Category::Guides,
            excerpt: "Tracked properties drive re-rendering.".to_string(),
            score: 32.0,
            url: "https://guides.emberjs.com/release/".to_string(),
            api_link: None,
            source,
            deprecation: None,
        }
    }

    #[test]
    fn test_search_results_numbered() {
        let text = search_results(
            "tracked",
            &[
                result("Tracked Properties", MatchSource::Hybrid),
                result("Autotracking", MatchSource::Semantic),
            ],
        );
        check!(text.contains("## 1. Tracked Properties"));
        check!(text.contains("## 2. Autotracking"));
        check!(text.contains("Score: 32.0 | Match: hybrid"));
    }

    #[test]
    fn test_search_results_empty() {
        check!(search_results("zzz", &[]).starts_with("No results found for 'zzz'"));
    }

    #[test]
    fn test_api_entry_sections() {
        let entry = ApiEntry {
            name: "RouterService".to_string(),
            kind: "class".to_string(),
            module: Some("@ember/routing/router-service".to_string()),
            description: "Routing from anywhere.".to_string(),
            file: Some("packages/router.ts".to_string()),
            line: Some(42),
            extends: Some("Service".to_string()),
            methods: vec![MethodDoc {
                name: "transitionTo".to_string(),
                description: Some("Transition to a route.".to_string()),
                params: vec![ParamDoc {
                    name: "routeName".to_string(),
                    type_name: Some("String".to_string()),
                    description: None,
                }],
                returns: Some(ReturnDoc {
                    type_name: Some("Transition".to_string()),
                    description: None,
                }),
            }],
            properties: Vec::new(),
        };

        let info = DeprecationInfo {
            since: Some("6.0".to_string()),
            replacement: None,
        };
        let text = api_entry(&entry, Some(&info));
        check!(text.contains("Source: packages/router.ts:42"));
        check!(text.contains("### transitionTo(routeName) → Transition"));
        check!(text.contains("- `routeName` (String)"));
        check!(text.contains("Deprecated since 6.0"));
        check!(!text.contains("## Properties"));
    }

    #[test]
    fn test_package_info_install_command() {
        let info = PackageInfo {
            name: "ember-concurrency".to_string(),
            latest: Some("4.0.2".to_string()),
            description: None,
            homepage: None,
            repository: None,
            license: Some("MIT".to_string()),
            recent_versions: vec![PackageVersion {
                version: "4.0.2".to_string(),
                published: "2024-04-01T00:00:00.000Z".to_string(),
            }],
        };
        let text = package_info(&info, PackageManager::Pnpm);
        check!(text.contains("- 4.0.2 (2024-04-01)"));
        check!(text.contains("pnpm add ember-concurrency"));
    }
}
