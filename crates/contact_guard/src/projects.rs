//! The projects card: a fixed catalog and the search, status and tech
//! filters applied to it.
//!
//! Filters combine with AND. Inside the status and tech groups a project
//! matches when it carries any selected value; an empty group matches
//! everything.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

/// Status line shown when the filters hide every project.
pub const NO_MATCH: &str = "No projects match current filters";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Live,
    Development,
    Concept,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    /// Lowercase tech tags.
    pub tech: Vec<String>,
}

impl Project {
    pub fn new(name: &str, description: &str, status: ProjectStatus, tech: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            status,
            tech: tech.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Everything a search term is matched against, lowercased.
    fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.description,
            self.status,
            self.tech.join(" ")
        )
        .to_lowercase()
    }
}

/// Active search term plus the selected statuses and techs, kept in the
/// order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    search: String,
    statuses: Vec<ProjectStatus>,
    techs: Vec<String>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_lowercase();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn statuses(&self) -> &[ProjectStatus] {
        &self.statuses
    }

    pub fn techs(&self) -> &[String] {
        &self.techs
    }

    pub fn toggle_status(&mut self, status: ProjectStatus) {
        if let Some(pos) = self.statuses.iter().position(|s| *s == status) {
            self.statuses.remove(pos);
        } else {
            self.statuses.push(status);
        }
    }

    /// The "all" status button.
    pub fn all_statuses(&mut self) {
        self.statuses.clear();
    }

    pub fn toggle_tech(&mut self, tech: &str) {
        let tech = tech.to_lowercase();
        if let Some(pos) = self.techs.iter().position(|t| *t == tech) {
            self.techs.remove(pos);
        } else {
            self.techs.push(tech);
        }
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.statuses.clear();
        self.techs.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.statuses.is_empty() || !self.techs.is_empty()
    }

    pub fn matches(&self, project: &Project) -> bool {
        let search = self.search.is_empty() || project.haystack().contains(&self.search);
        let status = self.statuses.is_empty() || self.statuses.contains(&project.status);
        let tech = self.techs.is_empty() || self.techs.iter().any(|t| project.tech.contains(t));
        search && status && tech
    }

    /// `Search: "x" | Status: a, b | Tech: c`, or `None` with no filter set.
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("Search: \"{}\"", self.search));
        }
        if !self.statuses.is_empty() {
            let names: Vec<String> = self.statuses.iter().map(|s| s.to_string()).collect();
            parts.push(format!("Status: {}", names.join(", ")));
        }
        if !self.techs.is_empty() {
            parts.push(format!("Tech: {}", self.techs.join(", ")));
        }
        (!parts.is_empty()).then(|| parts.join(" | "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCatalog {
    projects: Vec<Project>,
}

impl ProjectCatalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// The projects listed on the portal.
    pub fn portfolio() -> Self {
        use ProjectStatus::*;
        Self::new(vec![
            Project::new(
                "3D Holograms",
                "Interactive blueprint workspace",
                Live,
                &["three.js", "webgl", "javascript"],
            ),
            Project::new(
                "Neural Flow",
                "Particle based background engine",
                Live,
                &["canvas", "javascript"],
            ),
            Project::new(
                "Portal",
                "This site, now in your terminal",
                Development,
                &["rust", "ratatui"],
            ),
            Project::new(
                "Automation Station",
                "Reports, sync jobs and notifications",
                Development,
                &["python", "n8n"],
            ),
            Project::new(
                "Signal Board",
                "Status wall for running automations",
                Concept,
                &["rust", "websocket"],
            ),
        ])
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn statuses() -> impl Iterator<Item = ProjectStatus> {
        ProjectStatus::iter()
    }

    /// Distinct tech tags in catalog order.
    pub fn techs(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for tech in self.projects.iter().flat_map(|p| &p.tech) {
            if !out.contains(&tech.as_str()) {
                out.push(tech);
            }
        }
        out
    }

    pub fn visible(&self, filter: &ProjectFilter) -> Vec<&Project> {
        let visible: Vec<&Project> = self.projects.iter().filter(|p| filter.matches(p)).collect();
        debug!(
            visible = visible.len(),
            total = self.projects.len(),
            "projects filtered"
        );
        visible
    }

    /// Line under the filter controls: [`NO_MATCH`] when nothing is left,
    /// the filter summary otherwise.
    pub fn status_line(&self, filter: &ProjectFilter) -> Option<String> {
        if !self.projects.iter().any(|p| filter.matches(p)) {
            return Some(NO_MATCH.to_owned());
        }
        filter.summary()
    }
}
