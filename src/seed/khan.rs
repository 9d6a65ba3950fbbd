//! Khan Academy practice links, derived from embedded URL paths.
//!
//! Each path looks like
//! `/science/<course>/<id>:<unit>/<id>:<lesson>/e/<exercise-slug>` or ends in
//! `/quiz/<id>:<slug>` / `/test/<id>:<slug>`. Names, courses and units are all
//! recovered from the path itself.

use super::SeedNode;
use crate::models::ResourceKind;

pub const SOURCE: &str = "Khan Academy";
const BASE_URL: &str = "https://www.khanacademy.org";
const PATHS: &str = include_str!("data/khan_academy.txt");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeKind {
    Exercise,
    Quiz,
    Test,
}

impl PracticeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exercise => "Exercise",
            Self::Quiz => "Quiz",
            Self::Test => "Unit test",
        }
    }
}

/// One practice link with the metadata recovered from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeLink {
    pub name: String,
    pub kind: PracticeKind,
    pub course: String,
    /// Title-cased unit, e.g. `Kinematics`. `None` when the path has no unit segment.
    pub unit: Option<String>,
    pub url: String,
}

impl PracticeLink {
    /// `"<course> - <unit>"`, or just the course.
    pub fn topic(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} - {}", self.course, unit),
            None => self.course.clone(),
        }
    }
}

pub fn parse_link(path: &str) -> PracticeLink {
    let parts: Vec<&str> = path.split('/').collect();
    let has = |token: &str| parts.iter().any(|p| *p == token);

    let kind = if has("quiz") {
        PracticeKind::Quiz
    } else if has("test") {
        PracticeKind::Test
    } else {
        PracticeKind::Exercise
    };

    let last = parts.last().copied().unwrap_or_default();
    let slug = if has("e") {
        last
    } else {
        last.rsplit(':').next().unwrap_or(last)
    };
    let name = capitalize_first(
        &slug
            .replace('-', " ")
            .replace("ap1", "AP1")
            .replace("2d", "2D"),
    );

    let course = if path.contains("ap-college-physics-1") {
        "AP Physics 1"
    } else if path.contains("ap-physics-2") {
        "AP Physics 2"
    } else {
        "AP Physics"
    };

    let unit = parts.iter().find_map(|p| unit_slug(p)).map(title_case);

    PracticeLink {
        name,
        kind,
        course: course.to_string(),
        unit,
        url: format!("{}{}", BASE_URL, path),
    }
}

pub fn links() -> Vec<PracticeLink> {
    PATHS
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(parse_link)
        .collect()
}

/// `Khan Academy` → course → unit → practice links, in first-seen order.
pub fn nodes() -> Vec<SeedNode> {
    let mut courses: Vec<SeedNode> = Vec::new();

    for link in links() {
        let course = match courses.iter().position(|c| c.name == link.course) {
            Some(i) => i,
            None => {
                courses.push(SeedNode::category(link.course.clone(), Vec::new()));
                courses.len() - 1
            }
        };
        let course = &mut courses[course];

        let unit_name = link.unit.clone().unwrap_or_else(|| "General".to_string());
        let unit = match course.children.iter().position(|u| u.name == unit_name) {
            Some(i) => i,
            None => {
                course
                    .children
                    .push(SeedNode::category(unit_name, Vec::new()));
                course.children.len() - 1
            }
        };
        let unit = &mut course.children[unit];

        unit.children.push(SeedNode::leaf(
            ResourceKind::Link,
            format!("{}: {}", link.kind.label(), link.name),
            link.url,
        ));
    }

    vec![SeedNode::category(SOURCE, courses)]
}

/// Slug after the id in segments like `xf557a762645cccc5:kinematics`.
fn unit_slug(segment: &str) -> Option<&str> {
    let (prefix, rest) = segment.split_once(':')?;
    let x = prefix.rfind('x')?;
    let hex = &prefix[x + 1..];
    let is_id = !hex.is_empty()
        && hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if !is_id {
        return None;
    }
    rest.split(':').next()
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
