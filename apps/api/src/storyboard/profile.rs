//! Profile content behind the storyboard cards.
//!
//! The classifier never owns its data: it asks a `ProfileProvider` for the card
//! it picked. `StaticProfile` is the built-in candidate profile.

use crate::storyboard::models::{
    ProjectEntry, ProjectList, TechGrid, Technology, Timeline, TimelineEvent,
};

/// Source of the content shown on each card category.
pub trait ProfileProvider: Send + Sync {
    fn technologies(&self) -> TechGrid;
    fn experience(&self) -> Timeline;
    fn projects(&self) -> ProjectList;
}

/// Fixed candidate profile served when no other provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProfile;

impl ProfileProvider for StaticProfile {
    fn technologies(&self) -> TechGrid {
        TechGrid {
            title: "Technical Competencies".to_string(),
            technologies: vec![
                tech("TypeScript", "⚡", "Expert", "4+"),
                tech("React", "⚛️", "Expert", "5+"),
                tech("Node.js", "🟢", "Advanced", "3+"),
                tech("PostgreSQL", "🐘", "Advanced", "3+"),
                tech("Redis", "🔴", "Intermediate", "2+"),
                tech("Docker", "🐳", "Intermediate", "2+"),
                tech("AWS", "☁️", "Intermediate", "2+"),
                tech("GraphQL", "🔗", "Advanced", "2+"),
            ],
        }
    }

    fn experience(&self) -> Timeline {
        Timeline {
            title: "Professional Experience".to_string(),
            events: vec![
                event(
                    "Senior Frontend Engineer",
                    "TechCorp",
                    "2022 - Present",
                    "Led development of React-based dashboard serving 10k+ users",
                    &["Reduced load time by 40%", "Mentored 3 junior developers"],
                ),
                event(
                    "Full Stack Developer",
                    "StartupXYZ",
                    "2020 - 2022",
                    "Built scalable web applications using Node.js and React",
                    &["Launched 5 major features", "Improved API performance by 60%"],
                ),
                event(
                    "Frontend Developer",
                    "WebAgency",
                    "2019 - 2020",
                    "Developed responsive websites for various clients",
                    &[
                        "Delivered 15+ projects on time",
                        "Achieved 98% client satisfaction",
                    ],
                ),
            ],
        }
    }

    fn projects(&self) -> ProjectList {
        ProjectList {
            title: "Key Projects".to_string(),
            items: vec![
                project(
                    "E-commerce Platform",
                    "Full-stack marketplace with 50k+ active users",
                    &["React", "Node.js", "PostgreSQL", "Stripe"],
                    "$2M+ in transactions processed",
                ),
                project(
                    "Analytics Dashboard",
                    "Real-time data visualization for business metrics",
                    &["Vue.js", "D3.js", "Python", "Redis"],
                    "40% improvement in decision-making speed",
                ),
                project(
                    "Mobile App",
                    "Cross-platform productivity app",
                    &["React Native", "Firebase", "TypeScript"],
                    "25k+ downloads, 4.8★ rating",
                ),
            ],
        }
    }
}

fn tech(name: &str, icon: &str, level: &str, years: &str) -> Technology {
    Technology {
        name: name.to_string(),
        icon: icon.to_string(),
        level: level.to_string(),
        years_label: years.to_string(),
    }
}

fn event(
    title: &str,
    org: &str,
    period: &str,
    description: &str,
    achievements: &[&str],
) -> TimelineEvent {
    TimelineEvent {
        title: title.to_string(),
        org: org.to_string(),
        period: period.to_string(),
        description: description.to_string(),
        achievements: achievements.iter().map(|a| a.to_string()).collect(),
    }
}

fn project(name: &str, description: &str, tags: &[&str], impact: &str) -> ProjectEntry {
    ProjectEntry {
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        impact: impact.to_string(),
    }
}
