// Prompt fragments for the storyboard assistant.
// Every LLM-backed responder builds its system prompt from these.

use crate::storyboard::session::Role;

const BASE_SYSTEM: &str = "You are the assistant inside an interview companion. \
    Answer in two to four plain sentences. \
    Do NOT use markdown, lists, or code fences. \
    Do NOT invent employers, dates, or metrics that were not given to you.";

const CANDIDATE_SYSTEM: &str = "You are talking to the candidate. \
    Help them capture and shape their professional story.";

const RECRUITER_SYSTEM: &str = "You are talking to a recruiter exploring this candidate. \
    Describe the candidate's background factually and suggest a follow-up question.";

/// System prompt for the given session role.
pub fn storyboard_system(role: Role) -> String {
    let audience = match role {
        Role::Candidate => CANDIDATE_SYSTEM,
        Role::Recruiter => RECRUITER_SYSTEM,
    };
    format!("{BASE_SYSTEM} {audience}")
}
