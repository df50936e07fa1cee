use chrono::{DateTime, TimeZone};
use muse_types::Agent;

pub const ASSISTANT_NAME: &str = "Muse";

const INSTRUCTIONS: &str = "Instructions:
- Be helpful, informative, and engaging
- Provide clear and accurate responses
- Ask follow-up questions when needed for clarification
- Be concise but thorough in your explanations
";

/// System prompt for a reply. Agents with a personality speak as
/// themselves; everything else gets the generic assistant.
pub fn build_preamble<Tz: TimeZone>(agent: Option<&Agent>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let today = format!("Today is {}.", now.format("%A, %Y-%m-%d"));
    let context = "Use your general knowledge and past conversation with the user as context to inform your responses.";

    match agent.and_then(|a| a.personality.as_deref().map(|p| (a, p))) {
        Some((agent, personality)) => format!(
            "You are {}, a personal agent.\n{}\n\n{}\n\n{}\n\n{}",
            agent.name, personality, context, today, INSTRUCTIONS
        ),
        None => format!(
            "You are {}, a smart, inquisitive and helpful personal assistant.\n{}\n\n{}\n\n{}",
            ASSISTANT_NAME, context, today, INSTRUCTIONS
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_generic_preamble_has_date() {
        let preamble = build_preamble(None, &fixed_now());
        assert!(preamble.starts_with("You are Muse, a smart"));
        assert!(preamble.contains("Today is Friday, 2024-03-15."));
    }

    #[test]
    fn test_agent_personality_preamble() {
        let mut agent = Agent::new("Ledger", None);
        agent.personality = Some("You track household spending.".to_string());

        let preamble = build_preamble(Some(&agent), &fixed_now());
        assert!(preamble.starts_with("You are Ledger, a personal agent.\nYou track household spending."));
        assert!(preamble.contains("Today is Friday, 2024-03-15."));
    }

    #[test]
    fn test_agent_without_personality_uses_generic() {
        let agent = Agent::new("Plain", None);
        let preamble = build_preamble(Some(&agent), &fixed_now());
        assert!(preamble.starts_with("You are Muse"));
    }
}
