//! Prompt construction for grounded answers

use super::{RetrievalConfig, RetrievalPayload};
use crate::domain::llm::LlmRequest;

pub const SYSTEM_PROMPT: &str = "You are a helpful, knowledgeable travel assistant. \
Use both semantic summaries and graph relationships to craft accurate, practical, \
and concise travel recommendations. Mention node ids when referring to destinations. \
Think step-by-step internally but only include your final reasoning in the response.";

const RESPONSE_FORMAT: &str = "Use the semantic context for factual information and the graph \
facts for relational insights. Respond in this format:\n\
1. **Overview**: Brief context summary (1-2 sentences)\n\
2. **Suggested Itinerary**: 3-4 short bullet points\n\
3. **References**: Mention node ids used.\n";

/// Builds the completion request for `query`
///
/// The user turn carries the merged `summary` and, separately, the first
/// `prompt_fact_limit` graph facts with their descriptions.
pub fn build_request(
    query: &str,
    payload: &RetrievalPayload,
    summary: &str,
    config: &RetrievalConfig,
) -> LlmRequest {
    let graph_context = payload
        .graph_facts
        .iter()
        .take(config.prompt_fact_limit)
        .map(|fact| fact.detail_line())
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "User query: {}\n\n\
         Semantic context (background facts):\n{}\n\n\
         Graph facts (relationships and connections):\n{}\n\n\
         {}",
        query, summary, graph_context, RESPONSE_FORMAT
    );

    LlmRequest::builder()
        .system(SYSTEM_PROMPT)
        .user(user)
        .temperature(config.temperature)
        .max_tokens(config.max_tokens)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::GraphFact;
    use crate::domain::llm::MessageRole;

    #[test]
    fn test_request_layout() {
        let payload = RetrievalPayload::new(
            vec![],
            vec![GraphFact::new("city_hanoi", "Connected_To", "city_hue")
                .with_target_name("Hue")
                .with_target_desc("Imperial city")],
        );

        let request = build_request("Hanoi to Hue?", &payload, "Hanoi is the capital", &RetrievalConfig::default());

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(600));

        let user = request.user_content().unwrap();
        assert!(user.starts_with("User query: Hanoi to Hue?\n\n"));
        assert!(user.contains("Semantic context (background facts):\nHanoi is the capital\n\n"));
        assert!(user.contains("- (city_hanoi) -[Connected_To]-> (city_hue) Hue: Imperial city"));
        assert!(user.contains("**Suggested Itinerary**"));
    }

    #[test]
    fn test_prompt_caps_graph_facts() {
        let facts = (0..25)
            .map(|i| GraphFact::new(format!("src_{}", i), "Near", format!("dst_{}", i)))
            .collect();
        let payload = RetrievalPayload::new(vec![], facts);

        let request = build_request("q", &payload, "", &RetrievalConfig::default());
        let user = request.user_content().unwrap();

        assert!(user.contains("(src_19)"));
        assert!(!user.contains("(src_20)"));
    }
}
