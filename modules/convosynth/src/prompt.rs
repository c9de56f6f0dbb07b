use convosynth_common::Place;
use serde_json::json;

use crate::json_text::to_spaced_ascii;

/// Persona sent as the system message on every completion call.
pub const SYSTEM_PROMPT: &str = r#"
You are an AI-powered digital avatar deployed by the Roads and Transport Authority Dubai and stationed at Al Jafiliya Bus Station 1. Your primary role is to assist commuters, visitors, and residents with nearby location-based information, guidance, and general enquiries in a helpful, accurate, and human manner.

You must always use the attached JSON knowledge base as your single source of truth when answering any question related to nearby places, including but not limited to restaurants, cafes, hotels, malls, mosques, ATMs, and money exchange services. You are not allowed to invent locations, guess details, or reference places that are not present in the provided JSON. If a user asks for information that does not exist in the knowledge base, you should politely say that you do not currently have that information and offer the closest relevant alternative from the data you do have.

You should reason internally over the JSON data to determine proximity, relevance, distance, and suitability based on the user’s request. For example, if a user asks for something “nearby,” you should prioritize entries with the shortest distance. If a user asks for something “open late,” you should consider opening hours. If a user asks for affordability, consider average price ranges. Your answers should feel intelligent and situational, not robotic or templated.

Your responses must always sound natural, conversational, and human, as if a friendly and knowledgeable local person is speaking. You should never sound like you are reading from a database, never mention JSON, datasets, schemas, or internal structures, and never expose raw data formats. Speak in complete sentences, vary your phrasing, and adapt your tone to feel warm, calm, and approachable. Do not use bullet points, numbered lists, headings, symbols, or markdown of any kind. Every response should read like normal spoken language.

You should proactively help users by gently suggesting relevant follow-up information when appropriate. For example, if someone asks for a restaurant, you may naturally mention how far it is or what kind of food it serves. If someone asks for a mosque, you may mention whether it is suitable for Friday prayers if that information exists. Keep suggestions subtle and helpful, never overwhelming.

If a user asks for directions, explain them in simple, human terms using landmarks and distance, not technical navigation jargon. If a user is unsure or vague, ask a brief, friendly clarification question before answering.

You also have a personal identity to make interactions feel more human. Your name is Ayaan. You are 28 years old. You grew up in Dubai and are familiar with the city’s neighborhoods, public transport culture, and everyday commuter needs. You studied information systems and urban mobility in the UAE, which is why you enjoy helping people navigate places efficiently and comfortably. You should not over-share these details, but they may subtly influence your tone and confidence when speaking.

At all times, remain polite, neutral, culturally respectful, and aligned with RTA values. You do not provide legal advice, medical advice, or emergency services. If a user asks for something outside your scope, respond calmly and redirect them to appropriate official channels where possible.

Your goal is to make every person who interacts with you feel guided, understood, and supported, just as a helpful human assistant at the station would do, while always grounding your answers in the attached knowledge base.
"#;

/// Instruction appended after the question and destination details.
const ANSWER_INSTRUCTION: &str = "Answer with a helpful bus route suggestion from Al Jafiliya bus stop. \
Keep it short and practical.";

/// Summary of a place as shown to the model; values pass through unchanged.
pub fn destination_details(category: &str, place: &Place) -> serde_json::Value {
    json!({
        "name": place.name,
        "category": category,
        "distance_m": place.distance_m,
        "type": place.place_type,
        "cuisine": place.cuisine,
        "opening_hours": place.opening_hours,
        "rating": place.rating,
    })
}

/// User message asking the model to answer `question` about `place`.
pub fn build_answer_prompt(question: &str, category: &str, place: &Place) -> String {
    let details = destination_details(category, place);
    let details = to_spaced_ascii(&details).unwrap_or_else(|_| details.to_string());
    format!("User question: {question}\nDestination details: {details}\n{ANSWER_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_question_and_details() {
        let place = Place {
            name: Some("Ravi Restaurant".into()),
            distance_m: Some(json!(420)),
            cuisine: Some(json!("Pakistani")),
            ..Default::default()
        };
        let prompt = build_answer_prompt("Which bus to Ravi?", "restaurants_cafes", &place);

        let mut lines = prompt.lines();
        assert_eq!(lines.next(), Some("User question: Which bus to Ravi?"));

        let details_line = lines.next().unwrap();
        let json = details_line.strip_prefix("Destination details: ").unwrap();
        let details: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(details["name"], "Ravi Restaurant");
        assert_eq!(details["category"], "restaurants_cafes");
        assert_eq!(details["distance_m"], 420);
        assert!(details["rating"].is_null());

        assert!(lines.next().unwrap().starts_with("Answer with a helpful bus route"));
    }

    #[test]
    fn details_keep_field_order() {
        let details = destination_details("malls", &Place::named("BurJuman")).to_string();
        let name = details.find("\"name\"").unwrap();
        let category = details.find("\"category\"").unwrap();
        let rating = details.find("\"rating\"").unwrap();
        assert!(name < category && category < rating);
    }

    #[test]
    fn details_line_is_spaced_ascii_with_values_verbatim() {
        let place: Place = serde_json::from_str(
            r#"{"name": "Café Ravi", "distance_m": 850, "cuisine": ["pakistani", "indian"]}"#,
        )
        .unwrap();
        let prompt = build_answer_prompt("Which bus?", "restaurants", &place);
        let details_line = prompt.lines().nth(1).unwrap();

        assert_eq!(
            details_line,
            r#"Destination details: {"name": "Caf\u00e9 Ravi", "category": "restaurants", "distance_m": 850, "type": null, "cuisine": ["pakistani", "indian"], "opening_hours": null, "rating": null}"#
        );
    }

    #[test]
    fn persona_keeps_full_instructions() {
        assert!(SYSTEM_PROMPT.contains("attached JSON knowledge base as your single source of truth"));
        assert!(SYSTEM_PROMPT.contains("If a user asks for affordability, consider average price ranges."));
        assert!(SYSTEM_PROMPT.contains("suitable for Friday prayers"));
        assert!(SYSTEM_PROMPT.contains("never mention JSON, datasets, schemas, or internal structures"));
        assert!(SYSTEM_PROMPT.contains("Your name is Ayaan. You are 28 years old."));
        assert!(SYSTEM_PROMPT.starts_with("\nYou are an AI-powered digital avatar"));
    }
}
