//! Prompt enviado al modelo

/// Mensaje de sistema para el modelo
pub const SYSTEM_PROMPT: &str =
    "You are an expert travel planner. You always answer with a single valid JSON object and nothing else.";

/// Construye el prompt que pide un itinerario día por día
///
/// # Ejemplo
/// ```
/// use itinerary_server::generation::prompt::build_prompt;
///
/// let prompt = build_prompt("Lisbon", 3);
/// assert!(prompt.contains("3-day"));
/// assert!(prompt.contains("Lisbon"));
/// ```
pub fn build_prompt(destination: &str, duration_days: u32) -> String {
    format!(
        r#"Create a detailed {days}-day travel itinerary for {destination}.

Return ONLY a JSON object with this exact structure:
{{
  "itinerary": [
    {{
      "day": 1,
      "theme": "A short theme for the day",
      "activities": [
        {{ "time": "Morning", "description": "What to do", "location": "Where it happens" }},
        {{ "time": "Afternoon", "description": "What to do", "location": "Where it happens" }},
        {{ "time": "Evening", "description": "What to do", "location": "Where it happens" }}
      ]
    }}
  ]
}}

Rules:
- Include exactly {days} day objects, numbered 1 to {days} in order.
- Every day has exactly 3 activities: Morning, Afternoon and Evening.
- Every activity has a non-empty "time", "description" and "location".
- Use real places in {destination}."#,
        days = duration_days,
        destination = destination,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_destination_and_days() {
        let prompt = build_prompt("Mexico City", 5);

        assert!(prompt.contains("5-day travel itinerary for Mexico City"));
        assert!(prompt.contains("exactly 5 day objects"));
        assert!(prompt.contains("Use real places in Mexico City"));
    }

    #[test]
    fn test_prompt_describes_time_slots() {
        let prompt = build_prompt("Oslo", 1);

        for slot in ["Morning", "Afternoon", "Evening"] {
            assert!(prompt.contains(slot), "missing slot {}", slot);
        }
        assert!(prompt.contains("\"itinerary\""));
    }
}
