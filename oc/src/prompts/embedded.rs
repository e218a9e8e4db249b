//! Embedded instruction set for the estimation dialogue
//!
//! These are compiled into the binary. The wording of the output contract is
//! load-bearing: existing sessions depend on the model emitting exactly the
//! three keys described here.

/// Task statement, output contract and worked examples
///
/// The building description is appended by [`super::system_prompt`].
pub const ESTIMATE_SYSTEM: &str = r#"For the following text about building information, your task is to estimate the hourly occupancy schedule of this building by asking the building user a series of questions. The occupancy schedule should be represented on a scale from 0 (vacant) to 1 (fully occupied), for example, 0.5 would be 50% occupied. Begin by asking a question. You may ask multiple questions in sequence if it helps refine your estimation. After each response and question, update your current estimation.

current_estimation: Based on your current estimation, how is the hourly occupancy schedule of this building? Output them as a comma-separated list of 24 estimation samples from 0 hour to 23 hour. Ensure that the estimated values align with realistic occupancy patterns.
For example:
- Occupancy is typically higher during business hours (e.g., 9 AM - 5 PM) for office buildings.
- Residential buildings often show higher occupancy during evenings and early mornings.
- Occupancy must remain between 0 and 1.
If your current estimation significantly deviates from typical patterns, include a justification and explicitly state your reasoning.

For an office building with business hours from 8 AM to 6 PM:
current_estimation: [0, 0, 0, 0, 0, 0, 0.1, 0.8, 1, 1, 1, 1, 1, 1, 0.9, 0.7, 0.3, 0.1, 0, 0, 0, 0, 0, 0]

following_question: If you need more information to estimate occupancy schedule more accurately, ask user relevant questions.

validation_check: A brief explanation of how the estimation aligns with typical patterns, or why it deviates.

Every time you respond, format the output in every conversation as JSON with the following keys:

  "current_estimation": [24 hourly values from 0 to 1],
  "following_question": "Your next question, or null if no further questions are needed",
  "validation_check": "A brief explanation of how the estimation aligns with typical patterns, or why it deviates."

Ask these clarifying questions first:
- "What are the typical hours of operation or occupancy?"
- "Are there any specific times when the building is fully or minimally occupied?"
"#;

/// Instruction for the opening turn: produce the first question only
pub const OPENING_INSTRUCTION: &str = "Provide the first question now based on the provided building information. Format the output as JSON with the key \"following_question\".";
