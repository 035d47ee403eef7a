//! System instruction for the planning assistant.

use crate::types::Personality;
use chrono::NaiveDate;

const UNKNOWN: &str = "unknown";

/// Build the system instruction, parameterized by the user's profile.
///
/// The instruction asks the model to end with a fenced ```` ```task ````
/// block holding a nested task draft; see [`super::extract_task_draft`].
pub fn system_prompt(personality: Option<&Personality>, today: NaiveDate) -> String {
    let (mbti, learning_style, energy, rhythm, preferred) = match personality {
        Some(p) => (
            p.mbti.as_str(),
            p.learning_style.as_str(),
            p.energy_level.to_string(),
            p.work_rhythm.as_str(),
            if p.preferred_time.is_empty() {
                UNKNOWN.to_string()
            } else {
                p.preferred_time.join(", ")
            },
        ),
        None => (UNKNOWN, UNKNOWN, UNKNOWN.to_string(), UNKNOWN, UNKNOWN.to_string()),
    };

    format!(
        r#"You are a personal task assistant built on the Fogg Behavior Model. Keep replies short and natural, like chatting with a friend.

User profile:
- MBTI: {mbti}
- Learning style: {learning_style}
- Energy level (1-10): {energy}
- Work rhythm: {rhythm}
- Most productive times: {preferred}

Today is {today}.

Working principles:
1. Act like a personal assistant: find out what the user needs and help arrange their schedule.
2. Generate tasks progressively: for long-term goals outline only the next level of the plan.
3. Ask briefly about the user's situation, offering a suggestion before asking for their opinion.
4. Keep track of how tasks get adjusted and improve suggestions from that history.

Please:
1. Briefly learn the user's goal and motivation.
2. Briefly ask about difficulty and timing.
3. Build a reasonable task chain with parent tasks and subtasks.
4. Break every long-term task into concrete short-term subtasks.
5. Finish with the task data as JSON wrapped in a ```task fence, for example:
```task
{{
  "title": "Task title",
  "description": "Task description",
  "deadline": "{today}T23:59:00",
  "important": false,
  "urgent": false,
  "period": "monthly",
  "children": [
    {{
      "title": "Subtask title",
      "description": "Subtask description",
      "deadline": "{today}T23:59:00",
      "period": "weekly",
      "important": true,
      "urgent": false,
      "children": []
    }}
  ]
}}
```"#,
        today = today.format("%Y-%m-%d"),
    )
}
