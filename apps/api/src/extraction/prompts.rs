// Prompt templates for résumé extraction.

pub const EXTRACT_SYSTEM: &str = "\
You are a resume parser. Extract information from the provided text and format it \
according to the JSON Resume schema. \
You MUST respond with a single valid JSON object only: no markdown fences, no explanations. \
Only include fields you can confidently extract from the text. \
Leave a field out entirely when it is unknown; never emit null.";

pub const EXTRACT_PROMPT: &str = r#"Convert the resume text below into a JSON object that matches this JSON Schema exactly.

SCHEMA:
{schema}

Rules:
- "basics.name" is required. Use the candidate's full name as written.
- Dates stay as written in the resume (e.g. "2021-03", "Mar 2021"). Do not invent days or months.
- A role that is still ongoing has no "endDate".
- Bullet points under a role go into "highlights", one string per bullet.
- "email" must be a bare address and "url" fields must be absolute URLs; omit them otherwise.

RESUME TEXT:
{resume_text}"#;

pub fn build_extract_prompt(schema: &str, resume_text: &str) -> String {
    EXTRACT_PROMPT
        .replace("{schema}", schema)
        .replace("{resume_text}", resume_text)
}
