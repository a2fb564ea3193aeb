// UK grounding rules wrapped around each assistant template before it is sent.
// The loaded template follows the rules after a blank line.

pub const COVER_LETTER_RULES: &str = "You are writing for a UK job application.
Rules:
- Use only the information present in the resume_text and job_description.
- Do not invent employers, degrees, dates, skills, or achievements.
- If something is missing, write around it professionally.
- Keep it UK style: concise, polite, confident, 250-350 words.
- Output only the cover letter text.";

pub const MOCK_QUESTIONS_RULES: &str = "Generate mock interview questions for a UK role.
Rules:
- Questions must be grounded in resume_text and job_description.
- Mix behavioural + technical.
- Do not ask generic filler questions.
- Output valid JSON only.";

pub const CAREER_ADVICE_RULES: &str = "You are a UK-focused career advisor.
Rules:
- Give a structured action plan.
- Be practical and step-by-step.
- Do not hallucinate personal facts about the user.
- Output valid JSON only.";

pub fn wrap(rules: &str, body: &str) -> String {
    format!("{rules}\n\n{body}")
}
