// Versioned prompt templates compiled into the binary.
// Placeholders are `{name}` and are substituted by exact match; literal JSON braces are safe.

pub fn builtin(name: &str, version: &str) -> Option<&'static str> {
    match (name, version) {
        ("resume_extract", "v1") => Some(RESUME_EXTRACT_V1),
        ("cover_letter_uk", "v1") => Some(COVER_LETTER_UK_V1),
        ("mock_questions", "v1") => Some(MOCK_QUESTIONS_V1),
        ("career_advice_plan", "v1") => Some(CAREER_ADVICE_PLAN_V1),
        _ => None,
    }
}

const RESUME_EXTRACT_V1: &str = r#"You are a precise resume data extractor.
Read the resume text below and return ONE JSON object with exactly this structure.
Use "" for unknown strings and [] for unknown lists. Never invent details that are not in the text.

{
  "name": "string",
  "email": "string",
  "phone": "string",
  "location": "string",
  "links": { "linkedin": "string", "github": "string", "portfolio": "string", "other": ["string"] },
  "summary": "string",
  "skills": {
    "technical": ["string"], "tools": ["string"], "languages": ["string"], "frameworks": ["string"],
    "cloud": ["string"], "databases": ["string"], "ml_ai": ["string"], "other": ["string"]
  },
  "education": [
    { "institution": "string", "degree": "string", "field": "string", "location": "string",
      "dates": "string", "modules": ["string"], "grade": "string" }
  ],
  "experience": [
    { "company": "string", "title": "string", "location": "string", "dates": "string",
      "bullets": ["string"], "metrics": ["string"], "tech_stack": ["string"] }
  ],
  "projects": [
    { "name": "string", "description": "string", "bullets": ["string"], "metrics": ["string"],
      "tech_stack": ["string"], "link": "string" }
  ],
  "certifications": [ { "name": "string", "issuer": "string", "date": "string" } ],
  "publications": ["string"],
  "awards": ["string"],
  "volunteering": ["string"],
  "evidence": { "name": "string", "email": "string", "phone": "string", "location": "string", "summary": "string" },
  "confidence": { "contact": 0, "summary": 0, "skills": 0, "experience": 0, "education": 0, "projects": 0, "overall": 0 }
}

RULES:
1. "evidence" fields hold the verbatim snippet from the resume that supports each identity field.
2. "metrics" lists every number, percentage, scale or time figure stated for that entry.
3. "confidence" values are integers from 0 to 100.
4. Return ONLY the JSON object. No markdown fences, no commentary.

RESUME TEXT:
{resume_text}"#;

const COVER_LETTER_UK_V1: &str = r#"Write a cover letter for the role of {job_title}.

JOB DESCRIPTION:
{job_description}

CANDIDATE RESUME:
{resume_text}

Address it "Dear Hiring Manager," and close with "Yours faithfully,"."#;

const MOCK_QUESTIONS_V1: &str = r#"Prepare 8 to 10 interview questions for the candidate below.

JOB DESCRIPTION:
{job_description}

CANDIDATE RESUME:
{resume_text}

Return JSON with exactly this structure:
{
  "questions": [
    { "question": "string", "category": "behavioural" | "technical", "rationale": "string", "what_good_looks_like": "string" }
  ]
}"#;

const CAREER_ADVICE_PLAN_V1: &str = r#"Answer the career question below with an action plan.

QUESTION:
{question}

Return JSON with exactly this structure:
{
  "summary": "string",
  "steps": [ { "title": "string", "detail": "string", "timeframe": "string" } ],
  "resources": ["string"]
}"#;
