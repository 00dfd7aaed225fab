// Prompt templates for the rewrite engine.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Tailoring prompt. Replace `{date_rules}`, `{factual_rules}`,
/// `{section_headers}`, `{format_rules}`, `{cv_text}`, `{job_description}`
/// and `{additional_info}` before sending.
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"Act as an expert CV writer specializing in ATS (Applicant Tracking System) optimization. Tailor the following CV to match the Job Description provided.

{date_rules}

{factual_rules}

**ATS OPTIMIZATION REQUIREMENTS:**
1. **Contact Information (Header Section):**
   - **Phone:** Use standard format: (XXX) XXX-XXXX or XXX-XXX-XXXX
   - **Email:** Professional email address on its own line or clearly separated
   - **LinkedIn:** Use full URL (https://linkedin.com/in/username), not shortened links
   - **Location:** Format as "City, State" or "City, Country" (e.g., "London, UK" or "New York, NY")
   - Separate contact details with " | " or put each on its own line

2. **Keyword Matching:**
   - Extract key skills, technologies, and qualifications from the job description
   - Incorporate these keywords naturally, especially in Skills and Work Experience
   - Match the exact terminology used in the job posting (if they say "JavaScript" do not say "JS")
   - Spell out acronyms with the full term on FIRST mention (e.g., "Artificial Intelligence (AI)")
   - Subsequent mentions can use the acronym only

3. **Standard Section Headers (ATS-Recognizable):**
{section_headers}

4. **Quantifiable Achievements:**
   - Keep every number, percentage and metric from the original
   - Start bullets with action verbs (Led, Developed, Increased, Reduced, Managed, Implemented, Achieved)
   - Format: "Action Verb + Task + Quantifiable Result"

5. **Skills Section:**
   - List skills in order of relevance to the job description
   - Group related skills with bold labels (e.g., **Programming Languages:** Python, Java)
   - Use comma-separated lists or bullet points, never tables

**CONTENT AND TONE:**
- Professional Summary of 3-4 lines aligned with the role
- Work Experience in reverse chronological order with **Job Title**, **Company**, Location and the original date range
- Concise bullets (1-2 lines), achievements over responsibilities
- Correct spelling and grammar, consistent tense, active voice, no contractions

{format_rules}

CV Content:
{cv_text}

Job Description:
{job_description}
{additional_info}"#;

/// Appended to the tailoring prompt when the user answered gap prompts.
/// Replace `{entries}` with one `- Label: value` line per answer.
pub const ADDITIONAL_INFO_TEMPLATE: &str = r#"
**ADDITIONAL INFORMATION PROVIDED BY USER:**
The user has provided the following additional information to enhance their CV:
{entries}
Incorporate this information naturally into the tailored CV. It is factual and must not be dropped."#;

/// Improvement prompt. Replace `{score}`, `{target}`, `{recommendations}`,
/// `{date_rules}`, `{factual_rules}`, `{section_headers}`, `{format_rules}`
/// and `{cv_text}` before sending.
pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"Act as an expert ATS optimization specialist. You have a CV that scored {score}/100 on ATS compatibility.
Your goal is to improve this CV to a score of {target}+ while preserving all factual information.

**CURRENT ISSUES TO FIX:**
{recommendations}

{date_rules}

{factual_rules}

**ATS OPTIMIZATION REQUIREMENTS:**
1. **Section Headers:**
{section_headers}

2. **Professional Summary:** 3-4 lines covering key qualifications, years of experience and core expertise, drawn only from the CV.

3. **Skills:** Group skills by category with bold labels, comma-separated, using industry-standard terminology.

4. **Quantifiable Achievements:** Surface every metric already present in the CV (percentages, dollar amounts, team sizes) in the Work Experience bullets.

5. **Action Verbs:** Start every bullet with a strong action verb: Led, Developed, Implemented, Achieved, Managed, Created, Designed, Improved, Increased, Reduced, Streamlined, Optimized.

6. **Contact Information:** Keep phone, email, LinkedIn and location in standard formats. If a detail is absent from the CV, leave it out rather than inventing it.

{format_rules}

**INSTRUCTIONS:**
- Fix ALL issues listed above that can be fixed without inventing facts
- Maintain all factual information from the original CV
- Return ONLY the improved CV in Markdown format

**ORIGINAL CV:**
{cv_text}"#;

/// Cover letter prompt. Replace `{title}`, `{company}`, `{summary}`,
/// `{cv_text}` and `{description}` before sending. `{summary}` may be empty.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are a professional cover letter writer.
Write a concise, targeted cover letter for the position "{title}" at "{company}".
Use the candidate's CV content and align with the job description below.
Do not claim any experience, qualification or employer that is not in the CV.
{summary}
CV Content:
{cv_text}

Job Description:
{description}"#;

/// Replace `{summary}` before inserting into the cover letter prompt.
pub const ROLE_SUMMARY_TEMPLATE: &str =
    "\nAdditional summary of the role (highlights, required skills, responsibilities):\n{summary}\n";

/// Assessment prompt. Replace `{cv_text}` before sending.
pub const ASSESS_PROMPT_TEMPLATE: &str = r#"Act as an expert career coach. Review the following CV and provide a brief assessment.
Highlight 3 strengths and 3 areas for improvement.

CV Content:
{cv_text}"#;
