use glimpse_core::{Extraction, ExtractionMode};

use crate::normalize;

/// Exact text the post prompt asks the model to return for non-post images.
pub const NOT_A_POST_SENTINEL: &str = "ERROR: Not a LinkedIn post";

/// Value of the `error` key the profile prompt asks for on non-profile images.
pub const NOT_A_PROFILE_SENTINEL: &str = "Not a LinkedIn profile";

pub const POST_EXTRACTION_PROMPT: &str = r#"Extract all text from this LinkedIn post screenshot.

RULES:
- Return ONLY the post text, nothing else
- Preserve line breaks and formatting exactly
- Ignore engagement metrics (likes, comments, shares, views)
- Ignore profile pictures, names, and timestamps
- Ignore "Repost" or "Shared by" text
- If you see hashtags, include them
- If you see emojis, include them
- Do NOT add any preamble or explanation

If this is NOT a LinkedIn post screenshot, return exactly: "ERROR: Not a LinkedIn post"

Extract the post text now:"#;

pub const PROFILE_EXTRACTION_PROMPT: &str = r#"Analyze this LinkedIn profile screenshot and extract structured data.

Return ONLY valid JSON in this exact format (no markdown, no code blocks, no explanation):
{
  "headline": "exact headline text or null",
  "about": "full about section text or null",
  "experiences": [
    {
      "title": "job title",
      "company": "company name",
      "duration": "time period",
      "description": "full description with bullet points"
    }
  ],
  "skills": ["skill1", "skill2", "skill3"],
  "education": [
    {
      "degree": "degree name",
      "school": "school name",
      "year": "graduation year"
    }
  ]
}

EXTRACTION RULES:
- Extract text EXACTLY as written (preserve capitalization, punctuation)
- For experiences: capture title, company, dates, and full description
- For skills: list all visible skills (ignore endorsement counts)
- If a section is not visible, use null or empty array
- Focus only on text content, ignore images/icons
- Ignore connection count, follower count, post count

If this is NOT a LinkedIn profile screenshot, return: {"error": "Not a LinkedIn profile"}

Extract the data now as JSON:"#;

/// Prompt plus post-processing step for one extraction mode.
#[derive(Clone, Copy)]
pub struct ModeStrategy {
    pub mode: ExtractionMode,
    pub prompt: &'static str,
    normalizer: fn(&str) -> Extraction,
}

impl ModeStrategy {
    pub fn normalize(&self, raw: &str) -> Extraction {
        (self.normalizer)(raw)
    }
}

fn normalize_post(raw: &str) -> Extraction {
    Extraction::Post(normalize::post(raw))
}

fn normalize_profile(raw: &str) -> Extraction {
    Extraction::Profile(normalize::profile(raw))
}

pub fn resolve(mode: ExtractionMode) -> ModeStrategy {
    match mode {
        ExtractionMode::Post => ModeStrategy {
            mode,
            prompt: POST_EXTRACTION_PROMPT,
            normalizer: normalize_post,
        },
        ExtractionMode::Profile => ModeStrategy {
            mode,
            prompt: PROFILE_EXTRACTION_PROMPT,
            normalizer: normalize_profile,
        },
    }
}
