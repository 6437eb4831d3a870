// All LLM prompt constants for the Planning module.

/// System prompt for scene planning — enforces JSON-only output.
pub const PLANNING_SYSTEM: &str =
    "You are an expert in educational content creation and a great teacher \
    who can explain complex concepts in a clear and engaging way. \
    Plan an animated explainer video as an ordered list of content items. \
    You MUST respond with valid JSON only: a JSON array of content item objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Planning prompt template. Replace `{topic}` and `{level_instruction}`
/// before sending.
pub const PLANNING_PROMPT_TEMPLATE: &str = r#"Plan an educational animation about the topic below.

Return a JSON array of content items with this EXACT schema (no extra fields):
[
  {"kind": "title", "text": "The Pythagorean Theorem"},
  {"kind": "point", "text": "A relationship between the three sides of a right triangle."},
  {"kind": "heading", "text": "The Formula:"},
  {"kind": "bullet", "text": "a² + b² = c²"},
  {"kind": "image_placeholder", "caption": "Right triangle with labeled sides", "media_ref": "https://example.com/images/right_triangle.png"},
  {"kind": "summary", "text": "Squares on the legs together cover the square on the hypotenuse."}
]

Rules for planning:

STRUCTURE: Start with exactly one "title" item. Introduce the concept, show
step-by-step explanations grouped under "heading" items, include practical
examples, and end with one "summary" item.

KINDS (use only these): "title", "heading", "point", "bullet", "summary",
"image_placeholder".

TEXT: Keep each "point" and "bullet" to one or two sentences. Narration-level
detail belongs in the text; do not be overly concise.

IMAGES: Use "image_placeholder" items sparingly for concepts that benefit from
a picture. "media_ref" must be a direct image URL when you know one; omit it
otherwise and the item degrades to a captioned placeholder.

{level_instruction}

TOPIC:
{topic}"#;

/// Explanation-level instructions injected into the planning prompt.
pub const LEVEL_ELI5: &str =
    "LEVEL: Explain like the viewer is five years old. Use everyday analogies, \
    no jargon, no formulas beyond the single central one.";

pub const LEVEL_NORMAL: &str =
    "LEVEL: Explain for a curious adult with no special background. Introduce \
    terms before using them.";

pub const LEVEL_ADVANCED: &str =
    "LEVEL: Explain for a university-level audience. Use precise terminology \
    and include the formal statement of key results.";
