use serde_json::{json, Value};

/// Instruction sent alongside the uploaded document.
pub const EXTRACTION_PROMPT: &str = "\
    Extract resume data from the file provided. \
    Ensure the output strictly adheres to the JSON schema provided.\n\n\
    IMPORTANT for 'header.links':\n\
    - You MUST extract the actual URL/href for every link, not just the visible text.\n\
    - If a text is a hyperlink (e.g. \"LinkedIn\" or \"Portfolio\"), extract the underlying URL.\n\
    - For email addresses, include \"mailto:\" prefix in the url field if not present.\n\
    - For simple text links without hyperlinks, try to reconstruct the URL \
    (e.g. for \"github.com/user\" -> \"https://github.com/user\").\n\n\
    For 'experience.items', split the description into bullet points if possible. \
    If a field is missing, use an empty string or empty array.\n\n\
    The 'experience' items array should be strings, not objects. \
    The 'customSections' should be a flat list of items (title, description, year).";

/// Response schema constraining the model output to the CV shape.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "header": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "role": { "type": "string" },
                    "address": { "type": "string" },
                    "alignment": { "type": "string", "enum": ["left", "center", "right"] },
                    "links": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "text": { "type": "string" },
                                "url": { "type": "string" }
                            },
                            "required": ["text", "url"]
                        }
                    }
                },
                "required": ["name", "role", "links"]
            },
            "summary": { "type": "string" },
            "experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "company": { "type": "string" },
                        "years": { "type": "string" },
                        "description": { "type": "string" },
                        "items": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["title", "company", "years", "description", "items"]
                }
            },
            "customSections": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "year": { "type": "string" }
                    },
                    "required": ["title", "description", "year"]
                }
            }
        },
        "required": ["header", "summary", "experience", "customSections"]
    })
}
