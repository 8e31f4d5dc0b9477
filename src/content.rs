use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Structured study material returned for one subject/topic pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyContent {
    pub definition: String,
    pub key_points: Vec<String>,
    pub example: StudyExample,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyExample {
    pub title: String,
    pub content: String,
}

impl StudyContent {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text.trim())
    }

    /// Attaches an image found out of band unless the payload already named one.
    pub fn attach_image(&mut self, image_url: Option<String>) {
        if self.image_url.is_none() {
            self.image_url = image_url;
        }
    }
}

/// JSON schema the model is asked to conform to. `imageUrl` is deliberately
/// absent: images come from the separate search lookup.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "definition": {
                "type": "string",
                "description": "A comprehensive definition of the concept."
            },
            "keyPoints": {
                "type": "array",
                "items": { "type": "string" },
                "description": "3 to 5 key bullet points summarizing the concept."
            },
            "example": {
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "A short title for the example."
                    },
                    "content": {
                        "type": "string",
                        "description": "The example scenario and explanation."
                    }
                },
                "required": ["title", "content"],
                "description": "A practical example illustrating the concept."
            }
        },
        "required": ["definition", "keyPoints", "example"]
    })
}
