//! Request validation

use super::model::SeoOptimizationRequest;

pub trait ContentValidator: Send + Sync {
    /// Every problem found, joined into one message
    fn validate(&self, request: &SeoOptimizationRequest) -> Result<(), String>;
}

/// Rejects missing identifiers and empty or oversized content
#[derive(Debug, Clone)]
pub struct BasicContentValidator {
    pub max_content_chars: usize,
}

impl Default for BasicContentValidator {
    fn default() -> Self {
        Self {
            max_content_chars: 50_000,
        }
    }
}

impl ContentValidator for BasicContentValidator {
    fn validate(&self, request: &SeoOptimizationRequest) -> Result<(), String> {
        let mut problems = Vec::new();

        if request.property_id.trim().is_empty() {
            problems.push("property_id is required".to_string());
        }
        if request.content_type.trim().is_empty() {
            problems.push("content_type is required".to_string());
        }
        if request.original_content.trim().is_empty() {
            problems.push("original_content is required".to_string());
        } else if request.original_content.chars().count() > self.max_content_chars {
            problems.push(format!(
                "original_content exceeds {} characters",
                self.max_content_chars
            ));
        }
        if request.target_length == Some(0) {
            problems.push("target_length must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(property_id: &str, content: &str) -> SeoOptimizationRequest {
        SeoOptimizationRequest {
            property_id: property_id.to_string(),
            content_type: "BLOG_POST".to_string(),
            original_content: content.to_string(),
            location: "Austin".to_string(),
            existing_tags: vec![],
            property_type: None,
            target_length: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(BasicContentValidator::default()
            .validate(&request("p1", "Some content"))
            .is_ok());
    }

    #[test]
    fn test_collects_all_problems() {
        let err = BasicContentValidator::default()
            .validate(&request(" ", ""))
            .unwrap_err();
        assert!(err.contains("property_id is required"));
        assert!(err.contains("original_content is required"));
    }

    #[test]
    fn test_oversized_content_rejected() {
        let validator = BasicContentValidator { max_content_chars: 5 };
        assert!(validator.validate(&request("p1", "too long")).is_err());
    }
}
