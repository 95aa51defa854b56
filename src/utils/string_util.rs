/// Models often wrap JSON answers in Markdown code fences despite
/// instructions not to; strip them before parsing.
pub trait StripCodeBlock {
    fn strip_code_block(&self) -> &str;
}

impl StripCodeBlock for str {
    fn strip_code_block(&self) -> &str {
        let trimmed = self.trim();
        if let Some(rest) = trimmed.strip_prefix("```") {
            // Skip the language tag on the opening fence, if any.
            if let Some((_, body)) = rest.split_once('\n') {
                if let Some(inner) = body.strip_suffix("```") {
                    return inner.trim();
                }
            }
        }
        trimmed
    }
}
